//! # News Harness application crate
//!
//! Wires the retrieval core ([`news_harness_core`]) to real
//! infrastructure: a SQLite article store, the OpenAI embedding
//! provider, TOML configuration, and the `nws` CLI.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML configuration loading and validation |
//! | [`migrate`] | Idempotent schema migrations |
//! | [`sqlite_store`] | SQLite-backed `ArticleStore` (WAL-mode pool) |
//! | [`embedding`] | OpenAI and disabled embedding providers |
//! | [`ingest`] | Collector dump ingestion |
//! | [`ask`] | Retrieval queries from the CLI |
//! | [`stats`] | Corpus counts and settings |

pub mod ask;
pub mod config;
pub mod embedding;
pub mod ingest;
pub mod migrate;
pub mod sqlite_store;
pub mod stats;

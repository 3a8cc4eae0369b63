//! # News Harness Core
//!
//! Shared logic for News Harness: article models, the staged filter
//! pipeline, cosine similarity ranking, the conversation-scoped cache,
//! and the retrieval engine that composes them.
//!
//! This crate contains no tokio, sqlx, or network dependencies. Storage
//! and embedding backends are supplied by the application through the
//! [`store::ArticleStore`] and [`embedding::EmbeddingProvider`] traits.

pub mod cache;
pub mod criteria;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod filter;
pub mod models;
pub mod similarity;
pub mod store;

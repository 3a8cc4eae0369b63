//! # News Harness CLI (`nws`)
//!
//! The `nws` binary is the operational interface for News Harness: it
//! initializes the article database, ingests collector dumps, answers
//! retrieval queries, and reports corpus statistics.
//!
//! ## Usage
//!
//! ```bash
//! nws --config ./config/nws.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `nws init` | Create the SQLite database and run schema migrations |
//! | `nws ingest <file>` | Load a collector JSON dump into the store |
//! | `nws ask "<query>"` | Retrieve articles for a query with optional filters |
//! | `nws stats` | Show article counts and active settings |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! nws init --config ./config/nws.toml
//!
//! # Ingest a collector dump (embeds at ingestion if configured)
//! nws ingest ./dumps/2025-09-05.json
//!
//! # Ask with filters
//! nws ask "iPhone sales outlook" --entity AAPL --date "Last 7 days"
//!
//! # Skip the semantic stage entirely
//! nws ask "supply chain" --date 2025-09-01 --top-k 10
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use news_harness::{ask, config, ingest, migrate, stats};

/// News Harness CLI — a staged retrieval engine for financial news.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/nws.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "nws",
    about = "News Harness — a staged retrieval engine for financial news assistants",
    version,
    long_about = "News Harness ingests annotated financial news articles into SQLite and \
    answers retrieval queries through a staged pipeline: temporal and entity filters narrow \
    the corpus, then cosine similarity over embeddings ranks the survivors."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/nws.toml`. Database, retrieval, and
    /// embedding settings are read from this file.
    #[arg(long, global = true, default_value = "./config/nws.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the articles table.
    /// This command is idempotent — running it multiple times is safe.
    Init,

    /// Ingest a collector JSON dump.
    ///
    /// Normalizes each raw article (content-hash id, publish date parse,
    /// ingestion timestamp), optionally embeds title+body, and upserts
    /// everything into SQLite.
    Ingest {
        /// Path to the JSON dump (an array of collected articles).
        file: PathBuf,

        /// Store articles without computing embeddings.
        #[arg(long)]
        no_embed: bool,
    },

    /// Retrieve articles for a query.
    ///
    /// Runs the staged pipeline and prints ranked results with scores.
    /// If no embedding provider is configured the semantic stage is
    /// skipped and results are ordered by recency.
    Ask {
        /// The retrieval query.
        query: String,

        /// Entity filter (e.g., `AAPL`). Matches entity tag, title, or
        /// body, case-insensitively. `All Companies` disables the filter.
        #[arg(long)]
        entity: Option<String>,

        /// Date filter: `All Dates`, `Last N days`, or `YYYY-MM-DD`.
        #[arg(long)]
        date: Option<String>,

        /// Maximum number of results to return.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Show corpus statistics and active settings.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { file, no_embed } => {
            let provider = news_harness::embedding::create_provider(&cfg.embedding)?;
            let embed = !no_embed && cfg.embedding.is_enabled();
            ingest::run_ingest(&cfg, &file, provider, embed).await?;
        }
        Commands::Ask {
            query,
            entity,
            date,
            top_k,
        } => {
            ask::run_ask(&cfg, &query, entity, date, top_k).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}

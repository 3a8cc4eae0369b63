//! Error taxonomy for the retrieval pipeline.
//!
//! Failures fall into two classes with different propagation rules:
//! store failures are fatal for the current retrieval, while embedding
//! failures degrade it. The engine and filter pipeline pattern-match on
//! these variants to decide; nothing is retried inside the core (retry
//! policy belongs to the external-call adapters).
//!
//! An unparseable article date is deliberately *not* an error: the
//! article falls back to its ingestion timestamp for temporal filtering,
//! and the date source used is reported per result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The article store could not serve a corpus fetch. Fatal for the
    /// current retrieval; no partial or stale result is synthesized and
    /// the conversation cache is left untouched.
    #[error("article store unavailable: {0}")]
    StoreUnavailable(String),

    /// The embedding provider failed or timed out. Recovery depends on
    /// position: a failed query embedding degrades the retrieval to the
    /// pre-semantic ordering, a failed candidate embedding drops only
    /// that candidate from ranking.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// A date filter string could not be interpreted.
    #[error("invalid date filter: {0}")]
    InvalidDateFilter(String),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;

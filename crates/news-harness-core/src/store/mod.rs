//! Storage abstraction for News Harness.
//!
//! The [`ArticleStore`] trait is the retrieval engine's only view of
//! persistence: a corpus fetch that returns articles with their
//! ingestion-time embeddings attached. The engine never computes
//! embeddings for stored articles — it reads them.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Article;

/// Abstract article store.
///
/// A failing fetch must surface as
/// [`RetrievalError::StoreUnavailable`](crate::error::RetrievalError::StoreUnavailable);
/// the engine treats that as fatal for the current retrieval. Calls are
/// expected to carry a bounded timeout in the implementation.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fetch up to `limit` articles, most recent first, embeddings
    /// included.
    async fn get_all(&self, limit: usize) -> Result<Vec<Article>>;

    /// Number of articles currently stored.
    async fn count(&self) -> Result<usize>;
}

//! Retrieval engine: the orchestrator that composes the cache, the
//! filter pipeline, and the similarity ranker into one public
//! operation.
//!
//! Data flows one way: criteria → cache get-or-build (temporal + entity
//! stages over a full corpus fetch) → semantic stage → ranked list.
//! Construct one engine (with its own [`ConversationCache`]) per
//! conversation; nothing is shared globally.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::cache::ConversationCache;
use crate::criteria::FilterCriteria;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::filter;
use crate::models::{Retrieval, StageCounts};
use crate::store::ArticleStore;

/// Engine tuning knobs, decoupled from application config.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Result size when the caller does not override it.
    pub top_k: usize,
    /// How much of the store is pulled per scope rebuild.
    pub corpus_limit: usize,
    /// In-flight provider calls when candidate embeddings are missing.
    pub embed_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            corpus_limit: 150,
            embed_concurrency: 8,
        }
    }
}

/// Single-conversation retrieval engine.
pub struct RetrievalEngine {
    store: Arc<dyn ArticleStore>,
    provider: Arc<dyn EmbeddingProvider>,
    cache: ConversationCache,
    config: EngineConfig,
}

impl RetrievalEngine {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        provider: Arc<dyn EmbeddingProvider>,
        cache: ConversationCache,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            provider,
            cache,
            config,
        }
    }

    /// Retrieve the articles relevant to `query` within the given scope.
    ///
    /// The pre-semantic candidate set (temporal + entity stages) is
    /// served from the conversation cache when the criteria match the
    /// previous call and the entry is live; the semantic stage always
    /// re-runs because the query text changes per call.
    ///
    /// Failure semantics:
    /// - store unavailable → `Err(StoreUnavailable)`, cache untouched;
    /// - query embedding fails → `Ok` with the pre-semantic set
    ///   truncated to `top_k` and `semantic_skipped = true`;
    /// - empty result → `Ok` with an empty list (not an error).
    ///
    /// Dropping the returned future abandons any in-flight embedding
    /// calls. The cache is only written by the scope rebuild, which is
    /// query-independent, so an abandoned retrieval can never leave a
    /// corrupt or query-specific entry behind.
    pub async fn retrieve(
        &self,
        query: &str,
        criteria: &FilterCriteria,
        top_k: Option<usize>,
    ) -> Result<Retrieval> {
        let top_k = top_k.unwrap_or(self.config.top_k);
        let now = Utc::now();

        let snapshot = self
            .cache
            .get_or_build(criteria, || async {
                let corpus = self.store.get_all(self.config.corpus_limit).await?;
                Ok(filter::apply_scope(corpus, criteria, now))
            })
            .await?;

        let post_entity = snapshot.articles.len();
        let query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };

        let (articles, semantic_skipped) = filter::apply_semantic(
            self.provider.as_ref(),
            snapshot.articles.clone(),
            query,
            top_k,
            self.config.embed_concurrency,
        )
        .await;

        if semantic_skipped {
            warn!("semantic ranking skipped for this retrieval");
        }

        let stages = StageCounts {
            corpus: snapshot.corpus,
            post_temporal: snapshot.post_temporal,
            post_entity,
            returned: articles.len(),
        };
        debug!(?stages, semantic_skipped, "retrieval complete");

        Ok(Retrieval {
            articles,
            stages,
            semantic_skipped,
        })
    }

    pub fn cache(&self) -> &ConversationCache {
        &self.cache
    }
}

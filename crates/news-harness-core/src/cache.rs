//! Conversation-scoped cache for pre-semantic candidate sets.
//!
//! One cache instance belongs to one conversation: it holds a single
//! entry, the candidate set left after the temporal and entity stages,
//! keyed by the [`FilterCriteria`] that produced it. The first query in
//! a scope pays the full corpus-scan cost; follow-up queries in the
//! same scope within the TTL pay only the semantic-stage cost. Any
//! change to the criteria replaces the entry wholesale — there is no
//! partial invalidation.
//!
//! The entry is an atomically-replaceable value behind a mutex with an
//! `Arc` snapshot handed out on hit, so a host running one cache per
//! session across threads can never observe a torn entry.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::criteria::FilterCriteria;
use crate::error::Result;
use crate::models::ScopeSnapshot;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    snapshot: Arc<ScopeSnapshot>,
    criteria: FilterCriteria,
    created_at: Instant,
}

/// Single-entry cache for the most recent filter scope.
pub struct ConversationCache {
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl ConversationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Return the cached snapshot when it is still live and was built
    /// for the same criteria; otherwise run `build` and replace the
    /// entry wholesale.
    ///
    /// The lock is never held across the build await, so two concurrent
    /// misses may both rebuild; the last write wins, which is safe
    /// because the snapshot is scope-only and query-independent.
    pub async fn get_or_build<F, Fut>(
        &self,
        criteria: &FilterCriteria,
        build: F,
    ) -> Result<Arc<ScopeSnapshot>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ScopeSnapshot>>,
    {
        if let Some(snapshot) = self.get(criteria) {
            debug!("conversation cache hit");
            return Ok(snapshot);
        }

        debug!("conversation cache miss, rebuilding scope");
        let snapshot = Arc::new(build().await?);
        self.store(criteria.clone(), snapshot.clone());
        Ok(snapshot)
    }

    /// Snapshot lookup. Valid iff an entry exists, has not outlived the
    /// TTL, and was built for exactly these criteria (including the
    /// "no filter" states).
    pub fn get(&self, criteria: &FilterCriteria) -> Option<Arc<ScopeSnapshot>> {
        let guard = self.entry.lock().unwrap();
        guard
            .as_ref()
            .filter(|e| e.created_at.elapsed() < self.ttl && e.criteria == *criteria)
            .map(|e| e.snapshot.clone())
    }

    /// Drop the current entry, forcing the next lookup to rebuild.
    pub fn invalidate(&self) {
        *self.entry.lock().unwrap() = None;
    }

    fn store(&self, criteria: FilterCriteria, snapshot: Arc<ScopeSnapshot>) {
        *self.entry.lock().unwrap() = Some(CacheEntry {
            snapshot,
            criteria,
            created_at: Instant::now(),
        });
    }
}

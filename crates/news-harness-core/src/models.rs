//! Core data models used throughout News Harness.
//!
//! These types represent the articles, filter snapshots, and ranked
//! results that flow through the retrieval pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A stored financial news article. Immutable once written to the store;
/// filter stages only change set membership and order, never the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Stable identifier: hex SHA-256 of the canonical article URL.
    pub id: String,
    pub title: String,
    pub body: String,
    pub source: String,
    pub url: String,
    /// Company/organization tag. Frequently empty for scraped content,
    /// which is why entity filtering also matches title and body.
    #[serde(default)]
    pub entity: String,
    /// Nominal publication time. Absent when the source page carried
    /// none or the value did not parse.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Assigned when the record was written to the store. Always present.
    pub ingested_at: DateTime<Utc>,
    /// Opaque bag of precomputed analysis fields (sentiment score and
    /// category, risk score, summary). Attached upstream by the analysis
    /// annotator; the retrieval engine only passes these through.
    #[serde(default)]
    pub annotations: serde_json::Value,
    /// Dense vector computed from title + body at ingestion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Article {
    /// Content-hash identifier for an article.
    ///
    /// Hashes the URL only: upstream title edits and re-annotation must
    /// not mint a new identity, or re-ingesting a revised article would
    /// duplicate it instead of updating its row.
    pub fn content_id(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// The instant used for temporal filtering, plus which field supplied
    /// it. `published_at` wins when present; otherwise the ingestion
    /// timestamp is the date of record.
    pub fn resolved_date(&self) -> (DateTime<Utc>, DateSource) {
        match self.published_at {
            Some(ts) => (ts, DateSource::Published),
            None => (self.ingested_at, DateSource::Ingested),
        }
    }

    /// The text embeddings are computed from.
    pub fn embedding_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.body)
    }
}

/// Which timestamp field supplied an article's date of record.
///
/// Reported per result so that fallback behavior is visible to callers
/// and testable, rather than an accident of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    Published,
    Ingested,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSource::Published => write!(f, "published"),
            DateSource::Ingested => write!(f, "ingested"),
        }
    }
}

/// A ranked article as returned by the retrieval engine.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredArticle {
    pub article: Article,
    /// Cosine similarity to the query in `[-1.0, 1.0]`. `None` when
    /// semantic ranking was skipped (no query, or degraded retrieval).
    pub score: Option<f32>,
    pub date_source: DateSource,
}

/// Candidate-set sizes observed at each pipeline stage.
///
/// Each stage only removes articles, so
/// `corpus >= post_temporal >= post_entity >= returned` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub corpus: usize,
    pub post_temporal: usize,
    pub post_entity: usize,
    pub returned: usize,
}

/// The pre-semantic candidate set: the corpus narrowed by the temporal
/// and entity stages, with the counts observed while narrowing.
///
/// This is what the conversation cache holds — it is scope-only (no
/// query text involved), so it can be reused across consecutive queries
/// that share filters.
#[derive(Debug, Clone)]
pub struct ScopeSnapshot {
    pub articles: Vec<Article>,
    pub corpus: usize,
    pub post_temporal: usize,
}

/// Result of one retrieval: the ranked articles plus observability data.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieval {
    pub articles: Vec<ScoredArticle>,
    pub stages: StageCounts,
    /// True when the query embedding failed and the results fell back to
    /// the pre-semantic ordering truncated to `top_k`.
    pub semantic_skipped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(published: Option<DateTime<Utc>>) -> Article {
        Article {
            id: Article::content_id("http://example.com/a"),
            title: "Title".into(),
            body: "Body".into(),
            source: "test".into(),
            url: "http://example.com/a".into(),
            entity: String::new(),
            published_at: published,
            ingested_at: Utc.with_ymd_and_hms(2025, 9, 5, 12, 0, 0).unwrap(),
            annotations: serde_json::json!({}),
            embedding: None,
        }
    }

    #[test]
    fn content_id_is_stable() {
        let a = Article::content_id("http://example.com/a");
        let b = Article::content_id("http://example.com/a");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, Article::content_id("http://example.com/b"));
    }

    #[test]
    fn resolved_date_prefers_published() {
        let published = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let (ts, src) = article(Some(published)).resolved_date();
        assert_eq!(ts, published);
        assert_eq!(src, DateSource::Published);
    }

    #[test]
    fn resolved_date_falls_back_to_ingested() {
        let a = article(None);
        let (ts, src) = a.resolved_date();
        assert_eq!(ts, a.ingested_at);
        assert_eq!(src, DateSource::Ingested);
    }
}

//! Article ingestion from a collector dump.
//!
//! The news collector (an external process) writes a JSON array of raw
//! articles with whatever analysis annotations the upstream annotator
//! attached. Ingestion normalizes each item into an [`Article`]: content
//! hash id, best-effort publish date parse, ingestion timestamp, and an
//! optional title+body embedding computed once here so retrieval never
//! has to embed stored articles.
//!
//! A publish date that fails every known format is stored as absent —
//! the article then filters by its ingestion timestamp, and the date
//! source is reported on retrieval.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use news_harness_core::embedding::EmbeddingProvider;
use news_harness_core::models::Article;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// One item in the collector's JSON dump. Unknown fields are ignored;
/// analysis fields ride along opaquely in `annotations`.
#[derive(Debug, Deserialize)]
pub struct CollectedArticle {
    pub title: String,
    #[serde(alias = "text")]
    pub body: String,
    #[serde(alias = "link")]
    pub url: String,
    /// Either a plain string or an object with a `name` field,
    /// depending on collector version.
    #[serde(default)]
    pub source: serde_json::Value,
    #[serde(default)]
    pub entity: String,
    #[serde(default, alias = "publish_date")]
    pub published_at: Option<String>,
    /// Precomputed sentiment/risk/summary fields, passed through as-is.
    #[serde(default)]
    pub annotations: serde_json::Value,
}

impl CollectedArticle {
    fn source_name(&self) -> String {
        match &self.source {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(map) => map
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            _ => "unknown".to_string(),
        }
    }

    fn into_article(self, ingested_at: DateTime<Utc>) -> Article {
        let source = self.source_name();
        let published_at = self.published_at.as_deref().and_then(parse_publish_date);
        Article {
            id: Article::content_id(&self.url),
            title: self.title,
            body: self.body,
            source,
            url: self.url,
            entity: self.entity,
            published_at,
            ingested_at,
            annotations: self.annotations,
            embedding: None,
        }
    }
}

/// Parse the date formats collectors have been observed to emit.
pub fn parse_publish_date(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "N/A" || trimmed == "Unknown" {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date.and_hms_opt(0, 0, 0).unwrap().and_utc());
        }
    }
    None
}

/// Ingest a collector dump into the article store.
///
/// Articles that cannot be embedded are still stored (without a vector);
/// the semantic stage computes missing vectors on demand, so an
/// embedding outage never blocks ingestion.
pub async fn run_ingest(
    config: &Config,
    file: &Path,
    provider: Arc<dyn EmbeddingProvider>,
    embed: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read article dump: {}", file.display()))?;
    let collected: Vec<CollectedArticle> =
        serde_json::from_str(&content).with_context(|| "Failed to parse article dump JSON")?;

    let store = SqliteStore::connect(&config.db).await?;

    let mut upserted = 0usize;
    let mut embedded = 0usize;
    let mut undated = 0usize;

    for item in collected {
        let mut article = item.into_article(Utc::now());
        if article.published_at.is_none() {
            undated += 1;
        }

        if embed {
            match provider.embed(&article.embedding_text()).await {
                Ok(vec) => {
                    article.embedding = Some(vec);
                    embedded += 1;
                }
                Err(err) => {
                    warn!(
                        article_id = %article.id,
                        error = %err,
                        "storing article without embedding"
                    );
                }
            }
        }

        let model = article.embedding.as_ref().map(|_| provider.model_name());
        store.upsert_article(&article, model).await?;
        upserted += 1;
    }

    println!("ingest {}", file.display());
    println!("  upserted articles: {}", upserted);
    if embed {
        println!("  embeddings written: {}", embedded);
    }
    if undated > 0 {
        println!("  without publish date: {}", undated);
    }
    println!("ok");

    store.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_known_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 9, 3, 0, 0, 0).unwrap();
        assert_eq!(parse_publish_date("2025-09-03"), Some(expected));
        assert_eq!(parse_publish_date("09/03/2025"), Some(expected));
        assert_eq!(
            parse_publish_date("2025-09-03T10:30:00"),
            Some(Utc.with_ymd_and_hms(2025, 9, 3, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_publish_date("2025-09-03 10:30:00"),
            Some(Utc.with_ymd_and_hms(2025, 9, 3, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_publish_date("2025-09-03T10:30:00Z"),
            Some(Utc.with_ymd_and_hms(2025, 9, 3, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn unparseable_dates_resolve_to_none() {
        assert_eq!(parse_publish_date(""), None);
        assert_eq!(parse_publish_date("N/A"), None);
        assert_eq!(parse_publish_date("Unknown"), None);
        assert_eq!(parse_publish_date("three days ago"), None);
    }

    #[test]
    fn collected_article_normalizes_source_shapes() {
        let from_string: CollectedArticle = serde_json::from_value(serde_json::json!({
            "title": "T",
            "text": "B",
            "url": "http://example.com/1",
            "source": "Reuters"
        }))
        .unwrap();
        assert_eq!(from_string.source_name(), "Reuters");

        let from_object: CollectedArticle = serde_json::from_value(serde_json::json!({
            "title": "T",
            "text": "B",
            "url": "http://example.com/2",
            "source": { "name": "Bloomberg" }
        }))
        .unwrap();
        assert_eq!(from_object.source_name(), "Bloomberg");

        let missing: CollectedArticle = serde_json::from_value(serde_json::json!({
            "title": "T",
            "text": "B",
            "url": "http://example.com/3"
        }))
        .unwrap();
        assert_eq!(missing.source_name(), "unknown");
    }

    #[test]
    fn into_article_assigns_content_id_and_fallback_date() {
        let item: CollectedArticle = serde_json::from_value(serde_json::json!({
            "title": "Quarterly results",
            "text": "Body",
            "url": "http://example.com/q",
            "publish_date": "garbage"
        }))
        .unwrap();
        let ingested = Utc.with_ymd_and_hms(2025, 9, 5, 0, 0, 0).unwrap();
        let article = item.into_article(ingested);
        assert_eq!(article.id, Article::content_id("http://example.com/q"));
        assert!(article.published_at.is_none());
        assert_eq!(article.ingested_at, ingested);
    }
}

//! SQLite-backed [`ArticleStore`] implementation.
//!
//! The store owns its connection pool: [`SqliteStore::connect`] opens
//! the database file (creating parent directories and the file itself
//! on first use) in WAL mode with a busy timeout, sized for this
//! read-mostly workload where the only writer is an ingest run.
//!
//! The corpus fetch maps any sqlx failure to `StoreUnavailable`, which
//! the retrieval engine treats as fatal for the current call. Writes
//! (`upsert_article`) sit outside the core trait — they belong to the
//! ingestion path, not retrieval.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::warn;

use news_harness_core::embedding::{blob_to_vec, vec_to_blob};
use news_harness_core::error::RetrievalError;
use news_harness_core::models::Article;
use news_harness_core::store::ArticleStore;

use crate::config::DbConfig;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the article database.
    pub async fn connect(db: &DbConfig) -> Result<Self> {
        if let Some(parent) = db.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db.path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        // Retrieval is read-only and ingest is a single sequential
        // writer, so a small pool is plenty.
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert or replace an article by id.
    ///
    /// The id is a content hash of the URL, so a re-ingested article
    /// whose title or annotations changed upstream lands on the same
    /// row and updates it in place.
    pub async fn upsert_article(&self, article: &Article, model: Option<&str>) -> Result<()> {
        let embedding_blob = article.embedding.as_deref().map(vec_to_blob);
        sqlx::query(
            r#"
            INSERT INTO articles
                (id, title, body, source, url, entity, published_at, ingested_at,
                 annotations_json, embedding, embedding_model)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                source = excluded.source,
                url = excluded.url,
                entity = excluded.entity,
                published_at = excluded.published_at,
                ingested_at = excluded.ingested_at,
                annotations_json = excluded.annotations_json,
                embedding = excluded.embedding,
                embedding_model = excluded.embedding_model
            "#,
        )
        .bind(&article.id)
        .bind(&article.title)
        .bind(&article.body)
        .bind(&article.source)
        .bind(&article.url)
        .bind(&article.entity)
        .bind(article.published_at.map(|ts| ts.timestamp()))
        .bind(article.ingested_at.timestamp())
        .bind(serde_json::to_string(&article.annotations)?)
        .bind(embedding_blob)
        .bind(model)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Article counts grouped by source, descending.
    pub async fn counts_by_source(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            "SELECT source, COUNT(*) as n FROM articles GROUP BY source ORDER BY n DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| (row.get::<String, _>("source"), row.get::<i64, _>("n")))
            .collect())
    }
}

/// Map a row to an [`Article`], or `None` when the stored ingestion
/// timestamp is out of range. Temporal filtering must never see a
/// fabricated date, so a corrupt row is skipped with a warning rather
/// than patched over.
fn row_to_article(row: &sqlx::sqlite::SqliteRow) -> Option<Article> {
    let published_at: Option<i64> = row.get("published_at");
    let ingested_at: i64 = row.get("ingested_at");
    let annotations_json: String = row.get("annotations_json");
    let embedding: Option<Vec<u8>> = row.get("embedding");

    let Some(ingested_at) = DateTime::from_timestamp(ingested_at, 0) else {
        let id: String = row.get("id");
        warn!(article_id = %id, "skipping row with corrupt ingestion timestamp");
        return None;
    };

    Some(Article {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        source: row.get("source"),
        url: row.get("url"),
        entity: row.get("entity"),
        published_at: published_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        ingested_at,
        annotations: serde_json::from_str(&annotations_json)
            .unwrap_or(serde_json::Value::Null),
        embedding: embedding.as_deref().map(blob_to_vec),
    })
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn get_all(&self, limit: usize) -> std::result::Result<Vec<Article>, RetrievalError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, body, source, url, entity, published_at, ingested_at,
                   annotations_json, embedding
            FROM articles
            ORDER BY COALESCE(published_at, ingested_at) DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RetrievalError::StoreUnavailable(e.to_string()))?;

        Ok(rows.iter().filter_map(row_to_article).collect())
    }

    async fn count(&self) -> std::result::Result<usize, RetrievalError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RetrievalError::StoreUnavailable(e.to_string()))?;
        Ok(count as usize)
    }
}

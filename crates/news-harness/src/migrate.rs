use anyhow::Result;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let store = SqliteStore::connect(&config.db).await?;
    let pool = store.pool();

    // One row per article, keyed by content hash. The embedding column
    // holds little-endian f32 bytes written at ingestion time.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            source TEXT NOT NULL,
            url TEXT NOT NULL,
            entity TEXT NOT NULL DEFAULT '',
            published_at INTEGER,
            ingested_at INTEGER NOT NULL,
            annotations_json TEXT NOT NULL DEFAULT '{}',
            embedding BLOB,
            embedding_model TEXT,
            UNIQUE(url)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_articles_ingested_at ON articles(ingested_at DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_entity ON articles(entity)")
        .execute(pool)
        .await?;

    store.close().await;
    Ok(())
}

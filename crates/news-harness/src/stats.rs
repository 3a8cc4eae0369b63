//! The `stats` command: corpus counts and active retrieval settings.

use anyhow::Result;

use news_harness_core::store::ArticleStore;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::connect(&config.db).await?;

    let total = store.count().await?;
    println!("articles: {}", total);

    let by_source = store.counts_by_source().await?;
    if !by_source.is_empty() {
        println!("by source:");
        for (source, n) in by_source {
            println!("  {}: {}", source, n);
        }
    }

    println!("retrieval:");
    println!("  top_k: {}", config.retrieval.top_k);
    println!("  corpus_limit: {}", config.retrieval.corpus_limit);
    println!("  cache_ttl_secs: {}", config.retrieval.cache_ttl_secs);
    println!(
        "embedding: {} ({})",
        config.embedding.provider,
        config
            .embedding
            .model
            .as_deref()
            .unwrap_or("no model configured")
    );

    store.close().await;
    Ok(())
}

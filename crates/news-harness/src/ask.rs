//! The `ask` command: run a retrieval query against the article store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use news_harness_core::cache::ConversationCache;
use news_harness_core::criteria::{DateFilter, FilterCriteria};
use news_harness_core::engine::{EngineConfig, RetrievalEngine};

use crate::config::Config;
use crate::embedding;
use crate::sqlite_store::SqliteStore;

pub async fn run_ask(
    config: &Config,
    query: &str,
    entity: Option<String>,
    date: Option<String>,
    top_k: Option<usize>,
) -> Result<()> {
    let date_filter = match date {
        Some(ref s) => DateFilter::parse(s)?,
        None => DateFilter::All,
    };
    let criteria = FilterCriteria::new(entity.as_deref(), date_filter);

    let store = Arc::new(SqliteStore::connect(&config.db).await?);
    let provider = embedding::create_provider(&config.embedding)?;
    let cache = ConversationCache::new(Duration::from_secs(config.retrieval.cache_ttl_secs));
    let engine = RetrievalEngine::new(
        store.clone(),
        provider,
        cache,
        EngineConfig {
            top_k: config.retrieval.top_k,
            corpus_limit: config.retrieval.corpus_limit,
            embed_concurrency: config.retrieval.embed_concurrency,
        },
    );

    let retrieval = engine.retrieve(query, &criteria, top_k).await?;

    if retrieval.articles.is_empty() {
        println!("No results.");
        store.close().await;
        return Ok(());
    }

    if retrieval.semantic_skipped {
        println!("(semantic ranking unavailable — results ordered by recency)");
        println!();
    }

    for (i, scored) in retrieval.articles.iter().enumerate() {
        let article = &scored.article;
        let (date, source) = article.resolved_date();
        let score_display = match scored.score {
            Some(s) => format!("{:.3}", s),
            None => "--".to_string(),
        };

        println!(
            "{}. [{}] {} / {}",
            i + 1,
            score_display,
            article.source,
            article.title
        );
        if !article.entity.is_empty() {
            println!("    entity: {}", article.entity);
        }
        println!("    date: {} ({})", date.format("%Y-%m-%d"), source);
        if !article.url.is_empty() {
            println!("    url: {}", article.url);
        }
        let excerpt: String = article.body.chars().take(240).collect();
        println!("    excerpt: \"{}\"", excerpt.replace('\n', " ").trim());
        println!();
    }

    let stages = &retrieval.stages;
    println!(
        "stages: corpus {} -> temporal {} -> entity {} -> returned {}",
        stages.corpus, stages.post_temporal, stages.post_entity, stages.returned
    );

    store.close().await;
    Ok(())
}

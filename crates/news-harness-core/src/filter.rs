//! Staged filter pipeline: temporal → entity → semantic.
//!
//! Stage order is fixed, cheapest and most-eliminating first, so that
//! embedding work only ever happens for candidates that survived the
//! cheap metadata stages. Every stage strictly narrows the previous
//! stage's output — membership and order change, articles never do.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::criteria::{DateFilter, FilterCriteria};
use crate::embedding::EmbeddingProvider;
use crate::models::{Article, ScopeSnapshot, ScoredArticle};
use crate::similarity;

/// Keep articles whose resolved date is on/after the filter's cutoff.
///
/// `DateFilter::All` is a no-op. An article without a `published_at`
/// falls back to its ingestion timestamp (see
/// [`Article::resolved_date`]), so nothing is silently dropped for
/// missing dates — the inclusive default is deliberate, and the date
/// source used is reported on every result.
pub fn apply_temporal(
    articles: Vec<Article>,
    date: &DateFilter,
    now: DateTime<Utc>,
) -> Vec<Article> {
    let Some(cutoff) = date.cutoff(now) else {
        return articles;
    };
    articles
        .into_iter()
        .filter(|a| a.resolved_date().0 >= cutoff)
        .collect()
}

/// Keep articles mentioning the entity filter string.
///
/// The structured `entity` tag is frequently empty for scraped content,
/// so the match also runs over title and body. Case-insensitive
/// substring semantics.
pub fn apply_entity(articles: Vec<Article>, entity: Option<&str>) -> Vec<Article> {
    let Some(filter) = entity else {
        return articles;
    };
    let needle = filter.to_lowercase();
    articles
        .into_iter()
        .filter(|a| {
            a.entity.to_lowercase().contains(&needle)
                || a.title.to_lowercase().contains(&needle)
                || a.body.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Run the temporal and entity stages over a full corpus fetch.
///
/// This is the scope rebuild the conversation cache invokes on a miss.
/// It is query-independent, so completing and caching it is safe even
/// when the retrieval that triggered it has been abandoned.
pub fn apply_scope(
    corpus: Vec<Article>,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> ScopeSnapshot {
    let corpus_len = corpus.len();
    let after_temporal = apply_temporal(corpus, &criteria.date, now);
    let post_temporal = after_temporal.len();
    let after_entity = apply_entity(after_temporal, criteria.entity.as_deref());
    debug!(
        corpus = corpus_len,
        post_temporal,
        post_entity = after_entity.len(),
        "scope rebuilt"
    );
    ScopeSnapshot {
        articles: after_entity,
        corpus: corpus_len,
        post_temporal,
    }
}

/// Rank surviving candidates against the query and truncate to `top_k`.
///
/// The query is embedded once. Candidate vectors are read from the
/// articles (computed at ingestion time); a candidate that arrives
/// without one is embedded on the fly with bounded concurrency of
/// `concurrency` in-flight provider calls. Completion order does not
/// matter — the pre-semantic order is restored before the stable sort,
/// so equal scores keep their stage-2 relative order.
///
/// Failure handling:
/// - query embedding fails → fall back to the pre-semantic ordering
///   truncated to `top_k`, second tuple element is `true`;
/// - one candidate's embedding fails → that candidate is dropped from
///   ranking (logged, reflected only in the reduced final count).
///
/// With no query this stage is a plain truncation to `top_k` in the
/// order stage 2 produced.
pub async fn apply_semantic(
    provider: &dyn EmbeddingProvider,
    candidates: Vec<Article>,
    query: Option<&str>,
    top_k: usize,
    concurrency: usize,
) -> (Vec<ScoredArticle>, bool) {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return (truncate_unranked(candidates, top_k), false);
    };

    let query_vec = match provider.embed(query).await {
        Ok(vec) => vec,
        Err(err) => {
            warn!(error = %err, "query embedding failed, returning pre-semantic ordering");
            return (truncate_unranked(candidates, top_k), true);
        }
    };

    // Split candidates into those with a stored vector and those that
    // still need one; only the latter hit the provider.
    let mut resolved: Vec<(usize, Article, Vec<f32>)> = Vec::with_capacity(candidates.len());
    let mut pending: Vec<(usize, Article)> = Vec::new();
    for (idx, article) in candidates.into_iter().enumerate() {
        match article.embedding.clone() {
            Some(vec) => resolved.push((idx, article, vec)),
            None => pending.push((idx, article)),
        }
    }

    if !pending.is_empty() {
        let computed: Vec<Option<(usize, Article, Vec<f32>)>> =
            stream::iter(pending.into_iter().map(|(idx, article)| async move {
                match provider.embed(&article.embedding_text()).await {
                    Ok(vec) => Some((idx, article, vec)),
                    Err(err) => {
                        warn!(
                            article_id = %article.id,
                            error = %err,
                            "dropping candidate: embedding unavailable"
                        );
                        None
                    }
                }
            }))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;
        resolved.extend(computed.into_iter().flatten());
    }

    // Restore pre-semantic order so the stable sort breaks ties by it.
    resolved.sort_by_key(|(idx, _, _)| *idx);

    let ranked = similarity::rank(
        &query_vec,
        resolved
            .into_iter()
            .map(|(_, article, vec)| (article, vec))
            .collect(),
    );

    let scored = ranked
        .into_iter()
        .take(top_k)
        .map(|(article, score)| {
            let (_, date_source) = article.resolved_date();
            ScoredArticle {
                article,
                score: Some(score),
                date_source,
            }
        })
        .collect();
    (scored, false)
}

fn truncate_unranked(candidates: Vec<Article>, top_k: usize) -> Vec<ScoredArticle> {
    candidates
        .into_iter()
        .take(top_k)
        .map(|article| {
            let (_, date_source) = article.resolved_date();
            ScoredArticle {
                article,
                score: None,
                date_source,
            }
        })
        .collect()
}

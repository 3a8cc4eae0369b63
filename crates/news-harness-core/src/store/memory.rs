//! In-memory [`ArticleStore`] implementation for testing.
//!
//! Uses a `Vec` behind `std::sync::RwLock` for thread safety. Fetch
//! order is most-recent resolved date first, matching what a vector
//! index with a recency sort would return.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Article;

use super::ArticleStore;

/// In-memory store for tests and examples.
pub struct InMemoryStore {
    articles: RwLock<Vec<Article>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            articles: RwLock::new(Vec::new()),
        }
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            articles: RwLock::new(articles),
        }
    }

    /// Insert or replace by id.
    pub fn upsert(&self, article: Article) {
        let mut articles = self.articles.write().unwrap();
        if let Some(existing) = articles.iter_mut().find(|a| a.id == article.id) {
            *existing = article;
        } else {
            articles.push(article);
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn get_all(&self, limit: usize) -> Result<Vec<Article>> {
        let articles = self.articles.read().unwrap();
        let mut all: Vec<Article> = articles.clone();
        all.sort_by_key(|a| std::cmp::Reverse(a.resolved_date().0));
        all.truncate(limit);
        Ok(all)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.articles.read().unwrap().len())
    }
}

//! A mock store used for testing.
//!
//! Emulates the semantics of the Postgres schema (soft delete, live-slug
//! uniqueness, `created_at DESC` ordering) with in-memory vectors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ApiKeyStore, ArticleStore, slug_conflict};
use crate::{
    error::AppError,
    models::{
        api_key::{ApiKey, NewApiKey},
        article::{Article, ArticleChanges, ArticleStats, ArticleStatus, NewArticle, Pagination},
    },
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Articles in insertion order, including soft-deleted ones.
    articles: Mutex<Vec<Article>>,
    keys: Mutex<Vec<ApiKey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row, soft-deleted ones included.
    pub async fn all_articles(&self) -> Vec<Article> {
        self.articles.lock().await.clone()
    }

    pub async fn key(&self, id: Uuid) -> Option<ApiKey> {
        self.keys.lock().await.iter().find(|k| k.id == id).cloned()
    }
}

fn live(article: &Article) -> bool {
    article.deleted_at.is_none()
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn insert_article(&self, article: NewArticle) -> Result<Article, AppError> {
        let mut articles = self.articles.lock().await;
        if articles.iter().any(|a| live(a) && a.slug == article.slug) {
            return Err(slug_conflict(&article.slug));
        }

        let now = Utc::now();
        let created = Article {
            id: Uuid::new_v4(),
            title: article.title,
            content: article.content,
            slug: article.slug,
            status: article.status,
            expires_at: article.expires_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        articles.push(created.clone());
        Ok(created)
    }

    async fn find_article(&self, id: Uuid) -> Result<Option<Article>, AppError> {
        let articles = self.articles.lock().await;
        Ok(articles.iter().find(|a| live(a) && a.id == id).cloned())
    }

    async fn find_article_by_slug(&self, slug: &str) -> Result<Option<Article>, AppError> {
        let articles = self.articles.lock().await;
        Ok(articles.iter().find(|a| live(a) && a.slug == slug).cloned())
    }

    async fn update_article(&self, id: Uuid, changes: &ArticleChanges) -> Result<bool, AppError> {
        let mut articles = self.articles.lock().await;
        let Some(article) = articles.iter_mut().find(|a| live(a) && a.id == id) else {
            return Ok(false);
        };

        if let Some(title) = &changes.title {
            article.title = title.clone();
        }
        if let Some(content) = &changes.content {
            article.content = content.clone();
        }
        if let Some(status) = changes.status {
            article.status = status;
        }
        if let Some(expires_at) = changes.expires_at {
            article.expires_at = Some(expires_at);
        }
        article.updated_at = Utc::now();
        Ok(true)
    }

    async fn soft_delete_article(&self, id: Uuid) -> Result<bool, AppError> {
        let mut articles = self.articles.lock().await;
        match articles.iter_mut().find(|a| live(a) && a.id == id) {
            Some(article) => {
                article.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_articles(
        &self,
        status: Option<ArticleStatus>,
        pagination: Pagination,
    ) -> Result<(Vec<Article>, i64), AppError> {
        let articles = self.articles.lock().await;
        // Newest insert first so equal timestamps still come out newest first
        let mut matching: Vec<Article> = articles
            .iter()
            .rev()
            .filter(|a| live(a) && status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_expired_published(&self, now: DateTime<Utc>) -> Result<Vec<Article>, AppError> {
        let articles = self.articles.lock().await;
        Ok(articles
            .iter()
            .filter(|a| live(a) && a.is_published() && a.is_expired_at(now))
            .cloned()
            .collect())
    }

    async fn mark_expired(&self, id: Uuid) -> Result<bool, AppError> {
        let mut articles = self.articles.lock().await;
        match articles
            .iter_mut()
            .find(|a| live(a) && a.id == id && a.is_published())
        {
            Some(article) => {
                article.status = ArticleStatus::Expired;
                article.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn article_stats(&self) -> Result<ArticleStats, AppError> {
        let articles = self.articles.lock().await;
        let mut stats = ArticleStats::default();
        for article in articles.iter().filter(|a| live(a)) {
            stats.total += 1;
            match article.status {
                ArticleStatus::Published => stats.published += 1,
                ArticleStatus::Draft => stats.draft += 1,
                ArticleStatus::Expired => stats.expired += 1,
            }
        }
        Ok(stats)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ApiKeyStore for MemoryStore {
    async fn find_active_key(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let keys = self.keys.lock().await;
        Ok(keys
            .iter()
            .find(|k| k.is_active && k.key_hash == key_hash)
            .cloned())
    }

    async fn touch_key(&self, id: Uuid, used_at: DateTime<Utc>) -> Result<(), AppError> {
        let mut keys = self.keys.lock().await;
        if let Some(key) = keys.iter_mut().find(|k| k.id == id) {
            key.last_used_at = Some(used_at);
        }
        Ok(())
    }

    async fn insert_key(&self, key: NewApiKey) -> Result<ApiKey, AppError> {
        let now = Utc::now();
        let created = ApiKey {
            id: Uuid::new_v4(),
            name: key.name,
            key_hash: key.key_hash,
            is_active: true,
            last_used_at: None,
            expires_at: key.expires_at,
            permissions: key.permissions,
            created_at: now,
            updated_at: now,
        };
        self.keys.lock().await.push(created.clone());
        Ok(created)
    }

    async fn list_keys(&self) -> Result<Vec<ApiKey>, AppError> {
        let keys = self.keys.lock().await;
        Ok(keys.iter().rev().cloned().collect())
    }

    async fn deactivate_key(&self, id: Uuid) -> Result<bool, AppError> {
        let mut keys = self.keys.lock().await;
        match keys.iter_mut().find(|k| k.id == id) {
            Some(key) => {
                key.is_active = false;
                key.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

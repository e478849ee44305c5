//! Persistence interfaces for articles and API keys.
//!
//! Services only talk to these traits. `PgStore` is the production
//! implementation; tests use the in-memory `MemoryStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        api_key::{ApiKey, NewApiKey},
        article::{Article, ArticleChanges, ArticleStats, ArticleStatus, NewArticle, Pagination},
    },
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage of articles.
///
/// Every method ignores soft-deleted rows.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new article. A live article with the same slug yields
    /// `AppError::Conflict`.
    async fn insert_article(&self, article: NewArticle) -> Result<Article, AppError>;

    async fn find_article(&self, id: Uuid) -> Result<Option<Article>, AppError>;

    async fn find_article_by_slug(&self, slug: &str) -> Result<Option<Article>, AppError>;

    /// Apply the non-`None` fields and refresh `updated_at`. Returns whether a
    /// live row was touched.
    async fn update_article(&self, id: Uuid, changes: &ArticleChanges) -> Result<bool, AppError>;

    /// Set `deleted_at`. Returns whether a live row was touched.
    async fn soft_delete_article(&self, id: Uuid) -> Result<bool, AppError>;

    /// One page ordered by `created_at` descending, plus the total number of
    /// matching rows.
    async fn list_articles(
        &self,
        status: Option<ArticleStatus>,
        pagination: Pagination,
    ) -> Result<(Vec<Article>, i64), AppError>;

    /// Published articles whose expiry lies before `now`.
    async fn find_expired_published(&self, now: DateTime<Utc>) -> Result<Vec<Article>, AppError>;

    /// Move a still-published article to `expired`. Returns false when the
    /// article changed status in the meantime.
    async fn mark_expired(&self, id: Uuid) -> Result<bool, AppError>;

    async fn article_stats(&self) -> Result<ArticleStats, AppError>;

    /// Connectivity check used by `/health`.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Storage of API keys.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Active key with the given SHA-256 hash.
    async fn find_active_key(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError>;

    async fn touch_key(&self, id: Uuid, used_at: DateTime<Utc>) -> Result<(), AppError>;

    async fn insert_key(&self, key: NewApiKey) -> Result<ApiKey, AppError>;

    async fn list_keys(&self) -> Result<Vec<ApiKey>, AppError>;

    /// Clear `is_active`. Returns whether the key exists.
    async fn deactivate_key(&self, id: Uuid) -> Result<bool, AppError>;
}

pub(crate) fn slug_conflict(slug: &str) -> AppError {
    AppError::Conflict(format!("article with slug '{slug}' already exists"))
}

//! PostgreSQL implementation of the store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ApiKeyStore, ArticleStore, slug_conflict};
use crate::{
    db::DbPool,
    error::AppError,
    models::{
        api_key::{ApiKey, NewApiKey},
        article::{Article, ArticleChanges, ArticleStats, ArticleStatus, NewArticle, Pagination},
    },
};

const ARTICLE_COLUMNS: &str =
    "id, title, content, slug, status, expires_at, created_at, updated_at, deleted_at";

const API_KEY_COLUMNS: &str = "id, name, key_hash, is_active, last_used_at, expires_at, \
     permissions, created_at, updated_at";

/// Store backed by the shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PgStore {
    async fn insert_article(&self, article: NewArticle) -> Result<Article, AppError> {
        let result = sqlx::query_as::<_, Article>(&format!(
            r#"
            INSERT INTO articles (title, content, slug, status, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.slug)
        .bind(article.status)
        .bind(article.expires_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            // Lost a race against a concurrent insert of the same slug
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(slug_conflict(&article.slug))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_article(&self, id: Uuid) -> Result<Option<Article>, AppError> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    async fn find_article_by_slug(&self, slug: &str) -> Result<Option<Article>, AppError> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE slug = $1 AND deleted_at IS NULL"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    async fn update_article(&self, id: Uuid, changes: &ArticleChanges) -> Result<bool, AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE articles
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                status = COALESCE($4, status),
                expires_at = COALESCE($5, expires_at),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.status)
        .bind(changes.expires_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn soft_delete_article(&self, id: Uuid) -> Result<bool, AppError> {
        let deleted = sqlx::query(
            "UPDATE articles SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted > 0)
    }

    async fn list_articles(
        &self,
        status: Option<ArticleStatus>,
        pagination: Pagination,
    ) -> Result<(Vec<Article>, i64), AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM articles
            WHERE deleted_at IS NULL AND ($1::text IS NULL OR status = $1)
            "#,
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let articles = sqlx::query_as::<_, Article>(&format!(
            r#"
            SELECT {ARTICLE_COLUMNS} FROM articles
            WHERE deleted_at IS NULL AND ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status)
        .bind(pagination.limit)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((articles, total))
    }

    async fn find_expired_published(&self, now: DateTime<Utc>) -> Result<Vec<Article>, AppError> {
        let articles = sqlx::query_as::<_, Article>(&format!(
            r#"
            SELECT {ARTICLE_COLUMNS} FROM articles
            WHERE deleted_at IS NULL
              AND status = 'published'
              AND expires_at IS NOT NULL
              AND expires_at < $1
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(articles)
    }

    async fn mark_expired(&self, id: Uuid) -> Result<bool, AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE articles
            SET status = 'expired', updated_at = NOW()
            WHERE id = $1 AND status = 'published' AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn article_stats(&self) -> Result<ArticleStats, AppError> {
        let (total, published, draft, expired) = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'published'),
                   COUNT(*) FILTER (WHERE status = 'draft'),
                   COUNT(*) FILTER (WHERE status = 'expired')
            FROM articles
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ArticleStats {
            total,
            published,
            draft,
            expired,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ApiKeyStore for PgStore {
    async fn find_active_key(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let key = sqlx::query_as::<_, ApiKey>(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys WHERE key_hash = $1 AND is_active = true"
        ))
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    async fn touch_key(&self, id: Uuid, used_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE id = $1")
            .bind(id)
            .bind(used_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_key(&self, key: NewApiKey) -> Result<ApiKey, AppError> {
        let created = sqlx::query_as::<_, ApiKey>(&format!(
            r#"
            INSERT INTO api_keys (name, key_hash, permissions, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {API_KEY_COLUMNS}
            "#
        ))
        .bind(&key.name)
        .bind(&key.key_hash)
        .bind(&key.permissions)
        .bind(key.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_keys(&self) -> Result<Vec<ApiKey>, AppError> {
        let keys = sqlx::query_as::<_, ApiKey>(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn deactivate_key(&self, id: Uuid) -> Result<bool, AppError> {
        let updated =
            sqlx::query("UPDATE api_keys SET is_active = false, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(updated > 0)
    }
}

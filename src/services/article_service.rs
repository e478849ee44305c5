//! Article service - article lifecycle and static snapshot coupling.
//!
//! This service handles:
//! - Slug generation and uniqueness checks
//! - Partial updates with status transitions
//! - Keeping the static snapshot of each article in step with its status
//! - The expiry sweep run by the scheduler
//!
//! # Snapshot consistency
//!
//! The database row is authoritative. Snapshot writes and removals happen
//! after the row changed and their failures are logged, never returned: a
//! request that changed the row reports success even if the file system
//! could not follow.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::article::{
        Article, ArticleChanges, ArticlePage, ArticleStats, ArticleStatus, CreateArticle,
        NewArticle, Pagination,
    },
    services::{
        publisher::StaticPublisher,
        slug::{generate_slug, is_valid_slug},
    },
    store::ArticleStore,
};

const NOT_FOUND: &str = "Article not found";

/// Upper bound on `-N` suffixes tried when a generated slug is taken.
const MAX_SLUG_SUFFIX: u32 = 100;

#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
    publisher: StaticPublisher,
    domain: String,
}

impl ArticleService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        publisher: StaticPublisher,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            store,
            publisher,
            domain: domain.into(),
        }
    }

    pub fn publisher(&self) -> &StaticPublisher {
        &self.publisher
    }

    /// Public link of `article`, present only while it is published.
    pub fn publish_url(&self, article: &Article) -> Option<String> {
        article
            .is_published()
            .then(|| format!("{}/p/{}", self.domain.trim_end_matches('/'), article.slug))
    }

    /// Create an article.
    ///
    /// # Errors
    ///
    /// - `Validation`: title or content empty, or explicit slug not URL-safe
    /// - `Conflict`: explicit slug already used by a live article
    /// - `Database`: store failure
    pub async fn create(&self, input: CreateArticle) -> Result<Article, AppError> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        if input.content.trim().is_empty() {
            return Err(AppError::Validation("content is required".to_string()));
        }

        let slug = match input.slug {
            Some(slug) => {
                if !is_valid_slug(&slug) {
                    return Err(AppError::Validation(
                        "slug may only contain letters, digits, '-' and '_'".to_string(),
                    ));
                }
                if self.store.find_article_by_slug(&slug).await?.is_some() {
                    return Err(crate::store::slug_conflict(&slug));
                }
                slug
            }
            None => self.free_generated_slug(&input.title, Utc::now()).await?,
        };

        let article = self
            .store
            .insert_article(NewArticle {
                title: input.title,
                content: input.content,
                slug,
                status: input.status.unwrap_or_default(),
                expires_at: input.expires_at,
            })
            .await?;

        tracing::info!(id = %article.id, slug = %article.slug, status = %article.status, "Article created");

        if article.is_published() {
            self.write_snapshot(&article).await;
        }

        Ok(article)
    }

    /// `<title>-<timestamp>`, or `<title>-<timestamp>-N` when two articles
    /// with the same title are created within the same second.
    async fn free_generated_slug(
        &self,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let base = generate_slug(title, now);
        if self.store.find_article_by_slug(&base).await?.is_none() {
            return Ok(base);
        }

        for n in 2..=MAX_SLUG_SUFFIX {
            let candidate = format!("{base}-{n}");
            if self.store.find_article_by_slug(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }

        Err(crate::store::slug_conflict(&base))
    }

    /// Fetch a live article by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Article, AppError> {
        self.store
            .find_article(id)
            .await?
            .ok_or(AppError::NotFound(NOT_FOUND))
    }

    /// Same as [`get_by_id`](Self::get_by_id) for ids taken from a URL.
    /// Anything that is not a UUID cannot exist.
    pub async fn get_by_raw_id(&self, raw: &str) -> Result<Article, AppError> {
        self.get_by_id(parse_id(raw)?).await
    }

    /// Fetch a published article for its public page.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no live article with this slug, or it is not published
    /// - `Gone`: published but past its expiry (the sweep may not have run yet)
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Article, AppError> {
        let article = self
            .store
            .find_article_by_slug(slug)
            .await?
            .filter(Article::is_published)
            .ok_or(AppError::NotFound(NOT_FOUND))?;

        if article.is_expired_at(Utc::now()) {
            return Err(AppError::Gone);
        }

        Ok(article)
    }

    /// Apply a partial update and return the stored result.
    ///
    /// Snapshot side effects, by (old status, new status):
    /// - published → other: snapshot removed
    /// - other → published: snapshot generated
    /// - published → published: snapshot regenerated
    pub async fn update(&self, id: Uuid, changes: ArticleChanges) -> Result<Article, AppError> {
        let before = self.get_by_id(id).await?;

        if !self.store.update_article(id, &changes).await? {
            // Deleted between the read and the write
            return Err(AppError::NotFound(NOT_FOUND));
        }

        let after = self.get_by_id(id).await?;

        match (before.is_published(), after.is_published()) {
            (true, false) => self.remove_snapshot(&before.slug).await,
            (_, true) => self.write_snapshot(&after).await,
            (false, false) => {}
        }

        tracing::info!(%id, from = %before.status, to = %after.status, "Article updated");
        Ok(after)
    }

    pub async fn update_raw(&self, raw: &str, changes: ArticleChanges) -> Result<Article, AppError> {
        self.update(parse_id(raw)?, changes).await
    }

    /// Remove the snapshot of a published article, then soft-delete it.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let article = self.get_by_id(id).await?;

        if article.is_published() {
            self.remove_snapshot(&article.slug).await;
        }

        if !self.store.soft_delete_article(id).await? {
            return Err(AppError::NotFound(NOT_FOUND));
        }

        tracing::info!(%id, slug = %article.slug, "Article deleted");
        Ok(())
    }

    pub async fn delete_raw(&self, raw: &str) -> Result<(), AppError> {
        self.delete(parse_id(raw)?).await
    }

    /// One page of live articles, newest first.
    pub async fn list(
        &self,
        pagination: Pagination,
        status: Option<ArticleStatus>,
    ) -> Result<ArticlePage, AppError> {
        let (articles, total) = self.store.list_articles(status, pagination).await?;
        Ok(ArticlePage {
            articles,
            total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    pub async fn stats(&self) -> Result<ArticleStats, AppError> {
        self.store.article_stats().await
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }

    /// Expire every published article whose expiry has passed.
    ///
    /// Per-article failures are logged and do not stop the sweep. Returns the
    /// number of articles moved to `expired`; running the sweep again right
    /// away returns 0.
    pub async fn cleanup_expired(&self) -> Result<usize, AppError> {
        self.cleanup_expired_at(Utc::now()).await
    }

    pub async fn cleanup_expired_at(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let candidates = self.store.find_expired_published(now).await?;
        let mut expired = 0;

        for article in candidates {
            self.remove_snapshot(&article.slug).await;

            match self.store.mark_expired(article.id).await {
                Ok(true) => expired += 1,
                // Status changed concurrently; leave it alone
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(id = %article.id, error = %e, "Failed to expire article");
                }
            }
        }

        Ok(expired)
    }

    async fn write_snapshot(&self, article: &Article) {
        if let Err(e) = self.publisher.publish(article).await {
            tracing::error!(id = %article.id, slug = %article.slug, error = %e, "Failed to generate static files");
        }
    }

    async fn remove_snapshot(&self, slug: &str) {
        if let Err(e) = self.publisher.unpublish(slug).await {
            tracing::error!(slug, error = %e, "Failed to remove static files");
        }
    }
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(NOT_FOUND))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, templates::Templates};
    use chrono::Duration;
    use tempfile::TempDir;

    struct Fixture {
        service: ArticleService,
        store: Arc<MemoryStore>,
        tmp: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let store = Arc::new(MemoryStore::new());
            let publisher =
                StaticPublisher::new(tmp.path(), "https://example.com", Templates::new().unwrap());
            let service = ArticleService::new(store.clone(), publisher, "https://example.com");
            Self {
                service,
                store,
                tmp,
            }
        }

        fn snapshot(&self, slug: &str) -> std::path::PathBuf {
            self.tmp.path().join("articles").join(slug).join("index.html")
        }

        fn snapshot_dir_exists(&self, slug: &str) -> bool {
            self.tmp.path().join("articles").join(slug).exists()
        }
    }

    fn input(title: &str, status: Option<ArticleStatus>) -> CreateArticle {
        CreateArticle {
            title: title.into(),
            content: "<p>hi</p>".into(),
            status,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_generates_slug_and_defaults_to_draft() {
        let fx = Fixture::new();

        let article = fx.service.create(input("Test", None)).await.unwrap();

        assert_eq!(article.status, ArticleStatus::Draft);
        let suffix = article.slug.strip_prefix("test-").unwrap();
        assert!(suffix.parse::<i64>().is_ok());
        assert!(!fx.snapshot_dir_exists(&article.slug));
        assert_eq!(fx.service.publish_url(&article), None);
    }

    #[tokio::test]
    async fn create_published_writes_snapshot() {
        let fx = Fixture::new();

        let article = fx
            .service
            .create(input("Test", Some(ArticleStatus::Published)))
            .await
            .unwrap();

        let html = std::fs::read_to_string(fx.snapshot(&article.slug)).unwrap();
        assert!(html.contains("<p>hi</p>"));
        assert_eq!(
            fx.service.publish_url(&article),
            Some(format!("https://example.com/p/{}", article.slug))
        );
    }

    #[tokio::test]
    async fn same_title_in_same_second_gets_distinct_slugs() {
        let fx = Fixture::new();
        let now = Utc::now();

        let first = fx.service.free_generated_slug("Same", now).await.unwrap();
        fx.store
            .insert_article(NewArticle {
                title: "Same".into(),
                content: "c".into(),
                slug: first.clone(),
                status: ArticleStatus::Draft,
                expires_at: None,
            })
            .await
            .unwrap();
        let second = fx.service.free_generated_slug("Same", now).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(second, format!("{first}-2"));
    }

    #[tokio::test]
    async fn duplicate_explicit_slug_conflicts() {
        let fx = Fixture::new();
        let mut first = input("One", None);
        first.slug = Some("taken".into());
        fx.service.create(first).await.unwrap();

        let mut second = input("Two", None);
        second.slug = Some("taken".into());
        let err = fx.service.create(second).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleted_article_releases_its_slug() {
        let fx = Fixture::new();
        let mut first = input("One", None);
        first.slug = Some("reused".into());
        let article = fx.service.create(first).await.unwrap();
        fx.service.delete(article.id).await.unwrap();

        let mut second = input("Two", None);
        second.slug = Some("reused".into());
        assert!(fx.service.create(second).await.is_ok());
    }

    #[tokio::test]
    async fn create_requires_title_and_content() {
        let fx = Fixture::new();

        let err = fx.service.create(input("  ", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut no_content = input("Title", None);
        no_content.content = String::new();
        let err = fx.service.create(no_content).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut bad_slug = input("Title", None);
        bad_slug.slug = Some("../../etc".into());
        let err = fx.service.create(bad_slug).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn published_lookup_hides_drafts_and_expired() {
        let fx = Fixture::new();
        let draft = fx.service.create(input("Draft", None)).await.unwrap();

        let mut past = input("Past", Some(ArticleStatus::Published));
        past.expires_at = Some(Utc::now() - Duration::hours(1));
        let past = fx.service.create(past).await.unwrap();

        let mut future = input("Future", Some(ArticleStatus::Published));
        future.expires_at = Some(Utc::now() + Duration::hours(1));
        let future = fx.service.create(future).await.unwrap();

        assert!(matches!(
            fx.service.get_published_by_slug(&draft.slug).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.get_published_by_slug(&past.slug).await,
            Err(AppError::Gone)
        ));
        assert_eq!(
            fx.service
                .get_published_by_slug(&future.slug)
                .await
                .unwrap()
                .id,
            future.id
        );
    }

    #[tokio::test]
    async fn full_lifecycle_ends_in_not_found() {
        let fx = Fixture::new();
        let article = fx.service.create(input("Cycle", None)).await.unwrap();

        let published = fx
            .service
            .update(
                article.id,
                ArticleChanges {
                    status: Some(ArticleStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(published.is_published());
        assert!(fx.snapshot(&article.slug).exists());

        let fetched = fx.service.get_published_by_slug(&article.slug).await.unwrap();
        assert_eq!(fetched.id, article.id);

        fx.service.delete(article.id).await.unwrap();
        assert!(!fx.snapshot_dir_exists(&article.slug));
        assert!(matches!(
            fx.service.get_published_by_slug(&article.slug).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.get_by_id(article.id).await,
            Err(AppError::NotFound(_))
        ));

        // Soft delete keeps the row
        let rows = fx.store.all_articles().await;
        assert!(rows.iter().any(|a| a.id == article.id && a.deleted_at.is_some()));
    }

    #[tokio::test]
    async fn unpublishing_removes_snapshot() {
        let fx = Fixture::new();
        let article = fx
            .service
            .create(input("Live", Some(ArticleStatus::Published)))
            .await
            .unwrap();
        assert!(fx.snapshot(&article.slug).exists());

        let draft = fx
            .service
            .update(
                article.id,
                ArticleChanges {
                    status: Some(ArticleStatus::Draft),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(draft.status, ArticleStatus::Draft);
        assert!(!fx.snapshot_dir_exists(&article.slug));
        assert!(matches!(
            fx.service.get_published_by_slug(&article.slug).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn editing_published_article_regenerates_snapshot() {
        let fx = Fixture::new();
        let article = fx
            .service
            .create(input("Live", Some(ArticleStatus::Published)))
            .await
            .unwrap();

        let updated = fx
            .service
            .update(
                article.id,
                ArticleChanges {
                    title: Some("Renamed".into()),
                    content: Some("<p>second draft</p>".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.slug, article.slug);
        let html = std::fs::read_to_string(fx.snapshot(&article.slug)).unwrap();
        assert!(html.contains("<p>second draft</p>"));
        assert!(html.contains("Renamed"));
    }

    #[tokio::test]
    async fn update_of_unknown_article_is_not_found() {
        let fx = Fixture::new();
        let err = fx
            .service
            .update(Uuid::new_v4(), ArticleChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = fx.service.get_by_raw_id("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn cleanup_expires_once_and_removes_snapshots() {
        let fx = Fixture::new();
        let mut stale = input("Stale", Some(ArticleStatus::Published));
        stale.expires_at = Some(Utc::now() - Duration::minutes(5));
        let stale = fx.service.create(stale).await.unwrap();

        let mut fresh = input("Fresh", Some(ArticleStatus::Published));
        fresh.expires_at = Some(Utc::now() + Duration::days(1));
        let fresh = fx.service.create(fresh).await.unwrap();

        let mut stale_draft = input("Stale draft", None);
        stale_draft.expires_at = Some(Utc::now() - Duration::minutes(5));
        fx.service.create(stale_draft).await.unwrap();

        assert_eq!(fx.service.cleanup_expired().await.unwrap(), 1);
        assert_eq!(fx.service.cleanup_expired().await.unwrap(), 0);

        assert_eq!(
            fx.service.get_by_id(stale.id).await.unwrap().status,
            ArticleStatus::Expired
        );
        assert!(!fx.snapshot_dir_exists(&stale.slug));
        assert!(fx.snapshot(&fresh.slug).exists());
    }

    #[tokio::test]
    async fn expired_article_can_be_republished() {
        let fx = Fixture::new();
        let mut stale = input("Again", Some(ArticleStatus::Published));
        stale.expires_at = Some(Utc::now() - Duration::minutes(5));
        let stale = fx.service.create(stale).await.unwrap();
        fx.service.cleanup_expired().await.unwrap();

        let revived = fx
            .service
            .update(
                stale.id,
                ArticleChanges {
                    status: Some(ArticleStatus::Published),
                    expires_at: Some(Utc::now() + Duration::days(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(revived.is_published());
        assert!(fx.service.get_published_by_slug(&stale.slug).await.is_ok());
    }

    #[tokio::test]
    async fn list_filters_and_paginates_newest_first() {
        let fx = Fixture::new();
        for i in 0..5 {
            let status = (i % 2 == 0).then_some(ArticleStatus::Published);
            let mut article = input(&format!("Article {i}"), status);
            article.slug = Some(format!("article-{i}"));
            fx.service.create(article).await.unwrap();
        }

        let page = fx
            .service
            .list(Pagination::new(Some(1), Some(2), 10), None)
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.articles[0].slug, "article-4");

        let last = fx
            .service
            .list(Pagination::new(Some(3), Some(2), 10), None)
            .await
            .unwrap();
        assert_eq!(last.articles.len(), 1);
        assert_eq!(last.articles[0].slug, "article-0");

        let published = fx
            .service
            .list(Pagination::new(None, None, 10), Some(ArticleStatus::Published))
            .await
            .unwrap();
        assert_eq!(published.total, 3);
        assert!(published.articles.iter().all(Article::is_published));

        let stats = fx.service.stats().await.unwrap();
        assert_eq!(
            stats,
            ArticleStats {
                total: 5,
                published: 3,
                draft: 2,
                expired: 0
            }
        );
    }
}

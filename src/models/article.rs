//! Article data models and API request/response types.
//!
//! This module defines:
//! - `Article`: database entity for a published (or draft) HTML article
//! - `ArticleStatus`: lifecycle state stored in the `status` column
//! - Request bodies for the JSON API and the inputs the article service takes

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    Decode, Encode, Postgres, Type,
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
};
use uuid::Uuid;

use crate::error::AppError;

/// Lifecycle state of an article.
///
/// ```text
/// draft --publish--> published --sweep--> expired
///   ^                    |
///   +----unpublish-------+
/// ```
///
/// Updates may move an article to any state, including re-publishing an
/// expired one. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
    Expired,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown article status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ArticleStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ArticleStatus::Draft),
            "published" => Ok(ArticleStatus::Published),
            "expired" => Ok(ArticleStatus::Expired),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// The column is plain VARCHAR, so the enum travels over the wire as text.
impl Type<Postgres> for ArticleStatus {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Postgres> for ArticleStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <&str as Encode<'q, Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for ArticleStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<'r, Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}

/// Represents an article record from the database.
///
/// # Database Table
///
/// Maps to the `articles` table. Rows are never physically removed: deleting
/// an article sets `deleted_at`, and every query filters on it.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Article {
    pub id: Uuid,

    pub title: String,

    /// Raw HTML body, rendered unescaped.
    pub content: String,

    /// URL-safe identifier, unique among non-deleted articles.
    pub slug: String,

    pub status: ArticleStatus,

    /// After this instant the public page answers 410 and the next sweep
    /// moves the article to `expired`.
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }

    /// Whether `expires_at` lies before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}

/// Request body for `POST /api/articles`.
///
/// # JSON Example
///
/// ```json
/// {
///   "title": "Release notes",
///   "content": "<p>hello</p>",
///   "slug": "release-notes",
///   "status": "published",
///   "expires_at": "2026-01-01T00:00:00Z"
/// }
/// ```
///
/// `title` and `content` are required; the rest is optional. Missing fields
/// default so that validation can report them through the API envelope.
#[derive(Debug, Default, Deserialize)]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for `PUT /api/articles/{id}`. Empty strings count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticleRequest {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input of `ArticleService::create`.
#[derive(Debug, Clone, Default)]
pub struct CreateArticle {
    pub title: String,
    pub content: String,
    pub slug: Option<String>,
    pub status: Option<ArticleStatus>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<ArticleStatus>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Fully resolved row handed to the store for insertion.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub status: ArticleStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse an optional status field; an empty string means "not given".
pub fn parse_status(value: Option<String>) -> Result<Option<ArticleStatus>, AppError> {
    non_empty(value)
        .map(|s| {
            s.trim()
                .parse::<ArticleStatus>()
                .map_err(|e| AppError::Validation(e.to_string()))
        })
        .transpose()
}

impl TryFrom<CreateArticleRequest> for CreateArticle {
    type Error = AppError;

    fn try_from(request: CreateArticleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_status(request.status)?,
            title: request.title,
            content: request.content,
            slug: non_empty(request.slug),
            expires_at: request.expires_at,
        })
    }
}

impl TryFrom<UpdateArticleRequest> for ArticleChanges {
    type Error = AppError;

    fn try_from(request: UpdateArticleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_status(request.status)?,
            title: non_empty(request.title),
            content: non_empty(request.content),
            expires_at: request.expires_at,
        })
    }
}

/// Query string of `GET /api/articles`.
///
/// Values are kept as strings: an unparsable page or limit falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

/// Offset pagination, 1-based pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub const MAX_LIMIT: i64 = 100;

    /// Highest page whose offset still fits in an `i64` at `MAX_LIMIT`.
    pub const MAX_PAGE: i64 = i64::MAX / Self::MAX_LIMIT;

    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1).min(Self::MAX_PAGE);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(default_limit)
            .min(Self::MAX_LIMIT);
        Self { page, limit }
    }

    /// Build from raw query values, ignoring anything that is not a number.
    pub fn from_query(page: Option<&str>, limit: Option<&str>, default_limit: i64) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i64>().ok());
        Self::new(parse(page), parse(limit), default_limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` rows (at least one).
    pub fn page_count(&self, total: i64) -> i64 {
        ((total + self.limit - 1) / self.limit).max(1)
    }
}

/// `data` payload of `GET /api/articles`.
#[derive(Debug, Serialize)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Counts shown on the admin dashboard. Soft-deleted articles are excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArticleStats {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub expired: i64,
}

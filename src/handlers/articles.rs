//! Article API handlers.
//!
//! Every response uses the `ApiResponse` envelope. Create and update also
//! return the public `url` when the article ends up published.

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        article::{
            Article, ArticlePage, CreateArticleRequest, ListArticlesQuery, Pagination,
            UpdateArticleRequest, parse_status,
        },
        response::ApiResponse,
    },
    state::AppState,
};

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Malformed JSON is reported through the envelope like any other
/// validation failure.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Create a new article.
///
/// # Endpoint
///
/// `POST /api/articles`
///
/// # Responses
///
/// - 201 Created: `{success: true, data: Article, url?}`
/// - 400 Bad Request: missing title/content, bad slug or status
/// - 409 Conflict: slug already taken
pub async fn create_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = body(payload)?;
    let article = state.articles.create(request.try_into()?).await?;

    tracing::info!(
        article_id = %article.id,
        slug = %article.slug,
        caller = auth.name(),
        "Article created via API"
    );

    let url = state.articles.publish_url(&article);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(article).with_url(url)),
    ))
}

/// `GET /api/articles/{id}`
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Article>>, AppError> {
    let article = state.articles.get_by_raw_id(&id).await?;
    Ok(Json(ApiResponse::ok(article)))
}

/// Partially update an article.
///
/// # Endpoint
///
/// `PUT /api/articles/{id}`
///
/// Moving into `published` writes the snapshot; moving out of it removes
/// the snapshot.
pub async fn update_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Article>>, AppError> {
    let request = body(payload)?;
    let article = state.articles.update_raw(&id, request.try_into()?).await?;

    tracing::info!(article_id = %article.id, caller = auth.name(), "Article updated via API");

    let url = state.articles.publish_url(&article);
    Ok(Json(ApiResponse::ok(article).with_url(url)))
}

/// `DELETE /api/articles/{id}`: soft delete plus snapshot removal.
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.articles.delete_raw(&id).await?;
    tracing::info!(article_id = %id, caller = auth.name(), "Article deleted via API");
    Ok(Json(ApiResponse::empty()))
}

/// List articles, newest first.
///
/// # Endpoint
///
/// `GET /api/articles?page=1&limit=10&status=published`
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<ApiResponse<ArticlePage>>, AppError> {
    let pagination = Pagination::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        DEFAULT_PAGE_SIZE,
    );
    let status = parse_status(query.status)?;

    let page = state.articles.list(pagination, status).await?;
    Ok(Json(ApiResponse::ok(page)))
}

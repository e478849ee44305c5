//! Public article page.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::AppError,
    handlers::message_page,
    state::AppState,
    templates::{EXPIRED, NOT_FOUND},
};

/// `GET /p/{slug}`
///
/// Rendered from the database row with the snapshot template; the snapshot
/// file itself is not read.
///
/// - 200: the article page
/// - 404: not-found page (unknown, draft, expired by sweep or deleted)
/// - 410: expired page (published but past `expires_at`)
pub async fn show_article(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let article = match state.articles.get_published_by_slug(&slug).await {
        Ok(article) => article,
        Err(AppError::NotFound(message)) => {
            return message_page(&state.templates, StatusCode::NOT_FOUND, NOT_FOUND, message);
        }
        Err(AppError::Gone) => {
            return message_page(
                &state.templates,
                StatusCode::GONE,
                EXPIRED,
                "This article has expired",
            );
        }
        Err(e) => return e.into_response(),
    };

    match state.articles.publisher().render(&article) {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

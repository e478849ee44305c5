//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, form, URL params, etc.)
//! 2. Calls into the services
//! 3. Returns an HTTP response (JSON envelope or HTML page)

use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tera::Context;

use crate::{
    error::AppError,
    templates::{self, Templates},
};

/// Admin panel pages and form posts
pub mod admin;
/// API key management endpoints
pub mod api_keys;
/// Article JSON API
pub mod articles;
pub mod health;
/// Public article pages
pub mod public;

/// 302 redirect to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Render `name` with `status`, or fall back to the JSON error response if
/// the template itself fails.
pub(crate) fn render_page(
    templates: &Templates,
    status: StatusCode,
    name: &str,
    context: &Context,
) -> Response {
    match templates.render(name, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub(crate) fn message_page(
    templates: &Templates,
    status: StatusCode,
    name: &str,
    message: &str,
) -> Response {
    match templates.render_message(name, message) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// HTML counterpart of `AppError::into_response` for the admin panel.
pub(crate) fn error_page(templates: &Templates, err: AppError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(error = %err, "Admin request failed");
    }
    message_page(templates, status, templates::ERROR, &err.public_message())
}

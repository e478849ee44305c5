//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::response::ApiResponse;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code. Client-facing variants
/// carry the message shown in the `error` field of the response envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Returns HTTP 500. Details are logged, never sent to the client.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Page rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Required field missing or malformed input.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    Validation(String),

    /// A unique value (e.g. an article slug) is already taken.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("{0}")]
    Conflict(String),

    /// Unknown or soft-deleted resource.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("{0}")]
    NotFound(&'static str),

    /// Published article whose expiry time has passed.
    ///
    /// Returns HTTP 410 Gone.
    #[error("This article has expired")]
    Gone,

    /// Missing, invalid, inactive or expired credentials.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("{0}")]
    Unauthorized(&'static str),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Gone => StatusCode::GONE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to a client.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Template(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// All errors return the API envelope:
/// ```json
/// { "success": false, "error": "Invalid or inactive API key" }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ApiResponse::<()>::failure(self.public_message()));
        (status, body).into_response()
    }
}

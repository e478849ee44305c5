//! API key management.
//!
//! Any authenticated caller may manage keys. The plaintext of a new key is
//! returned once, by `POST /api/keys`; only its hash is stored.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        api_key::{ApiKeyResponse, CreateApiKeyRequest},
        response::ApiResponse,
    },
    state::AppState,
};

/// `POST /api/keys`
///
/// ```json
/// { "name": "n8n", "permissions": "articles", "expires_at": null }
/// ```
pub async fn create_api_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateApiKeyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let created = state.auth.generate_api_key(request).await?;

    tracing::info!(api_key_id = %created.id, caller = auth.name(), "API key issued");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

/// `GET /api/keys`: every key, without plaintext.
pub async fn list_api_keys(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ApiKeyResponse>>>, AppError> {
    let keys = state.auth.list_api_keys().await?;
    Ok(Json(ApiResponse::ok(keys)))
}

/// `DELETE /api/keys/{id}`: deactivates the key, the row is kept.
pub async fn delete_api_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.auth.deactivate_api_key(&id).await?;
    Ok(Json(ApiResponse::empty()))
}

//! Authentication middleware.
//!
//! - `api_key_middleware` guards `/api/*`: it resolves the caller from the
//!   `X-API-Key` header (or the `api_key` query parameter) and injects an
//!   `AuthContext` into the request, or rejects with HTTP 401.
//! - `admin_session_middleware` guards the admin panel: it checks the
//!   `admin_session` cookie and redirects to the login page otherwise.

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::{Cookie, time::Duration};
use serde::Deserialize;

use crate::{
    error::AppError,
    handlers::found,
    services::auth_service::{SESSION_COOKIE, SESSION_TOKEN},
    state::AppState,
};

pub use crate::services::auth_service::AuthContext;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Session cookie lifetime.
const SESSION_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Read `X-API-Key`, falling back to `?api_key=`
/// 2. Verify it against stored and static keys
/// 3. If valid: inject `AuthContext` into request, call next handler
/// 4. If not: return 401 with the envelope `{success: false, error}`
pub async fn api_key_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
        .or_else(|| {
            Query::<ApiKeyQuery>::try_from_uri(request.uri())
                .ok()
                .and_then(|Query(q)| q.api_key)
        });

    let auth_context = state.auth.verify_api_key(key.as_deref()).await?;

    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

/// Admin session middleware.
///
/// Browsers are redirected to `/admin/login`; requests sent with
/// `X-Requested-With: XMLHttpRequest` get a JSON 401 instead. A cookie with
/// the wrong value is cleared on the way out.
pub async fn admin_session_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    match session_token(request.headers()) {
        Some(token) if state.auth.is_valid_session(&token) => next.run(request).await,
        Some(_) => {
            let rejection = reject(request.headers(), "Session expired");
            ([(header::SET_COOKIE, removal_cookie())], rejection).into_response()
        }
        None => reject(request.headers(), "Not logged in"),
    }
}

fn reject(headers: &HeaderMap, message: &'static str) -> Response {
    let is_ajax = headers
        .get("X-Requested-With")
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

    if is_ajax {
        AppError::Unauthorized(message).into_response()
    } else {
        found("/admin/login")
    }
}

/// Value of the `admin_session` cookie, if present and non-empty.
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value issued at login.
pub fn session_cookie() -> String {
    Cookie::build((SESSION_COOKIE, SESSION_TOKEN))
        .path("/")
        .http_only(true)
        .max_age(Duration::days(SESSION_DAYS))
        .build()
        .to_string()
}

/// `Set-Cookie` value that deletes the session cookie.
pub fn removal_cookie() -> String {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(Duration::ZERO)
        .build()
        .to_string()
}

//! Authentication for the two client populations.
//!
//! - Programmatic clients send an API key, checked against the `api_keys`
//!   table and the static keys from configuration.
//! - The admin panel uses a fixed username/password and a single constant
//!   session token stored in a cookie. There is no session table; every admin
//!   login receives the same token.

use std::sync::Arc;

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::api_key::{ApiKeyResponse, CreateApiKeyRequest, NewApiKey},
    store::ApiKeyStore,
};

/// Name of the admin session cookie.
pub const SESSION_COOKIE: &str = "admin_session";

/// The one token issued to every admin login. Placeholder scheme: no
/// per-login token and no server-side state.
pub const SESSION_TOKEN: &str = "valid_admin_session_2025";

const GENERATED_KEY_LEN: usize = 32;

/// Who made an API request.
///
/// Inserted into the request extensions by the API key middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Key stored in the database.
    Stored { api_key_id: Uuid, name: String },
    /// Key listed in the `API_KEYS` configuration.
    Static,
}

impl AuthContext {
    pub fn name(&self) -> &str {
        match self {
            AuthContext::Stored { name, .. } => name,
            AuthContext::Static => "static",
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn ApiKeyStore>,
    static_keys: Arc<[String]>,
    admin_username: String,
    admin_password: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn ApiKeyStore>,
        static_keys: Vec<String>,
        admin_username: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            store,
            static_keys: static_keys.into(),
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
        }
    }

    /// Check an API key taken from the request.
    ///
    /// # Flow
    ///
    /// 1. No key: `API key required`
    /// 2. Hash the key and look for an active stored key
    /// 3. Stored key found: reject if expired, otherwise record `last_used_at`
    /// 4. Not stored: accept if it is one of the static keys
    /// 5. Otherwise: `Invalid or inactive API key`
    pub async fn verify_api_key(&self, key: Option<&str>) -> Result<AuthContext, AppError> {
        let key = key
            .filter(|k| !k.is_empty())
            .ok_or(AppError::Unauthorized("API key required"))?;

        if let Some(stored) = self.store.find_active_key(&hash_key(key)).await? {
            let now = Utc::now();
            if stored.is_expired_at(now) {
                return Err(AppError::Unauthorized("API key has expired"));
            }

            if let Err(e) = self.store.touch_key(stored.id, now).await {
                tracing::warn!(api_key_id = %stored.id, error = %e, "Failed to record API key usage");
            }

            return Ok(AuthContext::Stored {
                api_key_id: stored.id,
                name: stored.name,
            });
        }

        if self.static_keys.iter().any(|k| k == key) {
            return Ok(AuthContext::Static);
        }

        Err(AppError::Unauthorized("Invalid or inactive API key"))
    }

    /// Create a new random API key. The plaintext key is only part of this
    /// response.
    pub async fn generate_api_key(
        &self,
        request: CreateApiKeyRequest,
    ) -> Result<ApiKeyResponse, AppError> {
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }

        let key = generate_key();
        let created = self
            .store
            .insert_key(NewApiKey {
                name: request.name,
                key_hash: hash_key(&key),
                permissions: request.permissions,
                expires_at: request.expires_at,
            })
            .await?;

        tracing::info!(api_key_id = %created.id, name = %created.name, "API key created");
        Ok(ApiKeyResponse::from(created).with_key(key))
    }

    pub async fn list_api_keys(&self) -> Result<Vec<ApiKeyResponse>, AppError> {
        let keys = self.store.list_keys().await?;
        Ok(keys.into_iter().map(Into::into).collect())
    }

    /// Revoke a key by clearing its active flag.
    pub async fn deactivate_api_key(&self, raw_id: &str) -> Result<(), AppError> {
        let id = Uuid::parse_str(raw_id).map_err(|_| AppError::NotFound("API key not found"))?;
        if !self.store.deactivate_key(id).await? {
            return Err(AppError::NotFound("API key not found"));
        }
        tracing::info!(api_key_id = %id, "API key deactivated");
        Ok(())
    }

    pub fn validate_admin_credentials(&self, username: &str, password: &str) -> bool {
        username == self.admin_username && password == self.admin_password
    }

    pub fn is_valid_session(&self, token: &str) -> bool {
        token == SESSION_TOKEN
    }
}

/// SHA-256 hex digest under which a key is stored.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_key() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_KEY_LEN)
        .map(char::from)
        .collect()
}

//! API Key model for authentication.
//!
//! API keys authenticate programmatic clients of the `/api` routes. Only the
//! SHA-256 hash of a key is stored; the plaintext is returned once, when the
//! key is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `name`: Display name of the client using the key
/// - `key_hash`: SHA-256 hash of the actual API key
/// - `is_active`: Whether the key is currently valid
/// - `last_used_at`: Updated on every successful authentication
/// - `expires_at`: Optional hard expiry
/// - `permissions`: Free-form permissions string (not interpreted)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,

    pub name: String,

    /// SHA-256 hash of the actual API key (64 hex characters)
    pub key_hash: String,

    /// Inactive keys are rejected during authentication. This is the only way
    /// to revoke a key.
    pub is_active: bool,

    pub last_used_at: Option<DateTime<Utc>>,

    pub expires_at: Option<DateTime<Utc>>,

    pub permissions: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ApiKey {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}

/// Row handed to the store when a key is generated.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub name: String,
    pub key_hash: String,
    pub permissions: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request to create a new API key.
///
/// ```json
/// { "name": "n8n workflow", "permissions": "articles:write", "expires_at": null }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub permissions: String,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// API key as returned to clients.
///
/// The `key` field is ONLY included when creating a new key.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub permissions: String,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key: None, // Never include the key by default
            is_active: key.is_active,
            last_used_at: key.last_used_at,
            expires_at: key.expires_at,
            permissions: key.permissions,
            created_at: key.created_at,
        }
    }
}

impl ApiKeyResponse {
    /// Create response with the plaintext key included (only on creation).
    pub fn with_key(mut self, key: String) -> Self {
        self.key = Some(key);
        self
    }
}

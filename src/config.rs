//! Application configuration management.
//!
//! Configuration is layered: an optional `.env` file is loaded first, then the
//! process environment is deserialized into a type-safe struct with `envy`.
//! Variables already present in the environment win over the file.

use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `SERVER_MODE` (optional): `debug` or `release`, defaults to `debug`
/// - `DOMAIN` (optional): public base URL used in publish links
/// - `API_KEYS` (optional): comma separated list of static API keys
/// - `STATIC_PATH` (optional): directory receiving article snapshots
/// - `ADMIN_USERNAME` / `ADMIN_PASSWORD` (optional): admin panel login
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_mode")]
    pub server_mode: String,

    #[serde(default = "default_domain")]
    pub domain: String,

    /// Keys accepted by the API in addition to the ones stored in the database.
    #[serde(default)]
    pub api_keys: Vec<String>,

    #[serde(default = "default_static_path")]
    pub static_path: PathBuf,

    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_connect_attempts")]
    pub db_connect_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub db_retry_delay_secs: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_mode() -> String {
    "debug".to_string()
}

fn default_domain() -> String {
    "http://localhost:3000".to_string()
}

fn default_static_path() -> PathBuf {
    PathBuf::from("./static")
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Expired articles are swept once an hour.
fn default_cleanup_interval() -> u64 {
    3600
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_attempts() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    5
}

impl Config {
    /// Load configuration from the `.env` file (if any) and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Whether the server runs in release mode (JSON logs).
    pub fn is_release(&self) -> bool {
        self.server_mode.eq_ignore_ascii_case("release")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn db_retry_delay(&self) -> Duration {
        Duration::from_secs(self.db_retry_delay_secs)
    }
}

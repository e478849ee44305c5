//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating a PostgreSQL connection pool, retrying a bounded number of times
//! - Running database migrations automatically

use std::time::Duration;

use sqlx::{Pool, Postgres};

use crate::config::Config;

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// The database is often still starting when the server comes up (for example
/// under docker compose), so the first connection is attempted
/// `db_connect_attempts` times with `db_retry_delay_secs` between attempts.
/// This is the only retry loop in the application.
///
/// # Errors
///
/// Returns the last connection error once every attempt has failed.
pub async fn create_pool(config: &Config) -> Result<DbPool, sqlx::Error> {
    connect_with_retry(
        &config.database_url,
        config.db_max_connections,
        config.db_connect_attempts.max(1),
        config.db_retry_delay(),
    )
    .await
}

async fn connect_with_retry(
    database_url: &str,
    max_connections: u32,
    attempts: u32,
    delay: Duration,
) -> Result<DbPool, sqlx::Error> {
    let mut attempt = 1;
    loop {
        let result = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .max_lifetime(Duration::from_secs(3600))
            .connect(database_url)
            .await;

        match result {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    attempt,
                    attempts,
                    error = %e,
                    "Database connection failed, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempts, error = %e, "Giving up connecting to database");
                return Err(e);
            }
        }
    }
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are tracked in the `_sqlx_migrations` table, so each one runs
/// only once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}

//! Static hosting server - Main Application Entry Point
//!
//! A small publishing backend: articles are created through a JSON API (for
//! automation tools) or an admin panel, and every published article is also
//! written to disk as a static HTML page. Articles with an expiry time are
//! taken down by an hourly sweep.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Pages**: Tera templates compiled into the binary
//! - **Authentication**: API key (SHA-256 hashed) for `/api`, cookie session
//!   for `/admin`
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Initialize logging (JSON in release mode)
//! 3. Create database connection pool (with retries) and run migrations
//! 4. Build services, router and the expiry sweep
//! 5. Serve until Ctrl-C

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod scheduler;
mod services;
mod state;
mod store;
mod templates;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{config::Config, state::AppState, store::PgStore, templates::Templates};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration comes first: SERVER_MODE decides the log format
    let config = Config::from_env()?;
    init_tracing(&config);
    tracing::info!(mode = %config.server_mode, "Configuration loaded");

    let pool = db::create_pool(&config).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    tokio::fs::create_dir_all(&config.static_path).await?;

    let store = Arc::new(PgStore::new(pool));
    let templates = Templates::new()?;
    let state = AppState::new(&config, store.clone(), store, templates);

    let sweep = scheduler::spawn_expiry_sweep(state.articles.clone(), config.cleanup_interval());

    let app = routes::build_router(state, &config.static_path, config.request_timeout());

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(domain = %config.domain, "Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep.abort();
    tracing::info!("Server stopped");

    Ok(())
}

/// Reads RUST_LOG (defaults to "info"). Release mode logs JSON lines.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.is_release() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

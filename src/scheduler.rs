//! Background expiry sweep.
//!
//! One tokio task runs `ArticleService::cleanup_expired` at startup and
//! then once per period. A failed run is logged and the next tick tries
//! again.

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::services::article_service::ArticleService;

/// Shortest period accepted; `tokio::time::interval` panics on zero.
const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Spawn the sweep loop. Abort the returned handle to stop it.
pub fn spawn_expiry_sweep(articles: ArticleService, period: Duration) -> JoinHandle<()> {
    let period = period.max(MIN_PERIOD);

    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        // A slow sweep pushes the next one back instead of bunching runs
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(period_secs = period.as_secs(), "Expiry sweep scheduled");

        loop {
            // The first tick completes immediately
            ticker.tick().await;
            run_expiry_sweep(&articles).await;
        }
    })
}

async fn run_expiry_sweep(articles: &ArticleService) {
    tracing::debug!("Starting cleanup of expired articles");

    match articles.cleanup_expired().await {
        Ok(0) => tracing::debug!("No expired articles"),
        Ok(count) => tracing::info!(count, "Expired articles cleaned up"),
        Err(e) => tracing::error!(error = %e, "Expired article cleanup failed"),
    }
}

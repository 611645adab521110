//! Handlers that exist to exercise fault containment and draining.

use std::time::Duration;

use axum::extract::State;

/// Always faults. Only safe behind `Recovery`.
pub async fn do_panic() -> &'static str {
    panic!("intentional panic for testing")
}

/// Sleeps for the configured delay, then answers `ok`.
pub async fn delayed_ok(State(delay): State<Duration>) -> &'static str {
    tracing::info!(delay_ms = delay.as_millis() as u64, "Delayed request started");
    tokio::time::sleep(delay).await;
    tracing::info!("Delayed request finished");
    "ok"
}

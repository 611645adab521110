//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT (Ctrl+C) and SIGTERM
//! - First signal begins the drain, a second one forces shutdown

use crate::lifecycle::shutdown::ShutdownCoordinator;

/// Resolves on the next SIGINT or SIGTERM.
pub async fn termination() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Drive the coordinator from process signals until it is stopped.
pub async fn watch(coordinator: ShutdownCoordinator) {
    tokio::select! {
        _ = termination() => {}
        _ = coordinator.stopped() => return,
    }
    coordinator.begin_drain();

    tokio::select! {
        _ = termination() => {
            tracing::warn!("Second shutdown signal received, forcing exit");
            coordinator.stop();
        }
        _ = coordinator.stopped() => {}
    }
}

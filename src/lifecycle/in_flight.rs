//! In-flight request accounting for graceful shutdown.
//!
//! # Responsibilities
//! - Count requests between acceptance and response
//! - Let the shutdown path wait for the count to reach zero
//!
//! # Design Decisions
//! - Exit is a guard drop, so it runs on success, error and panic unwinding alike
//! - Waiters are woken through `Notify` rather than polling

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::observability::metrics;

#[derive(Debug, Default)]
struct Inner {
    count: AtomicUsize,
    idle: Notify,
}

/// Shared counter of requests currently being served.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    inner: Arc<Inner>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request entering the server. Dropping the guard records its exit.
    pub fn enter(&self) -> InFlightGuard {
        let count = self.inner.count.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_in_flight(count);
        InFlightGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of requests currently in flight.
    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Wait until no request is in flight, for at most `timeout`.
    ///
    /// Returns `true` if the counter reached zero in time.
    pub async fn wait(&self, timeout: Duration) -> bool {
        self.wait_until(Instant::now() + timeout).await
    }

    /// Same as [`InFlight::wait`] with an absolute deadline.
    pub async fn wait_until(&self, deadline: Instant) -> bool {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent last exit cannot be missed.
            notified.as_mut().enable();

            if self.count() == 0 {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.count() == 0;
            }
        }
    }
}

/// Marks one request as in flight until dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    inner: Arc<Inner>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let remaining = self.inner.count.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_in_flight(remaining);
        if remaining == 0 {
            self.inner.idle.notify_waiters();
        }
    }
}

/// Outermost router middleware: holds a guard for the whole request.
pub async fn track_in_flight(
    State(in_flight): State<InFlight>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let _guard = in_flight.enter();
    next.run(request).await
}

//! Shutdown coordination for the service.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::lifecycle::in_flight::InFlight;

/// Lifecycle phase of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepting connections.
    Running,
    /// Listener closed, in-flight requests finishing.
    Draining,
    /// Drain finished or was cut short.
    Stopped,
}

/// How the drain phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request completed before the deadline.
    Drained,
    /// The deadline passed (or a second signal arrived) with requests still running.
    Forced { remaining: usize },
}

impl DrainOutcome {
    pub fn is_forced(&self) -> bool {
        matches!(self, DrainOutcome::Forced { .. })
    }
}

/// Coordinator for graceful shutdown.
///
/// Owns the in-flight counter and the `Running → Draining → Stopped` phase.
/// Clones share state.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    phase: Arc<watch::Sender<Phase>>,
    in_flight: InFlight,
    drain_timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(drain_timeout: Duration) -> Self {
        let (phase, _) = watch::channel(Phase::Running);
        Self {
            phase: Arc::new(phase),
            in_flight: InFlight::new(),
            drain_timeout,
        }
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Running → Draining. Returns `false` if shutdown had already begun.
    pub fn begin_drain(&self) -> bool {
        let started = self.phase.send_if_modified(|phase| {
            if *phase == Phase::Running {
                *phase = Phase::Draining;
                true
            } else {
                false
            }
        });
        if started {
            tracing::info!(
                in_flight = self.in_flight.count(),
                timeout_secs = self.drain_timeout.as_secs(),
                "Shutdown signal received, draining"
            );
        }
        started
    }

    /// Move to Stopped. While draining, this abandons the drain.
    pub fn stop(&self) {
        self.phase.send_if_modified(|phase| {
            if *phase == Phase::Stopped {
                false
            } else {
                *phase = Phase::Stopped;
                true
            }
        });
    }

    /// Resolves once the phase has left Running.
    pub async fn draining(&self) {
        self.wait_for(|phase| phase != Phase::Running).await;
    }

    /// Resolves once the phase is Stopped.
    pub async fn stopped(&self) {
        self.wait_for(|phase| phase == Phase::Stopped).await;
    }

    async fn wait_for(&self, done: impl Fn(Phase) -> bool) {
        let mut rx = self.phase.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|phase| done(*phase)).await;
    }

    /// Deadline for a drain starting now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.drain_timeout
    }

    /// Wait for in-flight requests to finish, bounded by `deadline` and by an
    /// early [`ShutdownCoordinator::stop`]. The caller moves the phase to Stopped
    /// once the server is down.
    pub async fn drain_until(&self, deadline: Instant) -> DrainOutcome {
        let drained = tokio::select! {
            drained = self.in_flight.wait_until(deadline) => drained,
            _ = self.stopped() => self.in_flight.count() == 0,
        };

        if drained {
            DrainOutcome::Drained
        } else {
            DrainOutcome::Forced {
                remaining: self.in_flight.count(),
            }
        }
    }

    /// [`ShutdownCoordinator::drain_until`] with the configured timeout.
    pub async fn drain(&self) -> DrainOutcome {
        self.drain_until(self.deadline()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begins_in_running() {
        let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
        assert_eq!(coordinator.phase(), Phase::Running);
    }

    #[test]
    fn begin_drain_only_once() {
        let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
        assert!(coordinator.begin_drain());
        assert!(!coordinator.begin_drain());
        assert_eq!(coordinator.phase(), Phase::Draining);
    }

    #[tokio::test]
    async fn draining_resolves_after_trigger() {
        let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
        let waiter = coordinator.clone();
        let handle = tokio::spawn(async move { waiter.draining().await });

        coordinator.begin_drain();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn drain_completes_when_requests_finish() {
        let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
        let guard = coordinator.in_flight().enter();
        coordinator.begin_drain();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        assert_eq!(coordinator.drain().await, DrainOutcome::Drained);
        assert_eq!(coordinator.phase(), Phase::Draining);

        coordinator.stop();
        assert_eq!(coordinator.phase(), Phase::Stopped);
    }

    #[tokio::test]
    async fn drain_is_forced_after_timeout() {
        let coordinator = ShutdownCoordinator::new(Duration::from_millis(50));
        let _guard = coordinator.in_flight().enter();
        coordinator.begin_drain();

        let outcome = coordinator.drain().await;
        assert_eq!(outcome, DrainOutcome::Forced { remaining: 1 });
    }

    #[tokio::test]
    async fn stop_cuts_the_drain_short() {
        let coordinator = ShutdownCoordinator::new(Duration::from_secs(60));
        let _guard = coordinator.in_flight().enter();
        coordinator.begin_drain();

        let forcer = coordinator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            forcer.stop();
        });

        let outcome = tokio::time::timeout(Duration::from_secs(5), coordinator.drain())
            .await
            .unwrap();
        assert!(outcome.is_forced());
    }
}

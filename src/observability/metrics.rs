//! Metrics collection and exposition.
//!
//! # Metrics
//! - `todo_requests_total` (counter): requests by method, path, status
//! - `todo_request_duration_seconds` (histogram): latency distribution
//! - `todo_requests_in_flight` (gauge): requests currently being served
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - The Prometheus exporter is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one completed request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("todo_requests_total", &labels).increment(1);
    histogram!("todo_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn set_in_flight(count: usize) {
    gauge!("todo_requests_in_flight").set(count as f64);
}

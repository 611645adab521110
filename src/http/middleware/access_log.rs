//! Per-request access log.

use std::time::Instant;

use axum::{body::Body, http::Request};
use chrono::{DateTime, Utc};

use super::os_extractor::ClientOs;
use super::{BoxResponseFuture, Interceptor, Next};
use crate::observability::metrics;

/// One access log record.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub timestamp: DateTime<Utc>,
    pub latency_ms: u128,
    pub path: String,
    pub os: String,
    pub method: String,
    pub status: u16,
}

impl AccessLogEntry {
    fn emit(&self) {
        tracing::info!(
            target: "todo_service::access",
            timestamp = %self.timestamp.to_rfc3339(),
            latency_ms = self.latency_ms as u64,
            path = %self.path,
            os = %self.os,
            method = %self.method,
            status = self.status,
            "request completed"
        );
    }
}

/// Times the inner chain and logs `{timestamp, latency, path, os}` once it returns.
///
/// Reads the OS label placed by `OsExtractor`, so it must sit inside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl Interceptor for AccessLog {
    fn name(&self) -> &'static str {
        "access_log"
    }

    fn intercept<'a>(&'a self, request: Request<Body>, next: Next<'a>) -> BoxResponseFuture<'a> {
        let timestamp = Utc::now();
        let start = Instant::now();
        let path = request.uri().path().to_string();
        let method = request.method().to_string();
        let os = request
            .extensions()
            .get::<ClientOs>()
            .cloned()
            .unwrap_or_else(ClientOs::unknown);

        Box::pin(async move {
            let response = next.run(request).await;

            let status = response.status().as_u16();
            metrics::record_request(&method, &path, status, start);
            AccessLogEntry {
                timestamp,
                latency_ms: start.elapsed().as_millis(),
                path,
                os: os.0,
                method,
                status,
            }
            .emit();

            response
        })
    }
}

//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Compose the interceptor pipelines for protected and fault-prone routes
//! - Wire up tower layers (in-flight tracking, tracing, timeout, body limit)
//! - Serve until shutdown, then drain within the configured timeout

use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::time::timeout_at;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::handlers::{fault, healthz::healthz, todo};
use crate::http::middleware::{AccessLog, BasicAuth, OsExtractor, Pipeline, Recovery};
use crate::lifecycle::in_flight::track_in_flight;
use crate::lifecycle::{DrainOutcome, ShutdownCoordinator};
use crate::service::TodoService;

/// HTTP server for the TODO service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    coordinator: ShutdownCoordinator,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and store.
    pub fn new(config: ServiceConfig, todos: TodoService) -> Self {
        let coordinator =
            ShutdownCoordinator::new(Duration::from_secs(config.shutdown.drain_timeout_secs));
        let router = Self::build_router(&config, todos, &coordinator);
        Self {
            router,
            config,
            coordinator,
        }
    }

    /// The `/todos` chain: Recovery → OsExtractor → BasicAuth → AccessLog → handlers.
    pub fn todo_pipeline(config: &ServiceConfig, todos: TodoService) -> Pipeline {
        Pipeline::builder()
            .with(Recovery::new())
            .with(OsExtractor)
            .with(BasicAuth::from_config(&config.auth))
            .with(AccessLog)
            .endpoint(todo::routes(todos))
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &ServiceConfig,
        todos: TodoService,
        coordinator: &ShutdownCoordinator,
    ) -> Router {
        let todo_pipeline = Self::todo_pipeline(config, todos);
        tracing::debug!(chain = ?todo_pipeline.names(), "Composed /todos pipeline");

        let panic_pipeline = Pipeline::builder()
            .with(Recovery::new())
            .endpoint(get(fault::do_panic));

        let slow_request_delay = Duration::from_secs(config.shutdown.slow_request_secs);

        Router::new()
            .route("/healthz", get(healthz))
            .route_service("/todos", todo_pipeline)
            .route_service("/do-panic", panic_pipeline)
            .route(
                "/graceful-shutdown",
                get(fault::delayed_ok).with_state(slow_request_delay),
            )
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn_with_state(
                coordinator.in_flight().clone(),
                track_in_flight,
            ))
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle used to trigger and observe shutdown.
    pub fn coordinator(&self) -> ShutdownCoordinator {
        self.coordinator.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Serve on `listener` until the coordinator leaves Running, then drain.
    ///
    /// The listener closes as soon as draining begins. Returns once every
    /// in-flight request has been answered or the drain timeout has passed.
    pub async fn run(self, listener: TcpListener) -> Result<DrainOutcome, std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let coordinator = self.coordinator;
        let signal = coordinator.clone();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, self.router)
                .with_graceful_shutdown(async move { signal.draining().await })
                .await
        });

        tokio::select! {
            result = &mut server => {
                // Server ended on its own; only an error gets here before shutdown.
                coordinator.stop();
                return match result {
                    Ok(Ok(())) => Ok(DrainOutcome::Drained),
                    Ok(Err(e)) => Err(e),
                    Err(e) => Err(std::io::Error::other(e)),
                };
            }
            _ = coordinator.draining() => {}
        }

        let deadline = coordinator.deadline();
        let mut outcome = coordinator.drain_until(deadline).await;

        if !outcome.is_forced() {
            // Requests are answered; wait for connections to finish writing.
            match timeout_at(deadline, &mut server).await {
                Ok(Ok(Err(e))) => tracing::error!(error = %e, "HTTP server error during drain"),
                Ok(_) => {}
                Err(_) => {
                    outcome = DrainOutcome::Forced {
                        remaining: coordinator.in_flight().count(),
                    };
                }
            }
        }

        if outcome.is_forced() {
            server.abort();
            tracing::error!(?outcome, "Drain timed out, forcing shutdown");
        } else {
            tracing::info!("HTTP server stopped, all requests drained");
        }

        coordinator.stop();
        Ok(outcome)
    }
}

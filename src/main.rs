//! TODO service (v1)
//!
//! A small CRUD service built with Tokio, Axum and SQLite.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ in-flight tracking ──▶ trace / timeout / body limit
//!                                          │
//!              ┌───────────────────────────┼──────────────────────────┐
//!              ▼                           ▼                          ▼
//!          /healthz        /todos pipeline:                    /do-panic, /graceful-shutdown
//!                          Recovery → OsExtractor →
//!                          BasicAuth → AccessLog → handlers
//!                                          │
//!                                          ▼
//!                                   TodoService ──▶ SQLite pool
//! ```
//!
//! Shutdown: SIGINT/SIGTERM closes the listener, in-flight requests drain
//! for up to `shutdown.drain_timeout_secs`, then the process exits.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use todo_service::config::load_config;
use todo_service::lifecycle::signals;
use todo_service::observability::{logging, metrics};
use todo_service::{db, HttpServer, TodoService};

#[derive(Parser)]
#[command(name = "todo-service")]
#[command(about = "CRUD service for TODO items", long_about = None)]
struct Args {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init(config.observability.log_format)?;
    tracing::info!("todo-service v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = %config.database.path.display(),
        drain_timeout_secs = config.shutdown.drain_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let pool = db::connect(&config.database).await?;
    db::migrate(&pool).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let server = HttpServer::new(config, TodoService::new(pool.clone()));
    tokio::spawn(signals::watch(server.coordinator()));

    let outcome = server.run(listener).await?;
    pool.close().await;

    if outcome.is_forced() {
        tracing::error!(?outcome, "Shutdown forced before all requests finished");
    } else {
        tracing::info!("Shutdown complete");
    }
    Ok(())
}

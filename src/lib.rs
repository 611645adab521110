//! TODO service library.
//!
//! CRUD over a single `todos` table, served through an ordered interceptor
//! pipeline with coordinated graceful shutdown.

pub mod config;
pub mod db;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod service;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::ShutdownCoordinator;
pub use service::TodoService;

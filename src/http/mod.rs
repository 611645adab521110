//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, in-flight tracking, tower layers)
//!     → middleware/ (interceptor pipeline per route)
//!     → request.rs (JSON body extraction)
//!     → handlers/ (call the persistence service)
//!     → response.rs (map errors to status codes)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::HttpServer;

//! Request handlers.
//!
//! # Routes
//! - `/healthz`           → healthz.rs
//! - `/todos`             → todo.rs (behind the full interceptor pipeline)
//! - `/do-panic`          → fault.rs (behind Recovery only)
//! - `/graceful-shutdown` → fault.rs (delayed answer for drain testing)

pub mod fault;
pub mod healthz;
pub mod todo;

//! Persistence services.
//!
//! # Design Decisions
//! - Services own transaction boundaries; handlers never see a connection
//! - No application-level locks are held across store calls
//! - Errors are classified once into `TodoError`

pub mod todo;

pub use todo::TodoService;

//! Domain model.
//!
//! # Data Flow
//! ```text
//! HTTP JSON body
//!     → request DTOs (todo.rs)
//!     → service layer
//!     → Todo rows (sqlx::FromRow)
//!     → response DTOs (todo.rs)
//! ```
//!
//! # Design Decisions
//! - `id` and `created_at` are store-assigned and never written by callers
//! - Persistence failures are classified once, in `error.rs`

pub mod error;
pub mod todo;

pub use error::TodoError;
pub use todo::Todo;

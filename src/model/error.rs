//! Persistence error taxonomy.

use thiserror::Error;

/// Errors returned by the TODO persistence service.
///
/// `NotFound` is the only domain error; everything else is an opaque
/// infrastructure failure and maps to a generic 500 at the HTTP edge.
#[derive(Debug, Error)]
pub enum TodoError {
    /// The targeted row does not exist.
    #[error("the requested resource was not found")]
    NotFound,

    /// Store or driver failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TodoError {
    /// Whether this error is the `NotFound` domain error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TodoError::NotFound)
    }
}

//! Error types for catalogue-core

use std::time::Duration;

use thiserror::Error;

use crate::validator::ValidationErrors;

/// Result type alias for catalogue operations
pub type Result<T> = std::result::Result<T, CatalogueError>;

/// The outcome of a failed repository call.
///
/// Every repository operation returns exactly one of these to its caller.
/// Nothing is logged, retried or swallowed on the way out.
#[derive(Error, Debug)]
pub enum CatalogueError {
    /// Caller-supplied data violates one or more declared constraints
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The identity does not resolve to an existing record
    #[error("Record not found")]
    NotFound,

    /// The version-guarded write matched no row
    #[error("Edit conflict: the record was changed or removed by another writer")]
    EditConflict,

    /// The storage call exceeded its deadline; the outcome of a write is unknown
    #[error("Storage call exceeded its deadline of {0:?}")]
    Timeout(Duration),

    /// Any other storage failure (constraint violation, connectivity, corruption)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<ValidationErrors> for CatalogueError {
    fn from(errors: ValidationErrors) -> Self {
        CatalogueError::Validation(errors)
    }
}

impl From<rusqlite::Error> for CatalogueError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogueError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogueError {
    fn from(err: serde_json::Error) -> Self {
        CatalogueError::Storage(format!("serialization: {}", err))
    }
}

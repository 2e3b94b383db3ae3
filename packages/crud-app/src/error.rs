//! Application error types.

use thiserror::Error;

use object_db_core::StoreError;

/// Errors surfaced by the model and controller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Update submitted without a valid record key
    #[error("Cannot update a record without a valid key")]
    MissingKey,

    /// Record not found by key
    #[error("Record {key} not found")]
    NotFound { key: u64 },

    /// Malformed user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage engine error
    #[error(transparent)]
    Store(#[from] StoreError),
}

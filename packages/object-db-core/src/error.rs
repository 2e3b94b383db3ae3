//! Engine error types.

use thiserror::Error;

/// Object-store operation errors.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Object store not found
    #[error("Object store '{store}' not found")]
    StoreNotFound { store: String },

    /// Object store already exists
    #[error("Object store '{0}' already exists")]
    StoreAlreadyExists(String),

    /// Key not found in store
    #[error("Key {key} not found in store '{store}'")]
    KeyNotFound { store: String, key: u64 },

    /// Write attempted under a read-only transaction
    #[error("Write on store '{store}' rejected: transaction is read-only")]
    ReadOnlyTransaction { store: String },

    /// Store creation or deletion outside an upgrade
    #[error("Store '{store}' can only be created or deleted during a version upgrade")]
    UpgradeRequired { store: String },

    /// On-disk database version is newer than the requested one
    #[error("Version conflict: requested {requested}, database is at {stored}")]
    VersionConflict { requested: u32, stored: u32 },

    /// Serialized value exceeds the configured limit
    #[error("Value of {size} bytes exceeds limit of {limit} bytes")]
    ValueTooLarge { size: usize, limit: usize },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Data corruption detected
    #[error("Data corruption detected: {0}")]
    DataCorruption(String),

    /// Disk full error during persistence
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error during persistence
    #[error("I/O error: {0}")]
    IoError(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIoError(String),
}

//! Request/callback layer over the object-store engine.
//!
//! Callers issue a [`StoreRequest`] and get completion later through a
//! one-shot response channel, never a return value in line. A dedicated
//! storage thread owns the [`Database`](object_db_core::Database) and
//! serves requests strictly sequentially, so no two storage operations
//! ever overlap. Ordering across independent requests is not guaranteed
//! and must not be relied upon.

use serde_json::Value;
use tokio::sync::oneshot;

use object_db_core::StoreError;

mod handle;
mod worker;

pub use handle::StoreHandle;
pub use worker::{spawn_store, StoreWorker, UpgradeFn};

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// One storage request, carrying its one-shot response channel.
///
/// Each variant is served inside a freshly opened transaction of the
/// appropriate mode. Responses to callers whose receiver was dropped
/// are discarded without error.
#[derive(Debug)]
pub enum StoreRequest {
    /// Insert a record under the next generated key
    Add {
        value: Value,
        response: oneshot::Sender<Result<u64>>,
    },
    /// Fetch a record by key; a missing key is `Ok(None)`
    Get {
        key: u64,
        response: oneshot::Sender<Result<Option<Value>>>,
    },
    /// List all records in key order, each paired with its key
    List {
        response: oneshot::Sender<Result<Vec<(u64, Value)>>>,
    },
    /// Overwrite the record at `key` through a cursor
    Update {
        key: u64,
        value: Value,
        response: oneshot::Sender<Result<()>>,
    },
    /// Remove the record at `key`; an absent key succeeds
    Delete {
        key: u64,
        response: oneshot::Sender<Result<()>>,
    },
    /// Remove every record in the store
    Clear {
        response: oneshot::Sender<Result<()>>,
    },
    /// Count the records in the store
    Count {
        response: oneshot::Sender<Result<usize>>,
    },
    /// Delete the database, reopen it, and re-run the upgrade hook
    Reset {
        response: oneshot::Sender<Result<()>>,
    },
}

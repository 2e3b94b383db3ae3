//! Local object-store engine.
//!
//! Provides named databases with an integer schema version and an upgrade
//! hook, named object stores with auto-incrementing keys, read/readwrite
//! transactions, cursor traversal, and checksummed file persistence.

pub mod config;
pub mod cursor;
pub mod database;
pub mod error;
pub mod persistence;
pub mod store;
pub mod transaction;

pub use config::DbConfig;
pub use cursor::{Cursor, KeyRange};
pub use database::{Database, UpgradeHandle};
pub use error::StoreError;
pub use store::ObjectStore;
pub use transaction::{Transaction, TransactionMode};

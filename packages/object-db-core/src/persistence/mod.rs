//! Checksummed file persistence for databases and their stores.

pub mod io_utils;
pub mod manager;
pub mod manifest;

pub use manager::PersistenceManager;
pub use manifest::{Manifest, StoreMeta, MANIFEST_FORMAT_VERSION};

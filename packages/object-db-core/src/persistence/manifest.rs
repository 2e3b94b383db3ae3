//! On-disk manifest describing a database.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Supported manifest format version.
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// Root of `manifest.json`: database identity plus per-store metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest file format version
    pub format_version: u32,
    /// Database name
    pub name: String,
    /// Database schema version
    pub version: u32,
    /// Per-store metadata, keyed by store name
    pub stores: BTreeMap<String, StoreMeta>,
}

/// Per-store metadata in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMeta {
    /// Next key the generator will hand out
    pub next_key: u64,
    /// CRC32 of the store's data file
    pub checksum: u32,
}

/// One record in a store's data file.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreEntry {
    /// Record key
    pub key: u64,
    /// Record payload
    pub value: serde_json::Value,
}

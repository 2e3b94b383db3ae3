//! Persistence manager for the manifest and store data files.
//!
//! Layout: `manifest.json` at the data directory root, one
//! `stores/<name>.json` data file per object store. Every write goes to
//! a temp file first and is renamed into place; data files carry a CRC32
//! checksum in the manifest that is verified on load.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use serde_json::Value;

use crate::config::DbConfig;
use crate::error::StoreError;
use crate::store::ObjectStore;

use super::io_utils::{classify_io_error, retry_io_operation};
use super::manifest::{Manifest, StoreEntry, StoreMeta, MANIFEST_FORMAT_VERSION};

/// Persistence manager for one database directory.
#[derive(Debug)]
pub struct PersistenceManager {
    /// Data directory path
    data_dir: PathBuf,
    /// Maximum retry attempts for transient I/O errors
    max_retries: u32,
    /// Delay between retry attempts in milliseconds
    retry_delay_ms: u64,
}

impl PersistenceManager {
    /// Creates a new persistence manager with the given configuration.
    pub fn new(config: &DbConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            max_retries: config.persistence_max_retries,
            retry_delay_ms: config.persistence_retry_delay_ms,
        }
    }

    /// Loads the manifest from disk, if one exists.
    ///
    /// # Returns
    /// `Ok(None)` when the database has never been persisted.
    pub fn load_manifest(&self) -> Result<Option<Manifest>, StoreError> {
        let manifest_path = self.data_dir.join("manifest.json");
        if !manifest_path.exists() {
            return Ok(None);
        }

        let contents = read_file(&manifest_path, "Failed to read manifest")?;
        let manifest: Manifest = serde_json::from_slice(&contents)
            .map_err(|e| StoreError::SerializationError(format!("Failed to parse manifest: {}", e)))?;

        if manifest.format_version != MANIFEST_FORMAT_VERSION {
            return Err(StoreError::SerializationError(format!(
                "Unsupported manifest format version: {}",
                manifest.format_version
            )));
        }

        Ok(Some(manifest))
    }

    /// Saves the manifest to disk with retry on transient errors.
    pub fn save_manifest(&self, manifest: &Manifest) -> Result<(), StoreError> {
        retry_io_operation(
            || self.save_manifest_internal(manifest),
            self.max_retries,
            self.retry_delay_ms,
            "save_manifest",
        )
    }

    fn save_manifest_internal(&self, manifest: &Manifest) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(manifest)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        fs::create_dir_all(&self.data_dir)
            .map_err(|e| classify_io_error(e, "Failed to create data directory"))?;

        let temp_path = self.data_dir.join("manifest.json.tmp");
        let final_path = self.data_dir.join("manifest.json");
        write_atomic(&temp_path, &final_path, &json)
    }

    /// Saves a store's data file and returns its checksum.
    pub fn save_store(&self, store: &ObjectStore) -> Result<u32, StoreError> {
        retry_io_operation(
            || self.save_store_internal(store),
            self.max_retries,
            self.retry_delay_ms,
            "save_store",
        )
    }

    fn save_store_internal(&self, store: &ObjectStore) -> Result<u32, StoreError> {
        let entries: Vec<StoreEntry> = store
            .iter()
            .map(|(key, value)| StoreEntry {
                key,
                value: value.clone(),
            })
            .collect();
        let json = serde_json::to_vec_pretty(&entries)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        let stores_dir = self.data_dir.join("stores");
        fs::create_dir_all(&stores_dir)
            .map_err(|e| classify_io_error(e, "Failed to create stores directory"))?;

        let mut hasher = Hasher::new();
        hasher.update(&json);
        let checksum = hasher.finalize();

        let temp_path = stores_dir.join(format!("{}.json.tmp", store.name));
        let final_path = stores_dir.join(format!("{}.json", store.name));
        write_atomic(&temp_path, &final_path, &json)?;

        tracing::debug!(
            "Persisted store '{}' ({} records, crc32 {:08x})",
            store.name,
            entries.len(),
            checksum
        );
        Ok(checksum)
    }

    /// Loads a store's data file, verifying its checksum against the manifest.
    pub fn load_store(&self, name: &str, meta: &StoreMeta) -> Result<ObjectStore, StoreError> {
        let data_path = self.data_dir.join("stores").join(format!("{}.json", name));
        if !data_path.exists() {
            // Store was created but never flushed with data
            return Ok(ObjectStore::from_parts(
                name.to_string(),
                BTreeMap::new(),
                meta.next_key,
                meta.checksum,
            ));
        }

        let contents = read_file(&data_path, "Failed to read store data")?;

        let mut hasher = Hasher::new();
        hasher.update(&contents);
        let actual = hasher.finalize();
        if actual != meta.checksum {
            return Err(StoreError::DataCorruption(format!(
                "Checksum mismatch for store '{}': expected {:08x}, got {:08x}",
                name, meta.checksum, actual
            )));
        }

        let entries: Vec<StoreEntry> = serde_json::from_slice(&contents).map_err(|e| {
            StoreError::SerializationError(format!("Failed to parse store '{}': {}", name, e))
        })?;

        let mut records: BTreeMap<u64, Value> = BTreeMap::new();
        for entry in entries {
            records.insert(entry.key, entry.value);
        }

        Ok(ObjectStore::from_parts(
            name.to_string(),
            records,
            meta.next_key,
            meta.checksum,
        ))
    }

    /// Removes a store's data file. Missing files are ignored.
    pub fn remove_store_file(&self, name: &str) -> Result<(), StoreError> {
        let data_path = self.data_dir.join("stores").join(format!("{}.json", name));
        if data_path.exists() {
            fs::remove_file(&data_path)
                .map_err(|e| classify_io_error(e, "Failed to remove store data file"))?;
        }
        Ok(())
    }

    /// Wipes the whole data directory.
    pub fn wipe(&self) -> Result<(), StoreError> {
        if self.data_dir.exists() {
            fs::remove_dir_all(&self.data_dir)
                .map_err(|e| classify_io_error(e, "Failed to remove data directory"))?;
        }
        Ok(())
    }
}

/// Reads a whole file into memory.
fn read_file(path: &Path, context: &str) -> Result<Vec<u8>, StoreError> {
    let mut file = File::open(path).map_err(|e| classify_io_error(e, context))?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)
        .map_err(|e| classify_io_error(e, context))?;
    Ok(contents)
}

/// Writes bytes to a temp file, syncs, and renames into place.
fn write_atomic(temp_path: &Path, final_path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file =
        File::create(temp_path).map_err(|e| classify_io_error(e, "Failed to create temp file"))?;
    file.write_all(bytes)
        .map_err(|e| classify_io_error(e, "Failed to write file"))?;
    file.sync_all()
        .map_err(|e| classify_io_error(e, "Failed to sync file"))?;
    fs::rename(temp_path, final_path)
        .map_err(|e| classify_io_error(e, "Failed to rename file into place"))?;
    Ok(())
}

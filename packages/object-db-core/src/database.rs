//! Named database: versioned collection of object stores.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::DbConfig;
use crate::error::StoreError;
use crate::persistence::{Manifest, PersistenceManager, StoreMeta, MANIFEST_FORMAT_VERSION};
use crate::store::ObjectStore;
use crate::transaction::{Transaction, TransactionMode};

/// A named database at a data directory.
///
/// Opened with a requested schema version and an upgrade hook. The hook
/// runs at most once per open, before any data operation, and is the
/// only context in which object stores may be created or deleted.
#[derive(Debug)]
pub struct Database {
    pub(crate) config: DbConfig,
    pub(crate) version: u32,
    pub(crate) stores: BTreeMap<String, ObjectStore>,
    pub(crate) persistence: PersistenceManager,
}

impl Database {
    /// Opens or creates the database described by `config`.
    ///
    /// Loads the manifest and store data from disk when present,
    /// verifying checksums. Runs `upgrade` when the stored version is
    /// older than `version` or the database is new. Rejects with
    /// [`StoreError::VersionConflict`] when the stored version is newer.
    ///
    /// # Arguments
    /// * `config` - Database name, data directory and limits
    /// * `version` - Requested schema version
    /// * `upgrade` - Hook run to create stores and seed data
    pub fn open<F>(config: DbConfig, version: u32, upgrade: F) -> Result<Self, StoreError>
    where
        F: FnOnce(&mut UpgradeHandle<'_>) -> Result<(), StoreError>,
    {
        let persistence = PersistenceManager::new(&config);

        let (stored_version, stores) = match persistence.load_manifest()? {
            Some(manifest) => {
                if manifest.version > version {
                    return Err(StoreError::VersionConflict {
                        requested: version,
                        stored: manifest.version,
                    });
                }
                let mut stores = BTreeMap::new();
                for (name, meta) in &manifest.stores {
                    let store = persistence.load_store(name, meta)?;
                    stores.insert(name.clone(), store);
                }
                (Some(manifest.version), stores)
            }
            None => (None, BTreeMap::new()),
        };

        let mut db = Self {
            config,
            version: stored_version.unwrap_or(0),
            stores,
            persistence,
        };

        if stored_version != Some(version) {
            tracing::info!(
                "Upgrading database '{}' from version {} to {}",
                db.config.name,
                db.version,
                version
            );
            let mut handle = UpgradeHandle { db: &mut db };
            upgrade(&mut handle)?;
            db.version = version;
            db.persist_all()?;
            tracing::info!("Database '{}' upgraded to version {}", db.config.name, version);
        } else {
            tracing::info!(
                "Opened database '{}' at version {} with {} stores",
                db.config.name,
                db.version,
                db.stores.len()
            );
        }

        Ok(db)
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Current schema version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Names of the object stores, in order.
    pub fn store_names(&self) -> Vec<String> {
        self.stores.keys().cloned().collect()
    }

    /// Returns true when the named store exists.
    pub fn contains_store(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// Opens a transaction scoped to one store.
    ///
    /// Writes are staged on a working copy; [`Transaction::commit`]
    /// publishes and persists them, dropping without commit discards
    /// them.
    pub fn transaction(
        &mut self,
        store: &str,
        mode: TransactionMode,
    ) -> Result<Transaction<'_>, StoreError> {
        let staged = self
            .stores
            .get(store)
            .ok_or_else(|| StoreError::StoreNotFound {
                store: store.to_string(),
            })?
            .clone();
        Ok(Transaction::new(self, staged, mode))
    }

    /// Closes the database and wipes its on-disk data.
    ///
    /// A subsequent `open` sees a fresh database and re-runs the
    /// upgrade hook.
    pub fn delete_database(self) -> Result<(), StoreError> {
        tracing::info!("Deleting database '{}'", self.config.name);
        self.persistence.wipe()
    }

    /// Persists one store's data file and the manifest.
    pub(crate) fn persist_store(&mut self, name: &str) -> Result<(), StoreError> {
        let store = self
            .stores
            .get_mut(name)
            .ok_or_else(|| StoreError::StoreNotFound {
                store: name.to_string(),
            })?;
        let checksum = self.persistence.save_store(store)?;
        store.checksum = checksum;
        let manifest = self.build_manifest();
        self.persistence.save_manifest(&manifest)
    }

    /// Persists every store and the manifest.
    pub(crate) fn persist_all(&mut self) -> Result<(), StoreError> {
        let names: Vec<String> = self.stores.keys().cloned().collect();
        for name in &names {
            let store = self.stores.get_mut(name).expect("store name just listed");
            let checksum = self.persistence.save_store(store)?;
            store.checksum = checksum;
        }
        let manifest = self.build_manifest();
        self.persistence.save_manifest(&manifest)
    }

    fn build_manifest(&self) -> Manifest {
        let stores = self
            .stores
            .iter()
            .map(|(name, store)| {
                (
                    name.clone(),
                    StoreMeta {
                        next_key: store.next_key(),
                        checksum: store.checksum,
                    },
                )
            })
            .collect();
        Manifest {
            format_version: MANIFEST_FORMAT_VERSION,
            name: self.config.name.clone(),
            version: self.version,
            stores,
        }
    }
}

/// Handle passed to the upgrade hook during [`Database::open`].
///
/// Allows store creation and deletion, plus seeding inserts, none of
/// which are possible outside an upgrade.
pub struct UpgradeHandle<'db> {
    db: &'db mut Database,
}

impl UpgradeHandle<'_> {
    /// Creates a new, empty object store.
    pub fn create_object_store(&mut self, name: &str) -> Result<(), StoreError> {
        if self.db.stores.contains_key(name) {
            return Err(StoreError::StoreAlreadyExists(name.to_string()));
        }
        tracing::info!("Creating object store '{}'", name);
        self.db
            .stores
            .insert(name.to_string(), ObjectStore::new(name));
        Ok(())
    }

    /// Deletes an object store and its data file.
    pub fn delete_object_store(&mut self, name: &str) -> Result<(), StoreError> {
        if self.db.stores.remove(name).is_none() {
            return Err(StoreError::StoreNotFound {
                store: name.to_string(),
            });
        }
        tracing::info!("Deleting object store '{}'", name);
        self.db.persistence.remove_store_file(name)
    }

    /// Inserts a seed record under the next generated key.
    pub fn add(&mut self, store: &str, value: Value) -> Result<u64, StoreError> {
        let max = self.db.config.max_value_size;
        let size = serialized_size(&value)?;
        if size > max {
            return Err(StoreError::ValueTooLarge { size, limit: max });
        }
        let store = self
            .db
            .stores
            .get_mut(store)
            .ok_or_else(|| StoreError::StoreNotFound {
                store: store.to_string(),
            })?;
        Ok(store.add(value))
    }

    /// Names of the object stores that exist so far.
    pub fn store_names(&self) -> Vec<String> {
        self.db.store_names()
    }

    /// The version the database is upgrading from (0 for a new database).
    pub fn old_version(&self) -> u32 {
        self.db.version
    }
}

/// Serialized size of a value, for limit checks.
pub(crate) fn serialized_size(value: &Value) -> Result<usize, StoreError> {
    serde_json::to_vec(value)
        .map(|bytes| bytes.len())
        .map_err(|e| StoreError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> DbConfig {
        DbConfig {
            name: "testdb".to_string(),
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn fresh_open_runs_upgrade_once() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(test_config(&dir), 1, |upgrade| {
            assert_eq!(upgrade.old_version(), 0);
            upgrade.create_object_store("things")?;
            upgrade.add("things", json!({"n": 1}))?;
            Ok(())
        })
        .unwrap();
        assert_eq!(db.version(), 1);
        assert!(db.contains_store("things"));
    }

    #[test]
    fn reopen_at_same_version_skips_upgrade() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(test_config(&dir), 1, |upgrade| {
            upgrade.create_object_store("things")?;
            upgrade.add("things", json!({"n": 1}))?;
            Ok(())
        })
        .unwrap();
        drop(db);

        let mut db = Database::open(test_config(&dir), 1, |_| {
            panic!("upgrade must not run at the same version");
        })
        .unwrap();
        let tx = db
            .transaction("things", TransactionMode::ReadOnly)
            .unwrap();
        assert_eq!(tx.count(), 1);
    }

    #[test]
    fn opening_older_version_is_a_conflict() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(test_config(&dir), 2, |upgrade| {
            upgrade.create_object_store("things")
        })
        .unwrap();
        drop(db);

        let err = Database::open(test_config(&dir), 1, |_| Ok(())).unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionConflict {
                requested: 1,
                stored: 2
            }
        ));
    }

    #[test]
    fn delete_database_makes_next_open_fresh() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(test_config(&dir), 1, |upgrade| {
            upgrade.create_object_store("things")?;
            upgrade.add("things", json!({"n": 1}))?;
            Ok(())
        })
        .unwrap();
        db.delete_database().unwrap();

        let mut upgraded = false;
        let mut db = Database::open(test_config(&dir), 1, |upgrade| {
            upgraded = true;
            upgrade.create_object_store("things")
        })
        .unwrap();
        assert!(upgraded);
        let tx = db
            .transaction("things", TransactionMode::ReadOnly)
            .unwrap();
        assert_eq!(tx.count(), 0);
    }

    #[test]
    fn transaction_on_missing_store_errors() {
        let dir = TempDir::new().unwrap();
        let mut db = Database::open(test_config(&dir), 1, |upgrade| {
            upgrade.create_object_store("things")
        })
        .unwrap();
        let err = db
            .transaction("missing", TransactionMode::ReadOnly)
            .unwrap_err();
        assert!(matches!(err, StoreError::StoreNotFound { .. }));
    }

    #[test]
    fn store_creation_only_during_upgrade() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(test_config(&dir), 1, |upgrade| {
            upgrade.create_object_store("things")?;
            let err = upgrade.create_object_store("things").unwrap_err();
            assert!(matches!(err, StoreError::StoreAlreadyExists(_)));
            Ok(())
        })
        .unwrap();
        // No API exists to create a store on an open database.
        assert_eq!(db.store_names(), vec!["things".to_string()]);
    }
}

//! Transactions scoped to a single object store.

use serde_json::Value;

use crate::cursor::{Cursor, KeyRange};
use crate::database::{serialized_size, Database};
use crate::error::StoreError;

/// Transaction access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Reads only; any write is a typed error
    ReadOnly,
    /// Reads and writes; commit publishes and persists staged writes
    ReadWrite,
}

/// A transaction over one object store.
///
/// Writes go to a working copy of the store. [`Transaction::commit`]
/// swaps the copy in and persists it; dropping the transaction without
/// committing discards every staged write.
#[derive(Debug)]
pub struct Transaction<'db> {
    db: &'db mut Database,
    staged: crate::store::ObjectStore,
    mode: TransactionMode,
    dirty: bool,
    max_value_size: usize,
}

impl<'db> Transaction<'db> {
    pub(crate) fn new(
        db: &'db mut Database,
        staged: crate::store::ObjectStore,
        mode: TransactionMode,
    ) -> Self {
        let max_value_size = db.config.max_value_size;
        Self {
            db,
            staged,
            mode,
            dirty: false,
            max_value_size,
        }
    }

    /// Name of the store this transaction is scoped to.
    pub fn store_name(&self) -> &str {
        &self.staged.name
    }

    /// Transaction mode.
    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.mode == TransactionMode::ReadOnly {
            return Err(StoreError::ReadOnlyTransaction {
                store: self.staged.name.clone(),
            });
        }
        Ok(())
    }

    fn check_value_size(&self, value: &Value) -> Result<(), StoreError> {
        let size = serialized_size(value)?;
        if size > self.max_value_size {
            return Err(StoreError::ValueTooLarge {
                size,
                limit: self.max_value_size,
            });
        }
        Ok(())
    }

    /// Inserts a record under the next generated key and returns the key.
    pub fn add(&mut self, value: Value) -> Result<u64, StoreError> {
        self.check_writable()?;
        self.check_value_size(&value)?;
        self.dirty = true;
        Ok(self.staged.add(value))
    }

    /// Returns the record at `key`. A missing key is `Ok(None)`.
    pub fn get(&self, key: u64) -> Result<Option<Value>, StoreError> {
        Ok(self.staged.get(key).cloned())
    }

    /// Removes the record at `key`. Removing an absent key succeeds.
    pub fn delete(&mut self, key: u64) -> Result<(), StoreError> {
        self.check_writable()?;
        self.dirty = true;
        self.staged.delete(key);
        Ok(())
    }

    /// Removes every record in the store.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.check_writable()?;
        self.dirty = true;
        self.staged.clear();
        Ok(())
    }

    /// Number of records in the store.
    pub fn count(&self) -> usize {
        self.staged.count()
    }

    /// All records in ascending key order, each paired with its key.
    pub fn scan(&self, range: KeyRange) -> Vec<(u64, Value)> {
        self.staged
            .iter()
            .filter(|(key, _)| range.contains(*key))
            .map(|(key, value)| (key, value.clone()))
            .collect()
    }

    /// Opens a cursor over the store's records, restricted by `range`.
    pub fn open_cursor(&mut self, range: KeyRange) -> Cursor<'_, 'db> {
        let keys: Vec<u64> = self.staged.keys().filter(|k| range.contains(*k)).collect();
        Cursor::new(self, keys)
    }

    pub(crate) fn cursor_value(&self, key: u64) -> Option<Value> {
        self.staged.get(key).cloned()
    }

    pub(crate) fn cursor_update(&mut self, key: u64, value: Value) -> Result<(), StoreError> {
        self.check_writable()?;
        self.check_value_size(&value)?;
        self.dirty = true;
        self.staged.put(key, value);
        Ok(())
    }

    pub(crate) fn cursor_delete(&mut self, key: u64) -> Result<(), StoreError> {
        self.check_writable()?;
        self.dirty = true;
        self.staged.delete(key);
        Ok(())
    }

    /// Commits the transaction: publishes the working copy and persists it.
    ///
    /// Read-only and untouched transactions commit as a no-op.
    pub fn commit(self) -> Result<(), StoreError> {
        let Transaction {
            db, staged, dirty, ..
        } = self;
        if !dirty {
            return Ok(());
        }
        let name = staged.name.clone();
        db.stores.insert(name.clone(), staged);
        db.persist_store(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn open_db(dir: &TempDir) -> Database {
        let config = DbConfig {
            name: "txdb".to_string(),
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        Database::open(config, 1, |upgrade| upgrade.create_object_store("things")).unwrap()
    }

    #[test]
    fn add_then_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut db = open_db(&dir);
        let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
        let key = tx.add(json!({"text": "hello"})).unwrap();
        tx.commit().unwrap();

        let tx = db.transaction("things", TransactionMode::ReadOnly).unwrap();
        assert_eq!(tx.get(key).unwrap(), Some(json!({"text": "hello"})));
        assert_eq!(tx.get(key + 1).unwrap(), None);
    }

    #[test]
    fn write_under_read_only_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut db = open_db(&dir);
        let mut tx = db.transaction("things", TransactionMode::ReadOnly).unwrap();
        let err = tx.add(json!(1)).unwrap_err();
        assert!(matches!(err, StoreError::ReadOnlyTransaction { .. }));
        let err = tx.delete(1).unwrap_err();
        assert!(matches!(err, StoreError::ReadOnlyTransaction { .. }));
        let err = tx.clear().unwrap_err();
        assert!(matches!(err, StoreError::ReadOnlyTransaction { .. }));
    }

    #[test]
    fn drop_without_commit_discards_writes() {
        let dir = TempDir::new().unwrap();
        let mut db = open_db(&dir);
        {
            let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
            tx.add(json!(1)).unwrap();
            tx.add(json!(2)).unwrap();
            // dropped without commit
        }
        let tx = db.transaction("things", TransactionMode::ReadOnly).unwrap();
        assert_eq!(tx.count(), 0);
    }

    #[test]
    fn aborted_keys_are_not_reused_after_commit_elsewhere() {
        let dir = TempDir::new().unwrap();
        let mut db = open_db(&dir);
        {
            let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
            tx.add(json!("discarded")).unwrap();
        }
        // The abort rolled the generator back with the working copy.
        let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
        assert_eq!(tx.add(json!("kept")).unwrap(), 1);
        tx.commit().unwrap();
    }

    #[test]
    fn oversized_value_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = DbConfig {
            name: "txdb".to_string(),
            data_dir: dir.path().to_path_buf(),
            max_value_size: 16,
            ..Default::default()
        };
        let mut db =
            Database::open(config, 1, |upgrade| upgrade.create_object_store("things")).unwrap();
        let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
        let err = tx
            .add(json!({"text": "far too long for sixteen bytes"}))
            .unwrap_err();
        assert!(matches!(err, StoreError::ValueTooLarge { .. }));
    }

    #[test]
    fn scan_returns_records_in_key_order() {
        let dir = TempDir::new().unwrap();
        let mut db = open_db(&dir);
        let mut tx = db.transaction("things", TransactionMode::ReadWrite).unwrap();
        tx.add(json!("a")).unwrap();
        tx.add(json!("b")).unwrap();
        tx.add(json!("c")).unwrap();
        tx.delete(2).unwrap();
        tx.commit().unwrap();

        let tx = db.transaction("things", TransactionMode::ReadOnly).unwrap();
        let all = tx.scan(KeyRange::All);
        assert_eq!(all, vec![(1, json!("a")), (3, json!("c"))]);
        let only = tx.scan(KeyRange::Only(3));
        assert_eq!(only, vec![(3, json!("c"))]);
    }
}

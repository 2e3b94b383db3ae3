//! Object store: an ordered map of auto-incremented keys to JSON records.

use std::collections::BTreeMap;

use serde_json::Value;

/// A named collection of records keyed by a generated `u64`.
///
/// Keys start at 1 and are never reused; deleting a record does not
/// lower the generator.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    /// Store name
    pub name: String,
    /// Records in ascending key order
    records: BTreeMap<u64, Value>,
    /// Next key handed out by the generator
    next_key: u64,
    /// CRC32 of the last persisted data file
    pub(crate) checksum: u32,
}

impl ObjectStore {
    /// Creates an empty store with the key generator at 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: BTreeMap::new(),
            next_key: 1,
            checksum: 0,
        }
    }

    /// Rebuilds a store from persisted records and generator state.
    pub(crate) fn from_parts(
        name: String,
        records: BTreeMap<u64, Value>,
        next_key: u64,
        checksum: u32,
    ) -> Self {
        Self {
            name,
            records,
            next_key,
            checksum,
        }
    }

    /// Inserts a record under the next generated key and returns the key.
    pub fn add(&mut self, value: Value) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        self.records.insert(key, value);
        key
    }

    /// Overwrites the record at an existing key.
    pub fn put(&mut self, key: u64, value: Value) {
        self.records.insert(key, value);
    }

    /// Returns the record at `key`, if present.
    pub fn get(&self, key: u64) -> Option<&Value> {
        self.records.get(&key)
    }

    /// Removes the record at `key`. Removing an absent key is a no-op.
    pub fn delete(&mut self, key: u64) {
        self.records.remove(&key);
    }

    /// Removes all records. The key generator keeps its position.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of records in the store.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.keys().copied()
    }

    /// Records in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Value)> {
        self.records.iter().map(|(k, v)| (*k, v))
    }

    /// Current key generator position.
    pub fn next_key(&self) -> u64 {
        self.next_key
    }
}

//! Cursor traversal over an object store's records.

use serde_json::Value;

use crate::error::StoreError;
use crate::transaction::Transaction;

/// Key restriction for cursors and scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRange {
    /// Every key in the store
    All,
    /// Exactly one key
    Only(u64),
}

impl KeyRange {
    /// Returns true when `key` falls inside the range.
    pub fn contains(&self, key: u64) -> bool {
        match self {
            KeyRange::All => true,
            KeyRange::Only(only) => *only == key,
        }
    }
}

/// Iteration handle over a store's records in ascending key order.
///
/// Positioned on the first matching record when opened; exhausted
/// cursors have no current record. Updates and deletes act on the
/// current record through the owning transaction.
pub struct Cursor<'tx, 'db> {
    tx: &'tx mut Transaction<'db>,
    keys: Vec<u64>,
    pos: usize,
}

impl<'tx, 'db> Cursor<'tx, 'db> {
    pub(crate) fn new(tx: &'tx mut Transaction<'db>, keys: Vec<u64>) -> Self {
        Self { tx, keys, pos: 0 }
    }

    /// Key of the current record, or `None` when exhausted.
    pub fn key(&self) -> Option<u64> {
        self.keys.get(self.pos).copied()
    }

    /// Value of the current record, or `None` when exhausted.
    pub fn value(&self) -> Option<Value> {
        self.key().and_then(|key| self.tx.cursor_value(key))
    }

    /// Overwrites the current record.
    ///
    /// # Returns
    /// [`StoreError::KeyNotFound`] when the cursor matched nothing.
    pub fn update(&mut self, value: Value) -> Result<(), StoreError> {
        let key = self.key().ok_or_else(|| StoreError::KeyNotFound {
            store: self.tx.store_name().to_string(),
            key: 0,
        })?;
        self.tx.cursor_update(key, value)
    }

    /// Deletes the current record.
    pub fn delete(&mut self) -> Result<(), StoreError> {
        let key = self.key().ok_or_else(|| StoreError::KeyNotFound {
            store: self.tx.store_name().to_string(),
            key: 0,
        })?;
        self.tx.cursor_delete(key)
    }

    /// Advances to the next record. Returns false once exhausted.
    pub fn advance(&mut self) -> bool {
        if self.pos < self.keys.len() {
            self.pos += 1;
        }
        self.pos < self.keys.len()
    }
}

//! Storage thread owning the database and serving requests.

use std::sync::Arc;
use std::thread;

use serde_json::Value;
use tokio::sync::mpsc;

use object_db_core::{
    Database, DbConfig, KeyRange, StoreError, TransactionMode, UpgradeHandle,
};

use crate::handle::StoreHandle;
use crate::{Result, StoreRequest};

/// Upgrade hook shared with the worker so a reset can re-run it.
pub type UpgradeFn =
    dyn Fn(&mut UpgradeHandle<'_>) -> std::result::Result<(), StoreError> + Send + Sync;

/// Bounded request queue depth between callers and the storage thread.
const REQUEST_QUEUE_CAPACITY: usize = 64;

/// Opens the database and spawns the storage thread serving it.
///
/// # Arguments
/// * `config` - Database name, data directory and limits
/// * `version` - Requested schema version
/// * `store` - Object store every request is scoped to
/// * `upgrade` - Hook run on open and after each reset
///
/// # Returns
/// The async [`StoreHandle`] facade and the thread's join handle. The
/// thread exits once every handle clone is dropped.
pub fn spawn_store(
    config: DbConfig,
    version: u32,
    store: impl Into<String>,
    upgrade: Arc<UpgradeFn>,
) -> Result<(StoreHandle, thread::JoinHandle<()>)> {
    let store = store.into();
    let db = open_database(&config, version, &upgrade)?;
    if !db.contains_store(&store) {
        return Err(StoreError::StoreNotFound { store });
    }

    let (tx, rx) = mpsc::channel(REQUEST_QUEUE_CAPACITY);
    let worker = StoreWorker {
        db: Some(db),
        store,
        config,
        version,
        upgrade,
        rx,
    };
    let join = thread::spawn(move || worker.run());
    Ok((StoreHandle::new(tx), join))
}

fn open_database(config: &DbConfig, version: u32, upgrade: &Arc<UpgradeFn>) -> Result<Database> {
    Database::open(config.clone(), version, |handle| upgrade(handle))
}

/// The storage thread's state: the owned database plus everything
/// needed to rebuild it on reset.
pub struct StoreWorker {
    /// None only after a failed reset, until the next successful one
    db: Option<Database>,
    store: String,
    config: DbConfig,
    version: u32,
    upgrade: Arc<UpgradeFn>,
    rx: mpsc::Receiver<StoreRequest>,
}

impl StoreWorker {
    /// Serves requests until every sender is dropped.
    pub fn run(mut self) {
        tracing::info!("Storage thread started for store '{}'", self.store);
        while let Some(request) = self.rx.blocking_recv() {
            self.handle_request(request);
        }
        tracing::info!("Storage thread for store '{}' shutting down", self.store);
    }

    fn handle_request(&mut self, request: StoreRequest) {
        match request {
            StoreRequest::Add { value, response } => {
                let _ = response.send(self.handle_add(value));
            }
            StoreRequest::Get { key, response } => {
                let _ = response.send(self.handle_get(key));
            }
            StoreRequest::List { response } => {
                let _ = response.send(self.handle_list());
            }
            StoreRequest::Update {
                key,
                value,
                response,
            } => {
                let _ = response.send(self.handle_update(key, value));
            }
            StoreRequest::Delete { key, response } => {
                let _ = response.send(self.handle_delete(key));
            }
            StoreRequest::Clear { response } => {
                let _ = response.send(self.handle_clear());
            }
            StoreRequest::Count { response } => {
                let _ = response.send(self.handle_count());
            }
            StoreRequest::Reset { response } => {
                let _ = response.send(self.handle_reset());
            }
        }
    }

    fn database(&mut self) -> Result<&mut Database> {
        self.db.as_mut().ok_or_else(|| {
            StoreError::IoError("database unavailable after failed reset".to_string())
        })
    }

    fn handle_add(&mut self, value: Value) -> Result<u64> {
        let store = self.store.clone();
        let db = self.database()?;
        let mut tx = db.transaction(&store, TransactionMode::ReadWrite)?;
        let key = tx.add(value)?;
        tx.commit()?;
        tracing::debug!("Added record {} to store '{}'", key, store);
        Ok(key)
    }

    fn handle_get(&mut self, key: u64) -> Result<Option<Value>> {
        let store = self.store.clone();
        let db = self.database()?;
        let tx = db.transaction(&store, TransactionMode::ReadOnly)?;
        tx.get(key)
    }

    fn handle_list(&mut self) -> Result<Vec<(u64, Value)>> {
        let store = self.store.clone();
        let db = self.database()?;
        let mut tx = db.transaction(&store, TransactionMode::ReadOnly)?;
        let mut records = Vec::new();
        let mut cursor = tx.open_cursor(KeyRange::All);
        while let Some(key) = cursor.key() {
            if let Some(value) = cursor.value() {
                records.push((key, value));
            }
            if !cursor.advance() {
                break;
            }
        }
        Ok(records)
    }

    fn handle_update(&mut self, key: u64, value: Value) -> Result<()> {
        let store = self.store.clone();
        let db = self.database()?;
        let mut tx = db.transaction(&store, TransactionMode::ReadWrite)?;
        {
            let mut cursor = tx.open_cursor(KeyRange::Only(key));
            if cursor.key().is_none() {
                return Err(StoreError::KeyNotFound { store, key });
            }
            cursor.update(value)?;
        }
        tx.commit()?;
        tracing::debug!("Updated record {} in store '{}'", key, store);
        Ok(())
    }

    fn handle_delete(&mut self, key: u64) -> Result<()> {
        let store = self.store.clone();
        let db = self.database()?;
        let mut tx = db.transaction(&store, TransactionMode::ReadWrite)?;
        tx.delete(key)?;
        tx.commit()?;
        tracing::debug!("Deleted record {} from store '{}'", key, store);
        Ok(())
    }

    fn handle_clear(&mut self) -> Result<()> {
        let store = self.store.clone();
        let db = self.database()?;
        let mut tx = db.transaction(&store, TransactionMode::ReadWrite)?;
        tx.clear()?;
        tx.commit()
    }

    fn handle_count(&mut self) -> Result<usize> {
        let store = self.store.clone();
        let db = self.database()?;
        let tx = db.transaction(&store, TransactionMode::ReadOnly)?;
        Ok(tx.count())
    }

    fn handle_reset(&mut self) -> Result<()> {
        tracing::info!("Resetting database for store '{}'", self.store);
        if let Some(db) = self.db.take() {
            db.delete_database()?;
        }
        let db = open_database(&self.config, self.version, &self.upgrade)?;
        self.db = Some(db);
        Ok(())
    }
}

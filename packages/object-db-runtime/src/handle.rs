//! Async facade over the storage thread's request queue.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use object_db_core::StoreError;

use crate::{Result, StoreRequest};

/// Cloneable async handle to one object store.
///
/// Every method sends a request to the storage thread and suspends
/// until its one-shot response resolves.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreRequest>,
}

fn thread_gone() -> StoreError {
    StoreError::IoError("storage thread is gone".to_string())
}

impl StoreHandle {
    pub(crate) fn new(tx: mpsc::Sender<StoreRequest>) -> Self {
        Self { tx }
    }

    /// Raw request sender, for callers building requests themselves.
    pub fn sender(&self) -> mpsc::Sender<StoreRequest> {
        self.tx.clone()
    }

    async fn send(&self, request: StoreRequest) -> Result<()> {
        self.tx.send(request).await.map_err(|_| thread_gone())
    }

    /// Inserts a record and returns its generated key.
    pub async fn add(&self, value: Value) -> Result<u64> {
        let (response, rx) = oneshot::channel();
        self.send(StoreRequest::Add { value, response }).await?;
        rx.await.map_err(|_| thread_gone())?
    }

    /// Fetches the record at `key`; a missing key is `Ok(None)`.
    pub async fn get(&self, key: u64) -> Result<Option<Value>> {
        let (response, rx) = oneshot::channel();
        self.send(StoreRequest::Get { key, response }).await?;
        rx.await.map_err(|_| thread_gone())?
    }

    /// Lists all records in key order, each paired with its key.
    pub async fn list(&self) -> Result<Vec<(u64, Value)>> {
        let (response, rx) = oneshot::channel();
        self.send(StoreRequest::List { response }).await?;
        rx.await.map_err(|_| thread_gone())?
    }

    /// Overwrites the record at `key` through a cursor.
    pub async fn update(&self, key: u64, value: Value) -> Result<()> {
        let (response, rx) = oneshot::channel();
        self.send(StoreRequest::Update {
            key,
            value,
            response,
        })
        .await?;
        rx.await.map_err(|_| thread_gone())?
    }

    /// Removes the record at `key`; an absent key succeeds.
    pub async fn delete(&self, key: u64) -> Result<()> {
        let (response, rx) = oneshot::channel();
        self.send(StoreRequest::Delete { key, response }).await?;
        rx.await.map_err(|_| thread_gone())?
    }

    /// Removes every record in the store.
    pub async fn clear(&self) -> Result<()> {
        let (response, rx) = oneshot::channel();
        self.send(StoreRequest::Clear { response }).await?;
        rx.await.map_err(|_| thread_gone())?
    }

    /// Counts the records in the store.
    pub async fn count(&self) -> Result<usize> {
        let (response, rx) = oneshot::channel();
        self.send(StoreRequest::Count { response }).await?;
        rx.await.map_err(|_| thread_gone())?
    }

    /// Deletes the database, reopens it, and re-runs the upgrade hook.
    pub async fn reset(&self) -> Result<()> {
        let (response, rx) = oneshot::channel();
        self.send(StoreRequest::Reset { response }).await?;
        rx.await.map_err(|_| thread_gone())?
    }
}

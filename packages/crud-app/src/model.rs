//! Typed storage model over the storage thread.

use std::path::PathBuf;
use std::sync::Arc;

use rand::thread_rng;
use serde_json::Value;

use object_db_core::{DbConfig, StoreError};
use object_db_runtime::{spawn_store, StoreHandle, UpgradeFn};

use crate::entity::{Thing, ThingRecord};
use crate::error::AppError;

/// Name of the single object store.
pub const STORE_NAME: &str = "things";

/// Schema version requested on open.
pub const SCHEMA_VERSION: u32 = 2;

/// Model configuration.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Database name
    pub database: String,
    /// Data directory for persistence
    pub data_dir: PathBuf,
    /// Records seeded when the store is first created
    pub seed_count: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            database: "crudo".to_string(),
            data_dir: PathBuf::from("./data"),
            seed_count: 20,
        }
    }
}

/// Storage model for [`Thing`] records.
///
/// Owns the async handle to the storage thread. Opening the model
/// installs the upgrade hook that creates the store and seeds it with
/// randomly generated records.
#[derive(Clone)]
pub struct ThingModel {
    handle: StoreHandle,
}

impl ThingModel {
    /// Opens the database and spawns its storage thread.
    pub fn open(config: ModelConfig) -> Result<Self, AppError> {
        let db_config = DbConfig {
            name: config.database.clone(),
            data_dir: config.data_dir.clone(),
            ..Default::default()
        };
        let seed_count = config.seed_count;
        let upgrade: Arc<UpgradeFn> = Arc::new(move |upgrade| {
            if upgrade.store_names().iter().any(|name| name == STORE_NAME) {
                return Ok(());
            }
            upgrade.create_object_store(STORE_NAME)?;
            tracing::info!("Seeding {} generated records", seed_count);
            let mut rng = thread_rng();
            for _ in 0..seed_count {
                let thing = Thing::generate(&mut rng);
                upgrade.add(STORE_NAME, encode(&thing)?)?;
            }
            Ok(())
        });

        let (handle, _worker) = spawn_store(db_config, SCHEMA_VERSION, STORE_NAME, upgrade)?;
        Ok(Self { handle })
    }

    /// Inserts a record and returns its generated key.
    pub async fn insert(&self, thing: &Thing) -> Result<u64, AppError> {
        Ok(self.handle.add(encode(thing)?).await?)
    }

    /// Fetches a record by key, attaching the key to the result.
    pub async fn get(&self, key: u64) -> Result<Option<ThingRecord>, AppError> {
        match self.handle.get(key).await? {
            Some(value) => Ok(Some(ThingRecord {
                key,
                thing: decode(value)?,
            })),
            None => Ok(None),
        }
    }

    /// Lists every record in key order, each with its key attached.
    pub async fn list(&self) -> Result<Vec<ThingRecord>, AppError> {
        let records = self.handle.list().await?;
        records
            .into_iter()
            .map(|(key, value)| {
                Ok(ThingRecord {
                    key,
                    thing: decode(value)?,
                })
            })
            .collect()
    }

    /// Overwrites a record in full.
    ///
    /// # Returns
    /// [`AppError::MissingKey`] for `key == 0`, [`AppError::NotFound`]
    /// when no record exists under the key.
    pub async fn update(&self, record: &ThingRecord) -> Result<(), AppError> {
        if record.key == 0 {
            return Err(AppError::MissingKey);
        }
        match self.handle.update(record.key, encode(&record.thing)?).await {
            Err(StoreError::KeyNotFound { key, .. }) => Err(AppError::NotFound { key }),
            other => Ok(other?),
        }
    }

    /// Deletes a record by key. Deleting an absent key succeeds.
    pub async fn delete(&self, key: u64) -> Result<(), AppError> {
        Ok(self.handle.delete(key).await?)
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<usize, AppError> {
        Ok(self.handle.count().await?)
    }

    /// Deletes the database and reseeds it through the upgrade hook.
    pub async fn reset(&self) -> Result<(), AppError> {
        Ok(self.handle.reset().await?)
    }
}

fn encode(thing: &Thing) -> Result<Value, StoreError> {
    serde_json::to_value(thing).map_err(|e| StoreError::SerializationError(e.to_string()))
}

fn decode(value: Value) -> Result<Thing, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Store(StoreError::SerializationError(e.to_string())))
}

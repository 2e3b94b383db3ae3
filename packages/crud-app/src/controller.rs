//! Controller routing UI actions to model operations and screens.

use crate::entity::{Thing, ThingRecord};
use crate::error::AppError;
use crate::model::ThingModel;
use crate::view;

/// What an action produced: a rendered screen or a redirect to the list.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A full HTML screen to render
    Screen(String),
    /// Navigate back to the list screen
    RedirectToList,
}

/// Routes UI actions to the model and back to view refreshes.
#[derive(Clone)]
pub struct Controller {
    model: ThingModel,
}

impl Controller {
    /// Creates a controller over an opened model.
    pub fn new(model: ThingModel) -> Self {
        Self { model }
    }

    /// The storage model, for callers needing direct access.
    pub fn model(&self) -> &ThingModel {
        &self.model
    }

    /// Shows the list of all records.
    pub async fn list(&self) -> Result<Outcome, AppError> {
        let records = self.model.list().await?;
        Ok(Outcome::Screen(view::list_screen(&records)))
    }

    /// Shows the empty create form.
    pub async fn show_create(&self) -> Result<Outcome, AppError> {
        Ok(Outcome::Screen(view::create_screen()))
    }

    /// Creates a record from a submitted form.
    pub async fn create(&self, thing: Thing) -> Result<Outcome, AppError> {
        let key = self.model.insert(&thing).await?;
        tracing::debug!("Created record {}", key);
        Ok(Outcome::RedirectToList)
    }

    /// Shows one record's details.
    pub async fn show(&self, key: u64) -> Result<Outcome, AppError> {
        let record = self.fetch(key).await?;
        Ok(Outcome::Screen(view::detail_screen(&record)))
    }

    /// Shows the pre-filled edit form for one record.
    pub async fn show_edit(&self, key: u64) -> Result<Outcome, AppError> {
        let record = self.fetch(key).await?;
        Ok(Outcome::Screen(view::edit_screen(&record)))
    }

    /// Applies a submitted edit as a full-record overwrite.
    pub async fn edit(&self, record: ThingRecord) -> Result<Outcome, AppError> {
        self.model.update(&record).await?;
        tracing::debug!("Updated record {}", record.key);
        Ok(Outcome::RedirectToList)
    }

    /// Deletes a record by key.
    pub async fn delete(&self, key: u64) -> Result<Outcome, AppError> {
        self.model.delete(key).await?;
        tracing::debug!("Deleted record {}", key);
        Ok(Outcome::RedirectToList)
    }

    /// Deletes the database and reseeds it.
    pub async fn reset_database(&self) -> Result<Outcome, AppError> {
        self.model.reset().await?;
        tracing::info!("Database reset");
        Ok(Outcome::RedirectToList)
    }

    /// Abandons the current form and returns to the list.
    pub fn cancel(&self) -> Outcome {
        Outcome::RedirectToList
    }

    async fn fetch(&self, key: u64) -> Result<ThingRecord, AppError> {
        self.model
            .get(key)
            .await?
            .ok_or(AppError::NotFound { key })
    }
}

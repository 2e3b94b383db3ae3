//! Generic CRUD demo application.
//!
//! Model-View-Controller wrapper around the object-store engine: a
//! six-field entity with a random generator, a typed storage model over
//! the storage thread, a controller routing UI actions to model
//! operations, and HTML screen fragments per view.

pub mod controller;
pub mod entity;
pub mod error;
pub mod form;
pub mod model;
pub mod view;

pub use controller::{Controller, Outcome};
pub use entity::{Thing, ThingRecord};
pub use error::AppError;
pub use model::{ModelConfig, ThingModel, SCHEMA_VERSION, STORE_NAME};

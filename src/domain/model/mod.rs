//! Model domain - persistable records and their schemas

mod entity;
mod schema;
mod validation;

pub use entity::{Model, ModelId, ID_COLUMN};
pub use schema::{Column, ColumnKind, Schema, UnknownColumns};
pub use validation::{validate_model_id, ModelIdError, MAX_MODEL_ID_LENGTH};

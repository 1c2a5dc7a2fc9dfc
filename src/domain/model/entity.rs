//! Model identity and the persistence contract

use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

use super::schema::Schema;
use super::validation::{validate_model_id, ModelIdError};
use crate::domain::value::Attributes;
use crate::domain::DomainError;

/// Name of the identifier column every model carries
pub const ID_COLUMN: &str = "id";

/// Opaque, stable model identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelId(String);

impl ModelId {
    /// Create a new ModelId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, ModelIdError> {
        let id = id.into();
        validate_model_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModelId {
    type Error = ModelIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

impl AsRef<str> for ModelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ModelIdError> for DomainError {
    fn from(error: ModelIdError) -> Self {
        DomainError::invalid_id(error.to_string())
    }
}

/// A domain record that can be persisted as a flat attribute map
///
/// The record built from a stored row and a freshly constructed one have the
/// same attribute shape; `to_persistence` always includes the `id` column.
pub trait Model: Clone + Debug + Send + Sync + 'static {
    /// Model name reported in log context
    const NAME: &'static str;

    /// Attribute schema checked before a row is hydrated
    fn schema() -> &'static Schema;

    /// The record's identifier; never changes after construction
    fn id(&self) -> &ModelId;

    /// Hydrates a record from a row that already passed schema validation
    fn from_row(row: &Attributes) -> Result<Self, DomainError>;

    /// Serializes the record into its persistence form
    fn to_persistence(&self) -> Attributes;

    /// Validates a raw row against the schema, then hydrates it
    fn from_persistence(row: &Attributes) -> Result<Self, DomainError> {
        Self::schema().validate(Self::NAME, row)?;
        Self::from_row(row)
    }

    /// Match condition selecting this record's row
    fn id_criteria(&self) -> crate::domain::Criteria {
        crate::domain::Criteria::new().eq(ID_COLUMN, self.id().as_str())
    }
}

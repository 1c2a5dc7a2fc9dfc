//! User entity

use crate::domain::model::{Column, ColumnKind, Model, ModelId, Schema, UnknownColumns, ID_COLUMN};
use crate::domain::value::Attributes;
use crate::domain::DomainError;

/// Table users are persisted in
pub const USERS_TABLE: &str = "users";

const USER_COLUMNS: &[Column] = &[
    Column::required(ID_COLUMN, ColumnKind::Text),
    Column::required("username", ColumnKind::Text),
    Column::required("password", ColumnKind::Text),
    Column::required("active", ColumnKind::Boolean),
];

static USER_SCHEMA: Schema = Schema::new(USER_COLUMNS, UnknownColumns::Ignore);

/// User record
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: ModelId,
    username: String,
    password: String,
    active: bool,
}

impl User {
    /// Create a new, active user
    pub fn new(id: ModelId, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            password: password.into(),
            active: true,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    // Getters

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    // Setters

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Model for User {
    const NAME: &'static str = "User";

    fn schema() -> &'static Schema {
        &USER_SCHEMA
    }

    fn id(&self) -> &ModelId {
        &self.id
    }

    fn from_row(row: &Attributes) -> Result<Self, DomainError> {
        let id = ModelId::new(row.text(Self::NAME, ID_COLUMN)?)
            .map_err(|e| DomainError::materialization(Self::NAME, e.to_string()))?;

        Ok(Self {
            id,
            username: row.text(Self::NAME, "username")?,
            password: row.text(Self::NAME, "password")?,
            active: row.boolean(Self::NAME, "active")?,
        })
    }

    fn to_persistence(&self) -> Attributes {
        Attributes::new()
            .with(ID_COLUMN, self.id.as_str())
            .with("username", self.username.as_str())
            .with("password", self.password.as_str())
            .with("active", self.active)
    }
}

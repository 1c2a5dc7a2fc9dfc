//! Explicit attribute schemas for models

use crate::domain::value::{Attributes, Value};
use crate::domain::DomainError;

/// Scalar kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    Boolean,
}

impl ColumnKind {
    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ColumnKind::Text, Value::Text(_)) => true,
            (ColumnKind::Integer, Value::Integer(_)) => true,
            (ColumnKind::Float, Value::Float(_) | Value::Integer(_)) => true,
            (ColumnKind::Boolean, Value::Boolean(_)) => true,
            // stores without a native boolean hand back 0/1
            (ColumnKind::Boolean, Value::Integer(0 | 1)) => true,
            _ => false,
        }
    }

    /// Postgres column type used when creating a table
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "BIGINT",
            ColumnKind::Float => "DOUBLE PRECISION",
            ColumnKind::Boolean => "BOOLEAN",
        }
    }
}

/// A single column in a schema
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl Column {
    pub const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// What to do with row columns the schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownColumns {
    /// Extra columns are dropped silently
    #[default]
    Ignore,
    /// Extra columns fail materialization
    Reject,
}

/// Attribute schema of a model
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    columns: &'static [Column],
    unknown_columns: UnknownColumns,
}

impl Schema {
    pub const fn new(columns: &'static [Column], unknown_columns: UnknownColumns) -> Self {
        Self {
            columns,
            unknown_columns,
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        self.columns
    }

    pub fn unknown_columns(&self) -> UnknownColumns {
        self.unknown_columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks a raw row against the schema
    pub fn validate(&self, model: &str, row: &Attributes) -> Result<(), DomainError> {
        for column in self.columns {
            match row.get(column.name) {
                None if column.nullable => {}
                None => {
                    return Err(DomainError::materialization(
                        model,
                        format!("missing column '{}'", column.name),
                    ));
                }
                Some(Value::Null) if column.nullable => {}
                Some(Value::Null) => {
                    return Err(DomainError::materialization(
                        model,
                        format!("column '{}' is not nullable", column.name),
                    ));
                }
                Some(value) if !column.kind.accepts(value) => {
                    return Err(DomainError::materialization(
                        model,
                        format!(
                            "column '{}' expected {:?}, got {}",
                            column.name,
                            column.kind,
                            value.kind()
                        ),
                    ));
                }
                Some(_) => {}
            }
        }

        if self.unknown_columns == UnknownColumns::Reject {
            if let Some(extra) = row.names().find(|name| self.column(name).is_none()) {
                return Err(DomainError::materialization(
                    model,
                    format!("unknown column '{}'", extra),
                ));
            }
        }

        Ok(())
    }
}

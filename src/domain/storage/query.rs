//! Criteria to query translation
//!
//! A [`SelectQuery`] is an immutable description of `SELECT * FROM <table>`
//! narrowed by an AND-conjunction of equality predicates and optionally
//! capped in rows. Each query starts from scratch; nothing is shared between
//! calls. Backends decide how to render it for their dialect.

use std::fmt;

use crate::domain::criteria::Criteria;
use crate::domain::model::{ModelId, ID_COLUMN};
use crate::domain::value::Value;
use crate::domain::DomainError;

/// Checks that a table or column name is a plain SQL identifier
pub fn validate_identifier(name: &str) -> Result<(), DomainError> {
    let mut chars = name.chars();

    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);

    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DomainError::validation(format!(
            "Invalid identifier '{}': must match [A-Za-z_][A-Za-z0-9_]*",
            name
        )));
    }

    Ok(())
}

/// A named bound parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
}

/// A single filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = :parameter`
    Eq { column: String, parameter: Parameter },
}

impl Predicate {
    /// Equality predicate using the column name as placeholder name
    pub fn eq(column: impl Into<String>, value: Value) -> Self {
        let column = column.into();

        Predicate::Eq {
            parameter: Parameter {
                name: column.clone(),
                value,
            },
            column,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Predicate::Eq { column, .. } => column,
        }
    }

    pub fn parameter(&self) -> &Parameter {
        match self {
            Predicate::Eq { parameter, .. } => parameter,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq { column, parameter } => write!(f, "{} = :{}", column, parameter.name),
        }
    }
}

/// Immutable select description handed to a [`super::Storage`]
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    predicates: Vec<Predicate>,
    limit: Option<u32>,
}

impl SelectQuery {
    /// Unfiltered `SELECT * FROM <table>`
    pub fn all(table: impl Into<String>) -> Result<Self, DomainError> {
        let table = table.into();
        validate_identifier(&table)?;

        Ok(Self {
            table,
            predicates: Vec::new(),
            limit: None,
        })
    }

    /// `SELECT * FROM <table> WHERE id = :id`
    pub fn by_id(table: impl Into<String>, id: &ModelId) -> Result<Self, DomainError> {
        let mut query = Self::all(table)?;
        query
            .predicates
            .push(Predicate::eq(ID_COLUMN, Value::Text(id.as_str().to_string())));
        Ok(query)
    }

    /// One equality predicate per criteria entry, in criteria order
    pub fn from_criteria(table: impl Into<String>, criteria: &Criteria) -> Result<Self, DomainError> {
        let mut query = Self::all(table)?;

        for (attribute, value) in criteria.iter() {
            validate_identifier(attribute)?;
            query.predicates.push(Predicate::eq(attribute, value.clone()));
        }

        Ok(query)
    }

    /// Caps the result set
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.predicates.iter().map(Predicate::parameter)
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {}", self.table)?;

        for (i, predicate) in self.predicates.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            write!(f, " {} {}", keyword, predicate)?;
        }

        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }

        Ok(())
    }
}

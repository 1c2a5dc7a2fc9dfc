//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::criteria::Criteria;
use crate::domain::model::ID_COLUMN;
use crate::domain::storage::{Predicate, SelectQuery, Storage};
use crate::domain::value::Attributes;
use crate::domain::DomainError;

/// Thread-safe in-memory storage implementation
///
/// Rows are kept per table in insertion order. Useful for testing and
/// development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: RwLock<HashMap<String, Vec<Attributes>>>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage with a table pre-populated with rows
    pub fn with_rows(table: impl Into<String>, rows: Vec<Attributes>) -> Self {
        let storage = Self::new();

        if let Ok(mut tables) = storage.tables.write() {
            tables.insert(table.into(), rows);
        }

        storage
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Result<usize, DomainError> {
        let tables = self.tables.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(tables.get(table).map(Vec::len).unwrap_or(0))
    }

    fn matches(query: &SelectQuery, row: &Attributes) -> bool {
        query.predicates().iter().all(|predicate| match predicate {
            Predicate::Eq { column, parameter } => row.get(column) == Some(&parameter.value),
        })
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn query(&self, query: &SelectQuery) -> Result<Vec<Attributes>, DomainError> {
        let tables = self.tables.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        let limit = query.limit().map(|l| l as usize).unwrap_or(usize::MAX);

        Ok(tables
            .get(query.table())
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::matches(query, row))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, attributes: &Attributes) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        let rows = tables.entry(table.to_string()).or_default();

        if let Some(id) = attributes.get(ID_COLUMN) {
            if rows.iter().any(|row| row.get(ID_COLUMN) == Some(id)) {
                return Err(DomainError::conflict(format!(
                    "Row with id '{}' already exists in '{}'",
                    id, table
                )));
            }
        }

        rows.push(attributes.clone());
        Ok(1)
    }

    async fn update(
        &self,
        table: &str,
        attributes: &Attributes,
        criteria: &Criteria,
    ) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut affected = 0;

        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| criteria.matches(row)) {
                for (name, value) in attributes.iter() {
                    row.set(name, value.clone());
                }
                affected += 1;
            }
        }

        Ok(affected)
    }

    async fn delete(&self, table: &str, criteria: &Criteria) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };

        let before = rows.len();
        rows.retain(|row| !criteria.matches(row));

        Ok((before - rows.len()) as u64)
    }
}

//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::query::SelectQuery;
use crate::domain::criteria::Criteria;
use crate::domain::value::Attributes;
use crate::domain::DomainError;

/// Backing store the repository reads from and writes to
///
/// Rows are flat attribute maps. Mutations return the number of affected rows;
/// whether zero is an error is up to the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync + Debug {
    /// Runs a select, returning rows in store order
    async fn query(&self, query: &SelectQuery) -> Result<Vec<Attributes>, DomainError>;

    /// Inserts one row
    async fn insert(&self, table: &str, attributes: &Attributes) -> Result<u64, DomainError>;

    /// Overwrites the given attributes on every row matching `criteria`
    async fn update(
        &self,
        table: &str,
        attributes: &Attributes,
        criteria: &Criteria,
    ) -> Result<u64, DomainError>;

    /// Deletes every row matching `criteria`
    async fn delete(&self, table: &str, criteria: &Criteria) -> Result<u64, DomainError>;
}

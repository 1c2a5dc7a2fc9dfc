//! Cache trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::model::{Model, ModelId};
use crate::domain::DomainError;

/// Keyed store of fully materialized models
///
/// No eviction, capacity or concurrency policy is implied by the contract;
/// implementations layer those on.
#[async_trait]
pub trait ModelCache<M: Model>: Send + Sync + Debug {
    /// Checks whether a model is cached under `id`
    async fn has(&self, id: &ModelId) -> Result<bool, DomainError>;

    /// Returns the cached model, `None` if absent
    async fn get(&self, id: &ModelId) -> Result<Option<M>, DomainError>;

    /// Inserts or replaces the entry keyed by `model.id()`
    async fn set(&self, model: &M) -> Result<(), DomainError>;

    /// Evicts the entry for `id`; a no-op when absent
    async fn remove(&self, id: &ModelId) -> Result<(), DomainError>;
}

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::model::{Model, ModelId};
use crate::domain::{Criteria, DomainError};

/// Uniform repository contract over a model type
///
/// Absence is reported as `None` or an empty list, never as an error.
#[async_trait]
pub trait Repository<M>: Send + Sync + Debug
where
    M: Model,
{
    /// Looks a model up by identifier
    async fn find(&self, id: &ModelId) -> Result<Option<M>, DomainError>;

    /// First model matching every criterion
    async fn find_one_by(&self, criteria: &Criteria) -> Result<Option<M>, DomainError>;

    /// All models matching every criterion, in store order
    async fn find_by(&self, criteria: &Criteria) -> Result<Vec<M>, DomainError>;

    async fn insert(&self, model: &M) -> Result<(), DomainError>;

    async fn update(&self, model: &M) -> Result<(), DomainError>;

    async fn remove(&self, model: &M) -> Result<(), DomainError>;

    /// All models of this type
    async fn find_all(&self) -> Result<Vec<M>, DomainError> {
        self.find_by(&Criteria::new()).await
    }
}

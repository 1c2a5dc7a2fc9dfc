//! Domain layer - records, criteria and the collaborator contracts

pub mod cache;
pub mod criteria;
pub mod error;
pub mod model;
pub mod observer;
pub mod storage;
pub mod traits;
pub mod user;
pub mod value;

pub use cache::ModelCache;
pub use criteria::Criteria;
pub use error::DomainError;
pub use model::{Column, ColumnKind, Model, ModelId, Schema, UnknownColumns};
pub use observer::{ContextValue, LogContext, LogLevel, NullLogger, RepositoryLogger};
pub use storage::{SelectQuery, Storage};
pub use traits::Repository;
pub use user::User;
pub use value::{Attributes, Value};

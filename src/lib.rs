//! Model Repository
//!
//! A cache-aside repository layer over relational storage:
//! - Reads check an identifier-keyed cache before querying the store
//! - Mutations write through to the cache after the store call succeeds
//! - Every operation emits leveled, structured log events
//! - In-memory and PostgreSQL storage, in-memory (moka) and Redis caches

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{Criteria, DomainError, Model, ModelId, Repository};
pub use infrastructure::repository::CachedRepository;

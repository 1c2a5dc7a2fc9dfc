//! Storage domain - backing store contract and query translation

mod query;
mod repository;

pub use query::{validate_identifier, Parameter, Predicate, SelectQuery};
pub use repository::Storage;

#[cfg(test)]
pub use repository::MockStorage;

#[cfg(test)]
pub use repository::mock;

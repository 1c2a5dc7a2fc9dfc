//! Cache domain - identifier-keyed cache of materialized models

mod repository;

pub use repository::ModelCache;

#[cfg(test)]
pub use repository::mock::MockCache;

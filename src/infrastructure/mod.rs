//! Infrastructure layer - Storage, cache and logging implementations

pub mod cache;
pub mod logging;
pub mod repository;
pub mod storage;

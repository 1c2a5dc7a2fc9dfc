//! Repository infrastructure - cache-aside repository implementation

mod cached;

pub use cached::CachedRepository;

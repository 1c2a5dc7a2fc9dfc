//! Cache infrastructure - Model cache implementations

mod factory;
mod in_memory;
mod redis;

pub use factory::{CacheConfig, CacheFactory, CacheType};
pub use in_memory::{InMemoryCacheConfig, InMemoryModelCache};
pub use self::redis::{RedisCacheConfig, RedisModelCache};

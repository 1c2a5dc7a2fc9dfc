//! In-memory model cache implementation using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::ModelCache;
use crate::domain::model::{Model, ModelId};
use crate::domain::DomainError;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Entries are evicted this long after being written
    pub time_to_live: Option<Duration>,
    /// Time to idle - entries not accessed for this duration are evicted
    pub time_to_idle: Option<Duration>,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            time_to_live: Some(Duration::from_secs(3600)), // 1 hour
            time_to_idle: None,
        }
    }
}

impl InMemoryCacheConfig {
    /// Sets the maximum capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Sets the time-to-live
    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    /// Entries live until evicted by capacity
    pub fn without_time_to_live(mut self) -> Self {
        self.time_to_live = None;
        self
    }

    /// Sets the time-to-idle duration
    pub fn with_time_to_idle(mut self, tti: Duration) -> Self {
        self.time_to_idle = Some(tti);
        self
    }
}

/// Thread-safe in-memory model cache
///
/// Holds materialized models directly, so reads never re-hydrate. Capacity
/// and expiry are enforced by moka.
#[derive(Debug)]
pub struct InMemoryModelCache<M: Model> {
    cache: MokaCache<ModelId, M>,
    config: InMemoryCacheConfig,
}

impl<M: Model> InMemoryModelCache<M> {
    /// Creates a new in-memory cache with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    /// Creates a new in-memory cache with the given configuration
    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let mut builder = MokaCache::builder().max_capacity(config.max_capacity);

        if let Some(ttl) = config.time_to_live {
            builder = builder.time_to_live(ttl);
        }

        if let Some(tti) = config.time_to_idle {
            builder = builder.time_to_idle(tti);
        }

        Self {
            cache: builder.build(),
            config,
        }
    }

    pub fn config(&self) -> &InMemoryCacheConfig {
        &self.config
    }

    /// Number of live entries after pending maintenance has run
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Drops every entry
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl<M: Model> Default for InMemoryModelCache<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: Model> ModelCache<M> for InMemoryModelCache<M> {
    async fn has(&self, id: &ModelId) -> Result<bool, DomainError> {
        Ok(self.cache.contains_key(id))
    }

    async fn get(&self, id: &ModelId) -> Result<Option<M>, DomainError> {
        Ok(self.cache.get(id).await)
    }

    async fn set(&self, model: &M) -> Result<(), DomainError> {
        self.cache.insert(model.id().clone(), model.clone()).await;
        Ok(())
    }

    async fn remove(&self, id: &ModelId) -> Result<(), DomainError> {
        self.cache.invalidate(id).await;
        Ok(())
    }
}

//! Redis model cache implementation

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::cache::ModelCache;
use crate::domain::model::{Model, ModelId};
use crate::domain::value::Attributes;
use crate::domain::DomainError;

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// TTL applied to every entry
    pub default_ttl: Duration,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            default_ttl: Duration::from_secs(3600),
            key_prefix: None,
        }
    }
}

impl RedisCacheConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Key under which a model is stored: `[prefix:]model:id`
    pub fn entry_key(&self, model: &str, id: &ModelId) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}:{}", prefix, model, id),
            None => format!("{}:{}", model, id),
        }
    }
}

/// Redis model cache
///
/// Stores the model's persistence map as JSON and re-materializes it through
/// [`Model::from_persistence`] on read, so a stale or corrupt entry surfaces as
/// a materialization error instead of a bogus model.
pub struct RedisModelCache<M: Model> {
    connection: ConnectionManager,
    config: RedisCacheConfig,
    _phantom: PhantomData<M>,
}

impl<M: Model> fmt::Debug for RedisModelCache<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisModelCache")
            .field("model", &M::NAME)
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl<M: Model> RedisModelCache<M> {
    /// Creates a new Redis cache connection
    pub async fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            connection,
            config,
            _phantom: PhantomData,
        })
    }

    fn key(&self, id: &ModelId) -> String {
        self.config.entry_key(M::NAME, id)
    }
}

#[async_trait]
impl<M: Model> ModelCache<M> for RedisModelCache<M> {
    async fn has(&self, id: &ModelId) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let exists: bool = conn.exists(self.key(id)).await.map_err(|e| {
            DomainError::cache(format!("Failed to check existence of '{}': {}", id, e))
        })?;

        Ok(exists)
    }

    async fn get(&self, id: &ModelId) -> Result<Option<M>, DomainError> {
        let mut conn = self.connection.clone();

        let data: Option<String> = conn
            .get(self.key(id))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get '{}': {}", id, e)))?;

        match data {
            Some(json) => {
                let row: Attributes = serde_json::from_str(&json).map_err(|e| {
                    DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                })?;
                Ok(Some(M::from_persistence(&row)?))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, model: &M) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let json = serde_json::to_string(&model.to_persistence()).map_err(|e| {
            DomainError::cache(format!("Failed to serialize cache value: {}", e))
        })?;
        let ttl_secs = self.config.default_ttl.as_secs().max(1);

        let _: () = conn
            .set_ex(self.key(model.id()), json, ttl_secs)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set '{}': {}", model.id(), e)))?;

        Ok(())
    }

    async fn remove(&self, id: &ModelId) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: i64 = conn
            .del(self.key(id))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to delete '{}': {}", id, e)))?;

        Ok(())
    }
}

//! Storage factory for runtime storage selection

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::model::Model;
use crate::domain::storage::Storage;
use crate::domain::DomainError;

use super::in_memory::InMemoryStorage;
use super::postgres::{PostgresConfig, PostgresStorage};

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    #[default]
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl std::str::FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(DomainError::configuration(format!(
                "Unknown storage type: {}. Valid types: memory, postgres",
                s
            ))),
        }
    }
}

impl TryFrom<String> for StorageType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageType::InMemory => write!(f, "memory"),
            StorageType::Postgres => write!(f, "postgres"),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend to create
    #[serde(rename = "backend")]
    pub storage_type: StorageType,
    /// Database URL (required for PostgreSQL)
    pub url: Option<String>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Minimum number of pooled connections
    pub min_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let postgres = PostgresConfig::default();

        Self {
            storage_type: StorageType::InMemory,
            url: None,
            max_connections: postgres.max_connections,
            min_connections: postgres.min_connections,
        }
    }
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a PostgreSQL configuration from a URL
    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self {
            storage_type: StorageType::Postgres,
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        self.storage_type.clone()
    }

    /// Pool configuration for the PostgreSQL backend
    pub fn postgres_config(&self) -> Result<PostgresConfig, DomainError> {
        let url = self.url.clone().ok_or_else(|| {
            DomainError::configuration("Database URL is required for PostgreSQL storage")
        })?;

        Ok(PostgresConfig::new(url)
            .with_max_connections(self.max_connections)
            .with_min_connections(self.min_connections))
    }
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a storage instance based on the configuration
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn Storage>, DomainError> {
        match config.storage_type {
            StorageType::InMemory => Ok(Arc::new(InMemoryStorage::new())),
            StorageType::Postgres => {
                let storage = PostgresStorage::connect(&config.postgres_config()?).await?;
                Ok(Arc::new(storage))
            }
        }
    }

    /// Creates a storage instance holding `table` for model `M`
    ///
    /// The PostgreSQL backend creates the table from the model schema when it
    /// is missing.
    pub async fn create_for<M: Model>(
        config: &StorageConfig,
        table: &str,
    ) -> Result<Arc<dyn Storage>, DomainError> {
        match config.storage_type {
            StorageType::InMemory => Ok(Arc::new(InMemoryStorage::new())),
            StorageType::Postgres => {
                let storage = Self::create_postgres(&config.postgres_config()?).await?;
                storage.ensure_table(table, M::schema()).await?;
                Ok(storage)
            }
        }
    }

    /// Creates a PostgreSQL storage
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> Result<Arc<PostgresStorage>, DomainError> {
        Ok(Arc::new(PostgresStorage::connect(config).await?))
    }
}

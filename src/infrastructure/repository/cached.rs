//! Cache-aside repository over a storage backend

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::cache::ModelCache;
use crate::domain::criteria::Criteria;
use crate::domain::model::{Model, ModelId};
use crate::domain::observer::{LogContext, NullLogger, RepositoryLogger};
use crate::domain::storage::{SelectQuery, Storage};
use crate::domain::traits::Repository;
use crate::domain::value::Attributes;
use crate::domain::DomainError;

const FIND_BY_ID: &str = "find model {model} with id {id}";
const NOT_FOUND_BY_ID: &str = "model {model} with id {id} not found";
const FIND_BY_CRITERIA: &str = "find model {model} with criteria {criteria}";
const NOT_FOUND_BY_CRITERIA: &str = "model {model} with criteria {criteria} not found";
const INSERT: &str = "insert model {model} with id {id}";
const UPDATE: &str = "update model {model} with id {id}";
const REMOVE: &str = "remove model {model} with id {id}";

/// Repository reading through an identifier-keyed cache and writing through it
///
/// - `find` serves from the cache when possible and populates it on a store hit
/// - `find_one_by` always queries the store, capped to one row, and caches the hit
/// - `find_by` never touches the cache
/// - `insert` and `update` refresh the cache after the store call succeeds
/// - `remove` evicts unconditionally after the store call succeeds
///
/// Storage, cache and logger are shared collaborators; the repository holds
/// nothing else but the table name.
pub struct CachedRepository<M: Model> {
    storage: Arc<dyn Storage>,
    cache: Arc<dyn ModelCache<M>>,
    logger: Arc<dyn RepositoryLogger>,
    table: String,
}

impl<M: Model> fmt::Debug for CachedRepository<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedRepository")
            .field("model", &M::NAME)
            .field("table", &self.table)
            .field("storage", &self.storage)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<M: Model> CachedRepository<M> {
    /// Creates a repository for `table` that discards log events
    pub fn new(
        storage: Arc<dyn Storage>,
        cache: Arc<dyn ModelCache<M>>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            cache,
            logger: Arc::new(NullLogger),
            table: table.into(),
        }
    }

    /// Sets the observer receiving repository events
    pub fn with_logger(mut self, logger: Arc<dyn RepositoryLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn id_context(id: &ModelId) -> LogContext {
        LogContext::new()
            .with("model", M::NAME)
            .with("id", id.as_str())
    }

    fn criteria_context(criteria: &Criteria) -> LogContext {
        LogContext::new()
            .with("model", M::NAME)
            .with("criteria", criteria.clone())
    }

    fn materialize(rows: &[Attributes]) -> Result<Vec<M>, DomainError> {
        rows.iter().map(M::from_persistence).collect()
    }

    /// Materializes and caches the first row returned by `query`
    async fn query_first(&self, query: SelectQuery) -> Result<Option<M>, DomainError> {
        let rows = self.storage.query(&query).await?;

        match rows.first() {
            Some(row) => {
                let model = M::from_persistence(row)?;
                self.cache.set(&model).await?;
                Ok(Some(model))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<M: Model> Repository<M> for CachedRepository<M> {
    async fn find(&self, id: &ModelId) -> Result<Option<M>, DomainError> {
        let context = Self::id_context(id);
        self.logger.info(FIND_BY_ID, &context);

        if self.cache.has(id).await? {
            // An entry may expire between `has` and `get`; fall back to the store
            if let Some(model) = self.cache.get(id).await? {
                return Ok(Some(model));
            }
        }

        let found = self
            .query_first(SelectQuery::by_id(self.table.as_str(), id)?)
            .await?;

        if found.is_none() {
            self.logger.warning(NOT_FOUND_BY_ID, &context);
        }

        Ok(found)
    }

    async fn find_one_by(&self, criteria: &Criteria) -> Result<Option<M>, DomainError> {
        let context = Self::criteria_context(criteria);
        self.logger.info(FIND_BY_CRITERIA, &context);

        let query = SelectQuery::from_criteria(self.table.as_str(), criteria)?.with_limit(1);
        let found = self.query_first(query).await?;

        if found.is_none() {
            self.logger.warning(NOT_FOUND_BY_CRITERIA, &context);
        }

        Ok(found)
    }

    async fn find_by(&self, criteria: &Criteria) -> Result<Vec<M>, DomainError> {
        self.logger
            .info(FIND_BY_CRITERIA, &Self::criteria_context(criteria));

        let query = SelectQuery::from_criteria(self.table.as_str(), criteria)?;
        let rows = self.storage.query(&query).await?;

        Self::materialize(&rows)
    }

    async fn insert(&self, model: &M) -> Result<(), DomainError> {
        self.logger.info(INSERT, &Self::id_context(model.id()));

        self.storage
            .insert(&self.table, &model.to_persistence())
            .await?;
        self.cache.set(model).await
    }

    async fn update(&self, model: &M) -> Result<(), DomainError> {
        self.logger.info(UPDATE, &Self::id_context(model.id()));

        self.storage
            .update(&self.table, &model.to_persistence(), &model.id_criteria())
            .await?;
        self.cache.set(model).await
    }

    async fn remove(&self, model: &M) -> Result<(), DomainError> {
        self.logger.info(REMOVE, &Self::id_context(model.id()));

        self.storage
            .delete(&self.table, &model.id_criteria())
            .await?;
        self.cache.remove(model.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::observer::{ContextValue, LogLevel, RecordingLogger};
    use crate::domain::storage::mock::{RecordingStorage, StorageCall};
    use crate::domain::storage::MockStorage;
    use crate::domain::user::{User, USERS_TABLE};
    use crate::domain::value::Value;
    use crate::infrastructure::cache::InMemoryModelCache;
    use crate::infrastructure::storage::InMemoryStorage;

    struct Fixture {
        storage: Arc<RecordingStorage>,
        cache: Arc<MockCache<User>>,
        logger: Arc<RecordingLogger>,
        repository: CachedRepository<User>,
    }

    fn fixture(storage: RecordingStorage, cache: MockCache<User>) -> Fixture {
        let storage = Arc::new(storage);
        let cache = Arc::new(cache);
        let logger = Arc::new(RecordingLogger::new());

        let repository = CachedRepository::new(storage.clone(), cache.clone(), USERS_TABLE)
            .with_logger(logger.clone());

        Fixture {
            storage,
            cache,
            logger,
            repository,
        }
    }

    fn id(value: &str) -> ModelId {
        ModelId::new(value).unwrap()
    }

    fn user1() -> User {
        User::new(id("id1"), "user1", "password")
    }

    fn user1_row() -> Attributes {
        Attributes::new()
            .with("id", "id1")
            .with("username", "user1")
            .with("password", "password")
            .with("active", true)
    }

    fn user2_row() -> Attributes {
        Attributes::new()
            .with("id", "id2")
            .with("username", "user2")
            .with("password", "password")
            .with("active", false)
    }

    #[tokio::test]
    async fn test_find_not_found() {
        let f = fixture(RecordingStorage::new().with_result(vec![]), MockCache::new());

        let found = f.repository.find(&id("id1")).await.unwrap();
        assert!(found.is_none());

        let records = f.logger.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(records[0].message, "find model {model} with id {id}");
        assert_eq!(records[1].level, LogLevel::Warning);
        assert_eq!(records[1].message, "model {model} with id {id} not found");

        for record in &records {
            assert_eq!(record.context.get("model"), Some(&ContextValue::from("User")));
            assert_eq!(record.context.get("id"), Some(&ContextValue::from("id1")));
        }

        assert_eq!(f.cache.len(), 0);
    }

    #[tokio::test]
    async fn test_find_issues_query_by_id() {
        let f = fixture(RecordingStorage::new().with_result(vec![]), MockCache::new());

        f.repository.find(&id("id1")).await.unwrap();

        let calls = f.storage.calls();
        assert_eq!(calls.len(), 1);

        let StorageCall::Query(query) = &calls[0] else {
            panic!("expected a query, got {:?}", calls[0]);
        };
        assert_eq!(query.table(), "users");
        assert_eq!(query.to_string(), "SELECT * FROM users WHERE id = :id");
        assert_eq!(query.limit(), None);

        let params: Vec<_> = query.parameters().collect();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "id");
        assert_eq!(params[0].value, Value::from("id1"));
    }

    #[tokio::test]
    async fn test_find_found_in_store_populates_cache() {
        let f = fixture(
            RecordingStorage::new().with_result(vec![user1_row()]),
            MockCache::new(),
        );

        let found = f.repository.find(&id("id1")).await.unwrap();
        assert_eq!(found, Some(user1()));

        assert_eq!(f.storage.calls().len(), 1);
        assert_eq!(f.cache.entries().get(&id("id1")), Some(&user1()));

        let records = f.logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Info);
    }

    #[tokio::test]
    async fn test_find_found_in_cache_skips_store() {
        let mut storage = MockStorage::new();
        storage.expect_query().times(0);

        let cache = Arc::new(MockCache::new().with_entry(user1()));
        let logger = Arc::new(RecordingLogger::new());
        let repository = CachedRepository::new(Arc::new(storage), cache.clone(), USERS_TABLE)
            .with_logger(logger.clone());

        let found = repository.find(&id("id1")).await.unwrap();
        assert_eq!(found, Some(user1()));
        assert_eq!(cache.get_count(), 1);

        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "find model {model} with id {id}");
    }

    #[tokio::test]
    async fn test_find_materialization_failure_not_cached() {
        let row = Attributes::new().with("id", "id1").with("username", "user1");
        let f = fixture(RecordingStorage::new().with_result(vec![row]), MockCache::new());

        let result = f.repository.find(&id("id1")).await;
        assert!(matches!(result, Err(DomainError::Materialization { .. })));
        assert_eq!(f.cache.len(), 0);
    }

    #[tokio::test]
    async fn test_find_one_by_materialization_failure_not_cached() {
        let row = Attributes::new()
            .with("id", "id1")
            .with("username", "user1")
            .with("password", "password")
            .with("active", "yes");
        let f = fixture(RecordingStorage::new().with_result(vec![row]), MockCache::new());
        let criteria = Criteria::new().eq("username", "user1");

        let result = f.repository.find_one_by(&criteria).await;
        assert!(matches!(result, Err(DomainError::Materialization { .. })));
        assert_eq!(f.cache.len(), 0);
    }

    #[tokio::test]
    async fn test_find_by_materialization_failure_propagates() {
        let broken = Attributes::new().with("id", "id2").with("username", "user2");
        let f = fixture(
            RecordingStorage::new().with_result(vec![user1_row(), broken]),
            MockCache::new(),
        );

        let result = f.repository.find_by(&Criteria::new()).await;
        assert!(matches!(result, Err(DomainError::Materialization { .. })));
        assert_eq!(f.cache.len(), 0);
    }

    #[tokio::test]
    async fn test_find_store_failure_propagates() {
        let mut storage = MockStorage::new();
        storage
            .expect_query()
            .times(1)
            .returning(|_| Err(DomainError::storage("connection reset")));

        let cache = Arc::new(MockCache::<User>::new());
        let repository = CachedRepository::new(Arc::new(storage), cache.clone(), USERS_TABLE);

        let result = repository.find(&id("id1")).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_find_cache_failure_propagates() {
        let f = fixture(RecordingStorage::new(), MockCache::new().with_error("unreachable"));

        let result = f.repository.find(&id("id1")).await;
        assert!(matches!(result, Err(DomainError::Cache { .. })));
        assert!(f.storage.calls().is_empty());
    }

    #[tokio::test]
    async fn test_find_one_by_not_found() {
        let f = fixture(RecordingStorage::new().with_result(vec![]), MockCache::new());
        let criteria = Criteria::new().eq("username", "user1").eq("active", true);

        let found = f.repository.find_one_by(&criteria).await.unwrap();
        assert!(found.is_none());

        let records = f.logger.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(records[0].message, "find model {model} with criteria {criteria}");
        assert_eq!(records[1].level, LogLevel::Warning);
        assert_eq!(
            records[1].message,
            "model {model} with criteria {criteria} not found"
        );
        assert_eq!(
            records[1].context.get("criteria"),
            Some(&ContextValue::Criteria(criteria.clone()))
        );
        assert_eq!(f.cache.len(), 0);
    }

    #[tokio::test]
    async fn test_find_one_by_limits_and_caches_first_row() {
        let f = fixture(
            RecordingStorage::new().with_result(vec![user1_row(), user2_row()]),
            MockCache::new(),
        );
        let criteria = Criteria::new().eq("username", "user1").eq("active", true);

        let found = f.repository.find_one_by(&criteria).await.unwrap();
        assert_eq!(found, Some(user1()));

        let calls = f.storage.calls();
        let StorageCall::Query(query) = &calls[0] else {
            panic!("expected a query, got {:?}", calls[0]);
        };
        assert_eq!(query.limit(), Some(1));
        assert_eq!(
            query.to_string(),
            "SELECT * FROM users WHERE username = :username AND active = :active LIMIT 1"
        );

        assert_eq!(f.cache.len(), 1);
        assert_eq!(f.cache.entries().get(&id("id1")), Some(&user1()));
        assert_eq!(f.logger.records().len(), 1);
    }

    #[tokio::test]
    async fn test_find_one_by_bypasses_cache_lookup() {
        let f = fixture(
            RecordingStorage::new().with_result(vec![user1_row()]),
            MockCache::new().with_entry(user1()),
        );
        let criteria = Criteria::new().eq("id", "id1");

        f.repository.find_one_by(&criteria).await.unwrap();

        assert_eq!(f.cache.get_count(), 0);
        assert_eq!(f.storage.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_attribute_name_skips_store() {
        let f = fixture(RecordingStorage::new(), MockCache::new());
        let criteria = Criteria::new().eq("name; DROP TABLE users", "x");

        let result = f.repository.find_by(&criteria).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(f.storage.calls().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_empty_result() {
        let f = fixture(RecordingStorage::new().with_result(vec![]), MockCache::new());
        let criteria = Criteria::new().eq("username", "nobody");

        let found = f.repository.find_by(&criteria).await.unwrap();
        assert!(found.is_empty());

        let records = f.logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(f.cache.len(), 0);
    }

    #[tokio::test]
    async fn test_find_by_keeps_order_without_caching() {
        let f = fixture(
            RecordingStorage::new().with_result(vec![user2_row(), user1_row()]),
            MockCache::new(),
        );

        let found = f.repository.find_by(&Criteria::new()).await.unwrap();
        let ids: Vec<_> = found.iter().map(|u| u.id().as_str().to_string()).collect();
        assert_eq!(ids, vec!["id2", "id1"]);

        let calls = f.storage.calls();
        let StorageCall::Query(query) = &calls[0] else {
            panic!("expected a query, got {:?}", calls[0]);
        };
        assert_eq!(query.limit(), None);
        assert!(query.predicates().is_empty());

        assert_eq!(f.cache.len(), 0);
    }

    #[tokio::test]
    async fn test_insert_writes_through() {
        let f = fixture(RecordingStorage::new(), MockCache::new());

        f.repository.insert(&user1()).await.unwrap();

        assert_eq!(
            f.storage.calls(),
            vec![StorageCall::Insert {
                table: "users".to_string(),
                attributes: user1_row(),
            }]
        );
        assert_eq!(f.cache.len(), 1);
        assert_eq!(f.cache.entries().get(&id("id1")), Some(&user1()));

        let records = f.logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "insert model {model} with id {id}");
        assert_eq!(records[0].context.get("id"), Some(&ContextValue::from("id1")));
    }

    #[tokio::test]
    async fn test_insert_failure_leaves_cache_untouched() {
        let f = fixture(
            RecordingStorage::new().with_error("duplicate key"),
            MockCache::new(),
        );

        let result = f.repository.insert(&user1()).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
        assert_eq!(f.cache.len(), 0);

        let records = f.logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Info);
    }

    #[tokio::test]
    async fn test_update_refreshes_cache() {
        let stale = user1();
        let f = fixture(RecordingStorage::new(), MockCache::new().with_entry(stale));

        let mut user = user1();
        user.set_username("renamed");
        f.repository.update(&user).await.unwrap();

        assert_eq!(
            f.storage.calls(),
            vec![StorageCall::Update {
                table: "users".to_string(),
                attributes: user.to_persistence(),
                criteria: Criteria::new().eq("id", "id1"),
            }]
        );
        assert_eq!(f.cache.entries().get(&id("id1")), Some(&user));
        assert_eq!(f.logger.records()[0].message, "update model {model} with id {id}");
    }

    #[tokio::test]
    async fn test_update_failure_keeps_previous_entry() {
        let f = fixture(
            RecordingStorage::new().with_error("connection refused"),
            MockCache::new().with_entry(user1()),
        );

        let mut user = user1();
        user.set_username("renamed");

        assert!(f.repository.update(&user).await.is_err());
        assert_eq!(f.cache.entries().get(&id("id1")), Some(&user1()));
    }

    #[tokio::test]
    async fn test_remove_evicts() {
        let f = fixture(RecordingStorage::new(), MockCache::new().with_entry(user1()));

        f.repository.remove(&user1()).await.unwrap();

        assert_eq!(
            f.storage.calls(),
            vec![StorageCall::Delete {
                table: "users".to_string(),
                criteria: Criteria::new().eq("id", "id1"),
            }]
        );
        assert_eq!(f.cache.len(), 0);
        assert_eq!(f.logger.records()[0].message, "remove model {model} with id {id}");
    }

    #[tokio::test]
    async fn test_remove_uncached_and_zero_rows_is_ok() {
        let f = fixture(RecordingStorage::new().with_affected(0), MockCache::new());

        f.repository.remove(&user1()).await.unwrap();
        f.repository.remove(&user1()).await.unwrap();

        assert_eq!(f.storage.calls().len(), 2);
        assert_eq!(f.cache.len(), 0);
    }

    #[tokio::test]
    async fn test_remove_failure_keeps_entry() {
        let f = fixture(
            RecordingStorage::new().with_error("connection refused"),
            MockCache::new().with_entry(user1()),
        );

        assert!(f.repository.remove(&user1()).await.is_err());
        assert_eq!(f.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_then_find_served_from_cache() {
        let storage = Arc::new(InMemoryStorage::new());
        let cache = Arc::new(InMemoryModelCache::<User>::new());
        let repository = CachedRepository::new(storage.clone(), cache.clone(), USERS_TABLE);

        repository.insert(&user1()).await.unwrap();
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&id("id1")).await.unwrap(), Some(user1()));

        // Deleting behind the repository's back proves the read is served by the cache
        storage
            .delete(USERS_TABLE, &Criteria::new().eq("id", "id1"))
            .await
            .unwrap();

        assert_eq!(repository.find(&id("id1")).await.unwrap(), Some(user1()));
    }

    #[tokio::test]
    async fn test_end_to_end_in_memory() {
        let storage = Arc::new(InMemoryStorage::new());
        let cache = Arc::new(InMemoryModelCache::<User>::new());
        let repository = CachedRepository::new(storage.clone(), cache.clone(), USERS_TABLE);

        let user2 = User::new(id("id2"), "user2", "password").with_active(false);
        repository.insert(&user1()).await.unwrap();
        repository.insert(&user2).await.unwrap();
        cache.clear().await;

        let active = repository
            .find_by(&Criteria::new().eq("active", true))
            .await
            .unwrap();
        assert_eq!(active, vec![user1()]);
        assert_eq!(cache.len().await, 0);

        let found = repository
            .find_one_by(&Criteria::new().eq("username", "user2"))
            .await
            .unwrap();
        assert_eq!(found, Some(user2.clone()));
        assert!(cache.has(&id("id2")).await.unwrap());

        let mut renamed = user2.clone();
        renamed.set_username("renamed");
        repository.update(&renamed).await.unwrap();
        assert_eq!(repository.find(&id("id2")).await.unwrap(), Some(renamed.clone()));

        repository.remove(&renamed).await.unwrap();
        assert!(repository.find(&id("id2")).await.unwrap().is_none());
        assert_eq!(repository.find_all().await.unwrap(), vec![user1()]);
    }
}

//! PostgreSQL storage implementation with connection pooling

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row, TypeInfo};

use crate::domain::criteria::Criteria;
use crate::domain::model::{Schema, ID_COLUMN};
use crate::domain::storage::{validate_identifier, Predicate, SelectQuery, Storage};
use crate::domain::value::{Attributes, Value};
use crate::domain::DomainError;

/// PostgreSQL storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/model_repository".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

fn quote_identifier(name: &str) -> Result<String, DomainError> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name))
}

/// Accumulates positional parameters while rendering a statement
///
/// `NULL` is rendered inline rather than bound, since a bound parameter
/// carries a concrete type that Postgres would refuse for non-text columns.
#[derive(Debug, Default)]
struct Statement<'a> {
    sql: String,
    params: Vec<&'a Value>,
}

impl<'a> Statement<'a> {
    fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    fn placeholder(&mut self, value: &'a Value) -> String {
        if value.is_null() {
            return "NULL".to_string();
        }

        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn condition(&mut self, column: &str, value: &'a Value) -> Result<String, DomainError> {
        let column = quote_identifier(column)?;

        if value.is_null() {
            return Ok(format!("{} IS NULL", column));
        }

        let placeholder = self.placeholder(value);
        Ok(format!("{} = {}", column, placeholder))
    }

    fn push_where(
        &mut self,
        conditions: impl Iterator<Item = (&'a str, &'a Value)>,
    ) -> Result<(), DomainError> {
        for (i, (column, value)) in conditions.enumerate() {
            let keyword = if i == 0 { " WHERE " } else { " AND " };
            let condition = self.condition(column, value)?;
            self.sql.push_str(keyword);
            self.sql.push_str(&condition);
        }

        Ok(())
    }

    fn build(&self) -> Query<'_, Postgres, PgArguments> {
        self.params
            .iter()
            .fold(sqlx::query(&self.sql), |query, value| bind_value(query, value))
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Boolean(b) => query.bind(*b),
        Value::Integer(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.as_str()),
    }
}

fn render_select(query: &SelectQuery) -> Result<Statement<'_>, DomainError> {
    let mut statement = Statement::new(format!(
        "SELECT * FROM {}",
        quote_identifier(query.table())?
    ));

    statement.push_where(query.predicates().iter().map(|predicate| match predicate {
        Predicate::Eq { column, parameter } => (column.as_str(), &parameter.value),
    }))?;

    if let Some(limit) = query.limit() {
        statement.sql.push_str(&format!(" LIMIT {}", limit));
    }

    Ok(statement)
}

fn render_insert<'a>(table: &str, attributes: &'a Attributes) -> Result<Statement<'a>, DomainError> {
    if attributes.is_empty() {
        return Err(DomainError::validation("Cannot insert a row without attributes"));
    }

    let mut statement = Statement::default();
    let mut columns = Vec::with_capacity(attributes.len());
    let mut placeholders = Vec::with_capacity(attributes.len());

    for (name, value) in attributes.iter() {
        columns.push(quote_identifier(name)?);
        placeholders.push(statement.placeholder(value));
    }

    statement.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table)?,
        columns.join(", "),
        placeholders.join(", ")
    );

    Ok(statement)
}

fn render_update<'a>(
    table: &str,
    attributes: &'a Attributes,
    criteria: &'a Criteria,
) -> Result<Statement<'a>, DomainError> {
    if attributes.is_empty() {
        return Err(DomainError::validation("Cannot update a row without attributes"));
    }

    if criteria.is_empty() {
        return Err(DomainError::validation("Refusing to update without criteria"));
    }

    let mut statement = Statement::default();
    let mut assignments = Vec::with_capacity(attributes.len());

    for (name, value) in attributes.iter() {
        let column = quote_identifier(name)?;
        assignments.push(format!("{} = {}", column, statement.placeholder(value)));
    }

    statement.sql = format!(
        "UPDATE {} SET {}",
        quote_identifier(table)?,
        assignments.join(", ")
    );
    statement.push_where(criteria.iter())?;

    Ok(statement)
}

fn render_delete<'a>(table: &str, criteria: &'a Criteria) -> Result<Statement<'a>, DomainError> {
    if criteria.is_empty() {
        return Err(DomainError::validation("Refusing to delete without criteria"));
    }

    let mut statement = Statement::new(format!("DELETE FROM {}", quote_identifier(table)?));
    statement.push_where(criteria.iter())?;

    Ok(statement)
}

fn row_to_attributes(row: &PgRow) -> Result<Attributes, DomainError> {
    let mut attributes = Attributes::new();

    for column in row.columns() {
        let index = column.ordinal();
        let type_name = column.type_info().name();

        let value = match type_name {
            "BOOL" => row.try_get::<Option<bool>, _>(index).map(Value::from),
            "INT2" => row
                .try_get::<Option<i16>, _>(index)
                .map(|v| Value::from(v.map(i64::from))),
            "INT4" => row
                .try_get::<Option<i32>, _>(index)
                .map(|v| Value::from(v.map(i64::from))),
            "INT8" => row.try_get::<Option<i64>, _>(index).map(Value::from),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(index)
                .map(|v| Value::from(v.map(f64::from))),
            "FLOAT8" => row.try_get::<Option<f64>, _>(index).map(Value::from),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                row.try_get::<Option<String>, _>(index).map(Value::from)
            }
            "UUID" => row
                .try_get::<Option<uuid::Uuid>, _>(index)
                .map(|v| Value::from(v.map(|uuid| uuid.to_string()))),
            other => {
                return Err(DomainError::storage(format!(
                    "Unsupported type {} for column '{}'",
                    other,
                    column.name()
                )));
            }
        }
        .map_err(|e| {
            DomainError::storage(format!("Failed to decode column '{}': {}", column.name(), e))
        })?;

        attributes.set(column.name(), value);
    }

    Ok(attributes)
}

fn map_write_error(table: &str, e: sqlx::Error) -> DomainError {
    let msg = e.to_string();

    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        DomainError::conflict(format!("Duplicate row in '{}': {}", table, msg))
    } else {
        DomainError::storage(format!("Failed to write to '{}': {}", table, msg))
    }
}

/// PostgreSQL storage over plain tables
///
/// Each model attribute maps to one column. Statements are rendered with
/// quoted identifiers and positional parameters.
#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl Debug for PostgresStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStorage")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl PostgresStorage {
    /// Creates a new PostgreSQL storage with the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new PostgreSQL storage with connection pooling
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates `table` with one column per schema column if it does not exist
    pub async fn ensure_table(&self, table: &str, schema: &Schema) -> Result<(), DomainError> {
        let mut columns = Vec::with_capacity(schema.columns().len());

        for column in schema.columns() {
            let mut definition = format!(
                "{} {}",
                quote_identifier(column.name)?,
                column.kind.sql_type()
            );

            if column.name == ID_COLUMN {
                definition.push_str(" PRIMARY KEY");
            } else if !column.nullable {
                definition.push_str(" NOT NULL");
            }

            columns.push(definition);
        }

        let query = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_identifier(table)?,
            columns.join(", ")
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn query(&self, query: &SelectQuery) -> Result<Vec<Attributes>, DomainError> {
        let statement = render_select(query)?;

        let rows = statement
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to query '{}': {}", query.table(), e)))?;

        rows.iter().map(row_to_attributes).collect()
    }

    async fn insert(&self, table: &str, attributes: &Attributes) -> Result<u64, DomainError> {
        let statement = render_insert(table, attributes)?;

        let result = statement
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(table, e))?;

        Ok(result.rows_affected())
    }

    async fn update(
        &self,
        table: &str,
        attributes: &Attributes,
        criteria: &Criteria,
    ) -> Result<u64, DomainError> {
        let statement = render_update(table, attributes, criteria)?;

        let result = statement
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(table, e))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, table: &str, criteria: &Criteria) -> Result<u64, DomainError> {
        let statement = render_delete(table, criteria)?;

        let result = statement
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete from '{}': {}", table, e)))?;

        Ok(result.rows_affected())
    }
}

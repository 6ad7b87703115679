//! Record store abstraction
//!
//! The dashboard reads and writes rows through a generic query capability:
//! select with an optional equality filter, ordering and limit; insert one
//! row; update or delete one row by key. Rows travel as JSON objects whose
//! keys are the store's column names.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::{Config, StoreBackend};

pub mod memory;
pub mod postgres;
pub mod rest;

pub use memory::{MemoryStore, TableSpec};
pub use postgres::PostgresStore;
pub use rest::RestStore;

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store responded with status {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("row must be a JSON object")]
    NotAnObject,

    #[error("duplicate key: {0}")]
    Conflict(String),

    #[error("store is not configured: {0}")]
    NotConfigured(&'static str),
}

/// Sort direction and column of a select
///
/// The column may be a JSON path of the form `column->key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    /// Column and optional JSON key of the ordering path
    pub fn path(&self) -> (&str, Option<&str>) {
        match self.column.split_once("->") {
            Some((column, key)) => (column, Some(key)),
            None => (self.column.as_str(), None),
        }
    }
}

/// Read query: equality filter, ordering, limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<(String, String)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows whose `column` equals `value` (compared as text)
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some((column.into(), value.into()));
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Generic record store capability
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch rows of `table` matching the query
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Insert one row
    async fn insert(&self, table: &str, row: Value) -> Result<(), StoreError>;

    /// Overwrite the given columns of the row whose `key_column` equals `key`
    ///
    /// Updating a key that does not exist is not an error.
    async fn update(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        row: Value,
    ) -> Result<(), StoreError>;

    /// Delete the row whose `key_column` equals `key`; absent keys are not an error
    async fn delete(&self, table: &str, key_column: &str, key: &str) -> Result<(), StoreError>;

    /// Connectivity probe
    async fn ping(&self) -> Result<(), StoreError>;

    /// Adapter name, for health reporting
    fn backend(&self) -> &'static str;
}

/// Table and column names must be plain lowercase identifiers
pub fn validate_identifier(name: &str) -> Result<&str, StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Text form of a column value, as used by equality filters
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Ordering of column values: nulls first, then numbers, text, other JSON
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}

/// Value of an ordering path within a row
pub fn path_value<'a>(row: &'a Value, order: &Order) -> &'a Value {
    let (column, key) = order.path();
    let value = row.get(column).unwrap_or(&Value::Null);
    match key {
        Some(key) => value.get(key).unwrap_or(&Value::Null),
        None => value,
    }
}

/// Build the record store selected by the configuration
pub async fn connect(config: &Config) -> Result<Arc<dyn RecordStore>, StoreError> {
    let store: Arc<dyn RecordStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory record store; data is lost on restart");
            Arc::new(MemoryStore::for_dashboard())
        }
        StoreBackend::Postgres => {
            let store = PostgresStore::connect(&config.store).await?;
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                store.run_migrations().await?;
                tracing::info!("Migrations completed");
            }
            Arc::new(store)
        }
        StoreBackend::Rest => Arc::new(RestStore::new(&config.store)?),
    };
    Ok(store)
}

//! In-memory record store for development and tests

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::costs::sum_optional_components;

use super::{compare_values, path_value, value_text, Query, RecordStore, StoreError};

/// Columns the store fills in itself for one table
#[derive(Debug, Clone, Default)]
pub struct TableSpec {
    /// Primary key column; must be unique
    pub key: Option<&'static str>,
    /// Key generated as a UUID when absent
    pub generated_id: bool,
    /// Fill `created_at` on insert
    pub timestamps: bool,
    /// Column kept equal to the sum of other columns
    pub total: Option<(&'static str, &'static [&'static str])>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    specs: HashMap<String, TableSpec>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store knowing the generated columns of the dashboard tables
    pub fn for_dashboard() -> Self {
        crate::records::resources::table_specs()
            .into_iter()
            .fold(Self::new(), |store, (table, spec)| store.with_table(table, spec))
    }

    pub fn with_table(mut self, table: &str, spec: TableSpec) -> Self {
        self.specs.insert(table.to_string(), spec);
        self
    }

    /// Insert rows as-is, bypassing generated columns
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().extend(rows);
    }

    fn apply_generated(&self, table: &str, row: &mut serde_json::Map<String, Value>) {
        let Some(spec) = self.specs.get(table) else {
            return;
        };
        if let Some((column, parts)) = spec.total {
            let total = sum_optional_components(
                parts.iter().map(|p| row.get(*p).and_then(Value::as_f64)),
            );
            row.insert(column.to_string(), json!(total));
        }
    }
}

fn key_matches(row: &Value, key_column: &str, key: &str) -> bool {
    row.get(key_column).map(value_text).as_deref() == Some(key)
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| match &query.filter {
                        Some((column, value)) => key_matches(row, column, value),
                        None => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(path_value(a, order), path_value(b, order));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), StoreError> {
        let Value::Object(mut row) = row else {
            return Err(StoreError::NotAnObject);
        };
        let spec = self.specs.get(table).cloned().unwrap_or_default();

        if let Some(key) = spec.key {
            if spec.generated_id && row.get(key).map_or(true, Value::is_null) {
                row.insert(key.to_string(), json!(Uuid::new_v4().to_string()));
            }
        }
        if spec.timestamps && !row.contains_key("created_at") {
            row.insert("created_at".into(), json!(Utc::now().to_rfc3339()));
        }
        self.apply_generated(table, &mut row);

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if let Some(key) = spec.key {
            let new_key = row.get(key).map(value_text).unwrap_or_default();
            if rows.iter().any(|existing| key_matches(existing, key, &new_key)) {
                return Err(StoreError::Conflict(format!("{}.{} = {}", table, key, new_key)));
            }
        }
        rows.push(Value::Object(row));
        Ok(())
    }

    async fn update(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        row: Value,
    ) -> Result<(), StoreError> {
        let Value::Object(changes) = row else {
            return Err(StoreError::NotAnObject);
        };
        let unique_key = self.specs.get(table).and_then(|spec| spec.key);
        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(table) {
            if let Some(unique) = unique_key {
                if let Some(new_key) = changes.get(unique).map(value_text) {
                    let taken = rows.iter().any(|other| {
                        !key_matches(other, key_column, key) && key_matches(other, unique, &new_key)
                    });
                    if taken {
                        return Err(StoreError::Conflict(format!(
                            "{}.{} = {}",
                            table, unique, new_key
                        )));
                    }
                }
            }
            for existing in rows.iter_mut().filter(|r| key_matches(r, key_column, key)) {
                if let Value::Object(fields) = existing {
                    for (column, value) in &changes {
                        fields.insert(column.clone(), value.clone());
                    }
                    self.apply_generated(table, fields);
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, key_column: &str, key: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| !key_matches(row, key_column, key));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

//! PostgreSQL record store
//!
//! Rows are read with `to_jsonb` and written through `jsonb_populate_record`,
//! so one set of statements serves every table. Only the columns present in
//! a payload are written; the others keep their defaults or current values.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{validate_identifier, Order, Query, RecordStore, StoreError};
use crate::config::StoreConfig;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or(StoreError::NotConfigured("store.database_url"))?;

        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(url)
            .await?;
        tracing::info!("Database connection established");

        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))
    }
}

/// Column names of a payload, validated
fn payload_columns(row: &Value) -> Result<Vec<&str>, StoreError> {
    let Value::Object(fields) = row else {
        return Err(StoreError::NotAnObject);
    };
    fields.keys().map(|k| validate_identifier(k)).collect()
}

fn order_clause(order: &Order) -> Result<String, StoreError> {
    let (column, key) = order.path();
    let column = validate_identifier(column)?;
    let direction = if order.descending { "DESC" } else { "ASC" };
    Ok(match key {
        Some(key) => format!(
            " ORDER BY t.{} -> '{}' {}",
            column,
            validate_identifier(key)?,
            direction
        ),
        None => format!(" ORDER BY t.{} {}", column, direction),
    })
}

/// Build the select statement; the filter value, if any, is bound as `$1`
pub(crate) fn select_sql(table: &str, query: &Query) -> Result<String, StoreError> {
    let mut sql = format!(
        "SELECT to_jsonb(t) FROM {} t",
        validate_identifier(table)?
    );
    if let Some((column, _)) = &query.filter {
        sql.push_str(&format!(" WHERE t.{}::text = $1", validate_identifier(column)?));
    }
    if let Some(order) = &query.order {
        sql.push_str(&order_clause(order)?);
    }
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    Ok(sql)
}

pub(crate) fn insert_sql(table: &str, columns: &[&str]) -> Result<String, StoreError> {
    let table = validate_identifier(table)?;
    let columns = columns.join(", ");
    Ok(format!(
        "INSERT INTO {table} ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1)"
    ))
}

pub(crate) fn update_sql(table: &str, key_column: &str, columns: &[&str]) -> Result<String, StoreError> {
    let table = validate_identifier(table)?;
    let key_column = validate_identifier(key_column)?;
    let columns = columns.join(", ");
    Ok(format!(
        "UPDATE {table} t SET ({columns}) = (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1)) WHERE t.{key_column}::text = $2"
    ))
}

pub(crate) fn delete_sql(table: &str, key_column: &str) -> Result<String, StoreError> {
    Ok(format!(
        "DELETE FROM {} t WHERE t.{}::text = $1",
        validate_identifier(table)?,
        validate_identifier(key_column)?
    ))
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let sql = select_sql(table, query)?;
        let mut statement = sqlx::query_scalar::<_, Value>(&sql);
        if let Some((_, value)) = &query.filter {
            statement = statement.bind(value.clone());
        }
        Ok(statement.fetch_all(&self.pool).await?)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), StoreError> {
        let columns = payload_columns(&row)?;
        if columns.is_empty() {
            return Err(StoreError::NotAnObject);
        }
        let sql = insert_sql(table, &columns)?;
        sqlx::query(&sql)
            .bind(&row)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn update(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        row: Value,
    ) -> Result<(), StoreError> {
        let columns = payload_columns(&row)?;
        if columns.is_empty() {
            return Ok(());
        }
        let sql = update_sql(table, key_column, &columns)?;
        sqlx::query(&sql)
            .bind(&row)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn delete(&self, table: &str, key_column: &str, key: &str) -> Result<(), StoreError> {
        let sql = delete_sql(table, key_column)?;
        sqlx::query(&sql).bind(key).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_sql() {
        let query = Query::new()
            .eq("statut", "Actif")
            .order(Order::desc("couts->total_revient"))
            .limit(5);
        assert_eq!(
            select_sql("products", &query).unwrap(),
            "SELECT to_jsonb(t) FROM products t WHERE t.statut::text = $1 ORDER BY t.couts -> 'total_revient' DESC LIMIT 5"
        );
        assert_eq!(
            select_sql("physical_lots", &Query::new().order(Order::desc("id_lot"))).unwrap(),
            "SELECT to_jsonb(t) FROM physical_lots t ORDER BY t.id_lot DESC"
        );
    }

    #[test]
    fn test_write_sql() {
        assert_eq!(
            insert_sql("cost_types", &["code", "nom"]).unwrap(),
            "INSERT INTO cost_types (code, nom) SELECT code, nom FROM jsonb_populate_record(NULL::cost_types, $1)"
        );
        assert_eq!(
            update_sql("shipments", "id_expedition", &["statut"]).unwrap(),
            "UPDATE shipments t SET (statut) = (SELECT statut FROM jsonb_populate_record(NULL::shipments, $1)) WHERE t.id_expedition::text = $2"
        );
        assert_eq!(
            delete_sql("physical_lots", "id_lot").unwrap(),
            "DELETE FROM physical_lots t WHERE t.id_lot::text = $1"
        );
    }

    #[test]
    fn test_rejects_unsafe_identifiers() {
        let query = Query::new().order(Order::desc("couts->total'; --"));
        assert!(select_sql("products", &query).is_err());
        assert!(insert_sql("products; drop", &["nom"]).is_err());
        assert!(payload_columns(&serde_json::json!({ "Nom": 1 })).is_err());
    }
}

//! PostgREST record store (Supabase-compatible REST API)

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::{validate_identifier, Query, RecordStore, StoreError};
use crate::config::StoreConfig;

#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base_url = config
            .rest_url
            .as_deref()
            .ok_or(StoreError::NotConfigured("store.rest_url"))?;
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(StoreError::NotConfigured("store.api_key"))?;
        Ok(Self::with_client(Client::new(), base_url, api_key))
    }

    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> Result<String, StoreError> {
        Ok(format!("{}/rest/v1/{}", self.base_url, validate_identifier(table)?))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 409 {
            return Err(StoreError::Conflict(body));
        }
        Err(StoreError::Remote {
            status: status.as_u16(),
            body,
        })
    }
}

/// PostgREST query parameters of a select
pub(crate) fn select_params(query: &Query) -> Result<Vec<(String, String)>, StoreError> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    if let Some((column, value)) = &query.filter {
        params.push((validate_identifier(column)?.to_string(), format!("eq.{}", value)));
    }
    if let Some(order) = &query.order {
        let (column, key) = order.path();
        let mut path = validate_identifier(column)?.to_string();
        if let Some(key) = key {
            path.push_str("->");
            path.push_str(validate_identifier(key)?);
        }
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{}", path, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    Ok(params)
}

fn key_param(key_column: &str, key: &str) -> Result<[(String, String); 1], StoreError> {
    Ok([(
        validate_identifier(key_column)?.to_string(),
        format!("eq.{}", key),
    )])
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let request = self
            .client
            .get(self.table_url(table)?)
            .query(&select_params(query)?);
        let response = Self::check(self.authorized(request).send().await?).await?;
        Ok(response.json::<Vec<Value>>().await?)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), StoreError> {
        if !row.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let request = self
            .client
            .post(self.table_url(table)?)
            .header("Prefer", "return=minimal")
            .json(&row);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn update(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        row: Value,
    ) -> Result<(), StoreError> {
        if !row.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let request = self
            .client
            .patch(self.table_url(table)?)
            .query(&key_param(key_column, key)?)
            .header("Prefer", "return=minimal")
            .json(&row);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, key_column: &str, key: &str) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(self.table_url(table)?)
            .query(&key_param(key_column, key)?);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let request = self.client.get(format!("{}/rest/v1/", self.base_url));
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Order;

    #[test]
    fn test_select_params() {
        let query = Query::new()
            .eq("statut", "Réceptionnée")
            .order(Order::desc("date_reception"))
            .limit(5);
        let params = select_params(&query).unwrap();
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("statut".to_string(), "eq.Réceptionnée".to_string()),
                ("order".to_string(), "date_reception.desc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_json_path_order() {
        let params = select_params(&Query::new().order(Order::desc("couts->total_revient"))).unwrap();
        assert_eq!(params[1], ("order".to_string(), "couts->total_revient.desc".to_string()));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let store = RestStore::with_client(Client::new(), "https://example.supabase.co/", "k");
        assert_eq!(
            store.table_url("products").unwrap(),
            "https://example.supabase.co/rest/v1/products"
        );
    }
}

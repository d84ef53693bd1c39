//! PostgREST-style backend source
//!
//! Reads `GET {url}/rest/v1/{table}` with the anonymous API key sent both as
//! the `apikey` header and as a bearer token.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::models::{Category, RawRecord};

use super::{fetch_cutoff, TransactionSource};

/// Columns embedded from the categories table on every transaction row
const CATEGORY_EMBED: &str = "*,categories(id,name,color,icon)";

/// Managed backend reached over HTTP
#[derive(Clone)]
pub struct RestSource {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    transactions_table: String,
    categories_table: String,
    limit: u32,
}

impl RestSource {
    /// Create from the `[backend]` config section
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::Config("backend.url is not set".into()))?;

        let http_client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http_client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            transactions_table: config.transactions_table.clone(),
            categories_table: config.categories_table.clone(),
            limit: config.limit,
        })
    }


    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    async fn read_rows<T: DeserializeOwned>(&self, table: &str, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "{} returned {}: {}",
                table,
                status,
                body.trim()
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TransactionSource for RestSource {
    async fn fetch_recent_transactions(
        &self,
        window_months: u32,
        now: NaiveDateTime,
    ) -> Result<Vec<RawRecord>> {
        let cutoff = fetch_cutoff(window_months, now);
        let query = [
            ("select", CATEGORY_EMBED.to_string()),
            ("date", format!("gte.{}", cutoff.format("%Y-%m-%d"))),
            ("order", "date.desc".to_string()),
            ("limit", self.limit.to_string()),
        ];

        let request = self
            .http_client
            .get(self.table_url(&self.transactions_table))
            .query(&query);
        let response = self.authorized(request).send().await?;
        let rows: Vec<RawRecord> = self.read_rows(&self.transactions_table, response).await?;

        debug!(
            table = %self.transactions_table,
            rows = rows.len(),
            %cutoff,
            "Fetched transactions"
        );
        Ok(rows)
    }

    async fn fetch_active_categories(&self) -> Result<Vec<Category>> {
        let query = [
            ("select", "*"),
            ("is_active", "eq.true"),
            ("order", "name"),
        ];

        let request = self
            .http_client
            .get(self.table_url(&self.categories_table))
            .query(&query);
        let response = self.authorized(request).send().await?;
        let categories: Vec<Category> = self.read_rows(&self.categories_table, response).await?;

        debug!(count = categories.len(), "Fetched active categories");
        Ok(categories)
    }

    fn describe(&self) -> String {
        format!("backend {}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_url() {
        let config = BackendConfig::default();
        assert!(matches!(
            RestSource::from_config(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_config_trims_trailing_slash() {
        let config = BackendConfig {
            url: Some("https://project.example/".to_string()),
            api_key: Some("anon".to_string()),
            ..BackendConfig::default()
        };
        let source = RestSource::from_config(&config).unwrap();
        assert_eq!(source.base_url(), "https://project.example");
        assert_eq!(
            source.table_url("transactions"),
            "https://project.example/rest/v1/transactions"
        );
        assert_eq!(source.describe(), "backend https://project.example");
    }
}

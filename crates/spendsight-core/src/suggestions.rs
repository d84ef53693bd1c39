//! Remote categorization suggestion service
//!
//! An optional HTTP service proposes category fixes for known merchants and
//! lists merchants it has not seen before. The dashboard treats it as
//! best-effort: when it is down, listings come back empty.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SuggestionsConfig;
use crate::error::{Error, Result};

/// A proposed category change for a merchant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub id: Option<i64>,
    pub business: String,
    #[serde(default)]
    pub current: String,
    pub recommended: String,
    /// Confidence in percent
    #[serde(default)]
    pub confidence: f64,
    /// Average transaction amount for the merchant
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub transaction_count: u32,
}

/// A merchant awaiting its first category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBusiness {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    /// Category the service proposes
    #[serde(default)]
    pub suggested: Option<String>,
}

/// Service health report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceHealth {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ai_initialized: bool,
    #[serde(default)]
    pub db_connected: bool,
}

/// Acknowledgement returned by the action endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
struct AcceptRequest<'a> {
    business: &'a str,
    recommended: &'a str,
}

#[derive(Serialize)]
struct RejectRequest<'a> {
    business: &'a str,
}

#[derive(Serialize)]
struct ApproveRequest<'a> {
    business: &'a str,
    category: &'a str,
}

/// Operations offered by the suggestion service
#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn health(&self) -> Result<ServiceHealth>;

    async fn suggestions(&self) -> Result<Vec<Suggestion>>;

    async fn new_businesses(&self) -> Result<Vec<NewBusiness>>;

    /// Apply the recommended category to a merchant
    async fn accept_suggestion(&self, business: &str, recommended: &str) -> Result<ActionResult>;

    async fn reject_suggestion(&self, business: &str) -> Result<ActionResult>;

    /// Assign a category to a newly seen merchant
    async fn approve_business(&self, business: &str, category: &str) -> Result<ActionResult>;
}

/// HTTP client for the suggestion service
#[derive(Clone)]
pub struct SuggestionClient {
    http_client: Client,
    base_url: String,
}

impl SuggestionClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from the `[suggestions]` config section; `None` when no URL is set
    pub fn from_config(config: &SuggestionsConfig) -> Result<Option<Self>> {
        let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };
        let http_client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Some(Self {
            http_client,
            base_url: url.trim_end_matches('/').to_string(),
        }))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        parse_response(path, response).await
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<ActionResult> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        parse_response(path, response).await
    }
}

async fn parse_response<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Backend(format!(
            "suggestion service {} returned {}",
            path, status
        )));
    }
    Ok(response.json().await?)
}

#[async_trait]
impl SuggestionService for SuggestionClient {
    async fn health(&self) -> Result<ServiceHealth> {
        self.get("/health").await
    }

    async fn suggestions(&self) -> Result<Vec<Suggestion>> {
        self.get("/api/ai-suggestions").await
    }

    async fn new_businesses(&self) -> Result<Vec<NewBusiness>> {
        self.get("/api/new-businesses").await
    }

    async fn accept_suggestion(&self, business: &str, recommended: &str) -> Result<ActionResult> {
        debug!(business, recommended, "Accepting suggestion");
        self.post(
            "/api/accept-suggestion",
            &AcceptRequest {
                business,
                recommended,
            },
        )
        .await
    }

    async fn reject_suggestion(&self, business: &str) -> Result<ActionResult> {
        debug!(business, "Rejecting suggestion");
        self.post("/api/reject-suggestion", &RejectRequest { business })
            .await
    }

    async fn approve_business(&self, business: &str, category: &str) -> Result<ActionResult> {
        debug!(business, category, "Approving new business");
        self.post(
            "/api/approve-business",
            &ApproveRequest { business, category },
        )
        .await
    }
}

/// Suggestions, or an empty list when the service is unreachable or unhealthy
pub async fn load_suggestions(service: &dyn SuggestionService) -> Vec<Suggestion> {
    if let Err(e) = service.health().await {
        warn!("Suggestion service unavailable: {}", e);
        return vec![];
    }
    match service.suggestions().await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!("Failed to load suggestions: {}", e);
            vec![]
        }
    }
}

/// New businesses, or an empty list when the service is unreachable or unhealthy
pub async fn load_new_businesses(service: &dyn SuggestionService) -> Vec<NewBusiness> {
    if let Err(e) = service.health().await {
        warn!("Suggestion service unavailable: {}", e);
        return vec![];
    }
    match service.new_businesses().await {
        Ok(businesses) => businesses,
        Err(e) => {
            warn!("Failed to load new businesses: {}", e);
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_tolerates_missing_fields() {
        let suggestion: Suggestion =
            serde_json::from_str(r#"{"business": "WOLT", "recommended": "Food"}"#).unwrap();
        assert_eq!(suggestion.business, "WOLT");
        assert_eq!(suggestion.current, "");
        assert_eq!(suggestion.confidence, 0.0);
        assert_eq!(suggestion.id, None);
    }

    #[test]
    fn test_from_config_without_url() {
        let config = SuggestionsConfig::default();
        assert!(SuggestionClient::from_config(&config).unwrap().is_none());

        let config = SuggestionsConfig {
            url: Some("http://localhost:5000/".to_string()),
            ..SuggestionsConfig::default()
        };
        let client = SuggestionClient::from_config(&config).unwrap().unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades_to_empty() {
        // nothing listens on the discard port
        let client = SuggestionClient::new("http://127.0.0.1:9");
        assert!(load_suggestions(&client).await.is_empty());
        assert!(load_new_businesses(&client).await.is_empty());
    }
}

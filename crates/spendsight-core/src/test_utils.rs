//! Test utilities for spendsight-core
//!
//! This module provides testing infrastructure: a mock PostgREST-style
//! backend, a mock suggestion service, and record fixture helpers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use chrono::{Duration, NaiveDateTime};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::models::TransactionRecord;

async fn serve(app: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

/// A request seen by a mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub api_key: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct BackendState {
    tables: HashMap<String, Vec<Value>>,
    api_key: Option<String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Mock PostgREST backend serving fixed rows per table
///
/// Honors `date=gte.YYYY-MM-DD`, `is_active=eq.true` and `limit`, and
/// rejects requests without the expected `apikey` when one is set.
pub struct MockBackendServer {
    addr: SocketAddr,
    state: Arc<BackendState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBackendServer {
    /// Start the mock server on an available port
    pub async fn start(transactions: Vec<Value>, categories: Vec<Value>) -> Self {
        Self::start_with_key(transactions, categories, None).await
    }

    /// Start a server that requires `api_key`
    pub async fn start_with_key(
        transactions: Vec<Value>,
        categories: Vec<Value>,
        api_key: Option<&str>,
    ) -> Self {
        let mut tables = HashMap::new();
        tables.insert("transactions".to_string(), transactions);
        tables.insert("categories".to_string(), categories);
        let state = Arc::new(BackendState {
            tables,
            api_key: api_key.map(str::to_string),
            requests: Mutex::new(vec![]),
        });

        let app = Router::new()
            .route("/rest/v1/:table", get(handle_table))
            .with_state(state.clone());
        let (addr, shutdown_tx) = serve(app).await;

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockBackendServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn handle_table(
    State(state): State<Arc<BackendState>>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, (StatusCode, Json<Value>)> {
    let api_key = header(&headers, "apikey");
    state.requests.lock().unwrap().push(RecordedRequest {
        path: format!("/rest/v1/{}", table),
        query: query.clone(),
        api_key: api_key.clone(),
        authorization: header(&headers, "authorization"),
        body: None,
    });

    if state.api_key.is_some() && api_key != state.api_key {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key"})),
        ));
    }

    let Some(rows) = state.tables.get(&table) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("relation \"{}\" does not exist", table)})),
        ));
    };

    let since = query.get("date").and_then(|d| d.strip_prefix("gte."));
    let active_only = query.get("is_active").map(String::as_str) == Some("eq.true");

    let mut rows: Vec<Value> = rows
        .iter()
        .filter(|row| match since {
            // ISO dates compare correctly as strings
            Some(since) => row["date"].as_str().is_some_and(|d| d >= since),
            None => true,
        })
        .filter(|row| !active_only || row["is_active"].as_bool().unwrap_or(true))
        .cloned()
        .collect();

    if query.get("order").map(String::as_str) == Some("date.desc") {
        rows.sort_by(|a, b| b["date"].as_str().cmp(&a["date"].as_str()));
    }
    if let Some(limit) = query.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        rows.truncate(limit);
    }

    Ok(Json(rows))
}

#[derive(Default)]
struct SuggestionState {
    suggestions: Vec<Value>,
    businesses: Vec<Value>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Mock categorization suggestion service
pub struct MockSuggestionServer {
    addr: SocketAddr,
    state: Arc<SuggestionState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockSuggestionServer {
    /// Start the mock server with a few canned suggestions and businesses
    pub async fn start() -> Self {
        let state = Arc::new(SuggestionState {
            suggestions: vec![
                json!({
                    "id": 1,
                    "business": "WOLT TLV",
                    "current": "Uncategorized",
                    "recommended": "Food",
                    "confidence": 92,
                    "amount": 85.5,
                    "transaction_count": 14
                }),
                json!({
                    "id": 2,
                    "business": "PANGO",
                    "current": "Shopping",
                    "recommended": "Transport",
                    "confidence": 78,
                    "amount": 12,
                    "transaction_count": 6
                }),
            ],
            businesses: vec![json!({
                "id": 7,
                "name": "NEW CAFE",
                "amount": 42,
                "suggested": "Food"
            })],
            requests: Mutex::new(vec![]),
        });

        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/api/ai-suggestions", get(handle_suggestions))
            .route("/api/new-businesses", get(handle_businesses))
            .route("/api/accept-suggestion", post(handle_action))
            .route("/api/reject-suggestion", post(handle_action))
            .route("/api/approve-business", post(handle_action))
            .with_state(state.clone());
        let (addr, shutdown_tx) = serve(app).await;

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Action requests (POSTs) received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockSuggestionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "ai_initialized": true, "db_connected": true}))
}

async fn handle_suggestions(State(state): State<Arc<SuggestionState>>) -> Json<Vec<Value>> {
    Json(state.suggestions.clone())
}

async fn handle_businesses(State(state): State<Arc<SuggestionState>>) -> Json<Vec<Value>> {
    Json(state.businesses.clone())
}

async fn handle_action(
    State(state): State<Arc<SuggestionState>>,
    uri: axum::http::Uri,
    Json(body): Json<Value>,
) -> Json<Value> {
    let business = body["business"].as_str().unwrap_or_default().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        query: HashMap::new(),
        api_key: None,
        authorization: None,
        body: Some(body),
    });
    Json(json!({"success": true, "message": format!("Updated {}", business)}))
}

/// A dated record `days_ago` days before `now` at `now`'s time of day
pub fn record_days_ago(
    id: &str,
    now: NaiveDateTime,
    days_ago: i64,
    amount: f64,
    category: &str,
) -> TransactionRecord {
    TransactionRecord::new(id, now - Duration::days(days_ago), amount).with_category(category)
}

/// A purchase at a known hour of the day `days_ago` days before `now`
pub fn record_at_hour(
    id: &str,
    now: NaiveDateTime,
    days_ago: i64,
    hour: u32,
    amount: f64,
) -> TransactionRecord {
    let date = (now - Duration::days(days_ago)).date();
    let ts = date.and_hms_opt(hour, 0, 0).unwrap_or_else(|| date.and_time(Default::default()));
    TransactionRecord::new(id, ts, amount).with_time_known()
}

/// A raw backend row as JSON
pub fn backend_row(identifier: &str, date: &str, amount: f64, category: Option<&str>) -> Value {
    let mut row = json!({
        "identifier": identifier,
        "cardlast4": "1234",
        "date": date,
        "description": format!("Merchant {}", identifier),
        "chargedamount": -amount,
        "is_ai_categorized": false,
    });
    if let Some(name) = category {
        row["categories"] = json!({"id": 1, "name": name, "color": "#ff6b6b"});
    }
    row
}

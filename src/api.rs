//! REST API for the intent router
//!
//! Classification only: resolved intents are returned to the caller,
//! never executed here.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::models::{ClassificationResult, Parameters};
use crate::router::IntentRouter;

/// Keywords listed per intent by the catalog endpoint
const LISTED_KEYWORDS: usize = 5;

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct NaturalLanguageRequest {
    #[serde(default)]
    pub query: String,
    /// Accepted for compatibility; intents are never executed here
    #[serde(default)]
    pub execute: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NaturalLanguageResponse {
    pub query: String,
    pub intent: String,
    pub confidence: f64,
    pub method: String,
    pub endpoint: String,
    pub parameters: Parameters,
    pub requires_login: bool,
    pub latency_ms: f64,
    pub executed: bool,
}

impl NaturalLanguageResponse {
    fn new(query: String, result: ClassificationResult) -> Self {
        Self {
            query,
            intent: result.intent,
            confidence: result.confidence,
            method: result.method.to_string(),
            endpoint: result.endpoint,
            parameters: result.parameters,
            requires_login: result.requires_login,
            latency_ms: result.latency_ms,
            executed: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IntentSummary {
    pub id: String,
    pub keywords: Vec<String>,
    pub endpoint: String,
    pub requires_login: bool,
    pub description: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub router: Arc<IntentRouter>,
}

/// =============================
/// Handlers
/// =============================

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "stages": {
            "keyword": true,
            "embedding": state.router.embedding_available(),
            "llm": state.router.llm_available(),
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn classify_query(
    State(state): State<ApiState>,
    Json(req): Json<NaturalLanguageRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let query = req.query.trim().to_string();

    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("query parameter is required".into())),
        );
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("classify", %request_id);

    async move {
        info!(query = %query, execute = req.execute, "Received natural-language query");

        let result = state.router.classify(&query).await;

        (
            StatusCode::OK,
            Json(ApiResponse::success(NaturalLanguageResponse::new(
                query, result,
            ))),
        )
    }
    .instrument(span)
    .await
}

async fn list_intents(State(state): State<ApiState>) -> Json<ApiResponse> {
    let intents: Vec<IntentSummary> = state
        .router
        .catalog()
        .intents()
        .map(|intent| IntentSummary {
            id: intent.id.clone(),
            keywords: intent.keywords.iter().take(LISTED_KEYWORDS).cloned().collect(),
            endpoint: intent.endpoint.as_str().to_string(),
            requires_login: intent.requires_login,
            description: intent.description.clone(),
        })
        .collect();

    Json(ApiResponse::success(serde_json::json!({
        "count": intents.len(),
        "intents": intents,
    })))
}

async fn list_tickers(State(state): State<ApiState>) -> Json<ApiResponse> {
    let tickers = state.router.catalog().tickers();
    let map: serde_json::Map<String, serde_json::Value> = tickers
        .iter()
        .map(|(name, code)| (name.to_string(), serde_json::Value::from(code)))
        .collect();

    Json(ApiResponse::success(serde_json::json!({
        "count": tickers.len(),
        "tickers": map,
    })))
}

/// =============================
/// Router
/// =============================

pub fn create_router(router: Arc<IntentRouter>) -> Router {
    let state = ApiState { router };

    Router::new()
        .route("/health", get(health))
        .route("/api/natural-language", post(classify_query))
        .route("/api/natural-language/intents", get(list_intents))
        .route("/api/natural-language/tickers", get(list_tickers))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    router: Arc<IntentRouter>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let app = create_router(router);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

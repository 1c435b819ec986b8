//! HTTP API server.
//!
//! Exposes the analysis pipeline and the analysis store over JSON, with CORS
//! open to any origin so browser front-ends can call it directly.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/analyze` | Analyze one text and store the result |
//! | `POST` | `/api/batch-analyze` | Analyze up to 10 texts and store the results |
//! | `GET` | `/api/search` | Filter stored analyses by topic, keyword, sentiment |
//! | `GET` | `/api/list` | Stored analyses, newest first |
//! | `GET` | `/api/{id}` | One stored analysis |
//! | `GET` | `/health` | Health check |
//!
//! # Error Contract
//!
//! All errors return a JSON body:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "bad_request",
//!     "message": "input text must not be empty"
//!   }
//! }
//! ```
//!
//! Codes: `bad_request` (400), `not_found` (404), `internal` (500).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::error::AnalysisError;
use crate::models::{SearchFilter, Sentiment, StoredAnalysis};
use crate::orchestrator::{Orchestrator, MAX_BATCH_SIZE};
use crate::store::{page_size, AnalysisStore, SqliteStore};

/// Characters of a failed batch item echoed back in the error entry.
const ERROR_TEXT_PREVIEW: usize = 100;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<Orchestrator>,
    pub store: Arc<dyn AnalysisStore>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Orchestrator, store: Arc<dyn AnalysisStore>) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            store,
        }
    }
}

/// Build the API router over `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/analyze", post(handle_analyze))
        .route("/api/batch-analyze", post(handle_batch_analyze))
        .route("/api/search", get(handle_search))
        .route("/api/list", get(handle_list))
        .route("/api/{id}", get(handle_get))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Start the server on `server.bind`, backed by the SQLite store.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let orchestrator = Orchestrator::from_config(config)?;
    let store = SqliteStore::open(config).await?;
    let state = AppState::new(config.clone(), orchestrator, Arc::new(store));

    let app = router(state);

    info!(bind = %bind_addr, "starting HTTP server");
    println!("Text Insight API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = %err, "request failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        bad_request(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

fn check_length(state: &AppState, text: &str) -> Result<(), AppError> {
    let max = state.config.analysis.max_text_chars;
    let chars = text.chars().count();
    if chars > max {
        return Err(bad_request(format!(
            "text is {} characters long; the limit is {}",
            chars, max
        )));
    }
    Ok(())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/analyze ============

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
}

async fn handle_analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredAnalysis>), AppError> {
    let Json(req) = body?;
    check_length(&state, &req.text)?;

    let analysis = state.orchestrator.analyze(&req.text).await?;
    let stored = state.store.insert(&analysis.into_result()).await?;

    Ok((StatusCode::CREATED, Json(stored)))
}

// ============ POST /api/batch-analyze ============

#[derive(Deserialize)]
struct BatchAnalyzeRequest {
    texts: Vec<String>,
}

#[derive(Serialize)]
struct BatchItemError {
    index: usize,
    text: String,
    error: String,
}

#[derive(Serialize)]
struct BatchAnalyzeResponse {
    analyses: Vec<StoredAnalysis>,
    total_requested: usize,
    total_processed: usize,
    success_count: usize,
    error_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<BatchItemError>,
}

fn preview(text: &str) -> String {
    if text.chars().count() > ERROR_TEXT_PREVIEW {
        let head: String = text.chars().take(ERROR_TEXT_PREVIEW).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

async fn handle_batch_analyze(
    State(state): State<AppState>,
    body: Result<Json<BatchAnalyzeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BatchAnalyzeResponse>), AppError> {
    let Json(req) = body?;
    if req.texts.is_empty() || req.texts.len() > MAX_BATCH_SIZE {
        return Err(AnalysisError::BatchSize(req.texts.len()).into());
    }
    for (i, text) in req.texts.iter().enumerate() {
        check_length(&state, text).map_err(|e| bad_request(format!("texts[{}]: {}", i, e.message)))?;
    }

    let results = state.orchestrator.analyze_batch(&req.texts).await?;

    let mut analyses = Vec::new();
    let mut errors = Vec::new();
    for (index, (text, item)) in req.texts.iter().zip(results).enumerate() {
        let outcome = match item {
            Ok(analysis) => state
                .store
                .insert(&analysis.into_result())
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match outcome {
            Ok(stored) => analyses.push(stored),
            Err(error) => errors.push(BatchItemError {
                index,
                text: preview(text),
                error,
            }),
        }
    }

    let response = BatchAnalyzeResponse {
        total_requested: req.texts.len(),
        total_processed: analyses.len(),
        success_count: analyses.len(),
        error_count: errors.len(),
        analyses,
        errors,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

// ============ GET /api/search ============

#[derive(Deserialize)]
struct SearchParams {
    topic: Option<String>,
    keyword: Option<String>,
    sentiment: Option<String>,
    limit: Option<usize>,
}

async fn handle_search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<StoredAnalysis>>, AppError> {
    let Query(params) = params?;

    let sentiment = match params.sentiment.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(s.parse::<Sentiment>().map_err(bad_request)?),
    };
    let filter = SearchFilter {
        topic: params.topic,
        keyword: params.keyword,
        sentiment,
    };
    if filter.is_empty() {
        return Err(bad_request(
            "at least one of topic, keyword or sentiment is required",
        ));
    }

    let rows = state
        .store
        .search(&filter, page_size(params.limit))
        .await?;
    Ok(Json(rows))
}

// ============ GET /api/list ============

#[derive(Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

async fn handle_list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<StoredAnalysis>>, AppError> {
    let Query(params) = params?;
    let rows = state
        .store
        .list(page_size(params.limit))
        .await?;
    Ok(Json(rows))
}

// ============ GET /api/{id} ============

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredAnalysis>, AppError> {
    match state.store.get(&id).await? {
        Some(stored) => Ok(Json(stored)),
        None => Err(not_found(format!("analysis not found: {}", id))),
    }
}

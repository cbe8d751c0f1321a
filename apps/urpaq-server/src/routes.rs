use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use urpaq_core::error::Error;
use urpaq_core::types::ChatMessage;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat/message", post(send_message))
        .route("/api/admin/rag/metrics", get(metrics))
        .route("/api/admin/rag/documents/stats", get(document_stats))
        .route("/api/admin/rag/cache/clear", post(clear_cache))
        .route("/api/admin/rag/metrics/reset", post(reset_metrics))
        .route("/api/admin/rag/health", get(health))
        .route("/api/admin/rag/summarize", post(summarize))
        .route("/api/admin/upload/txt", post(upload_txt))
        .with_state(state)
}

/// Maps domain errors onto HTTP statuses with an `{"error": ...}` body.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

async fn send_message(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> ApiResult<Json<ChatMessage>> {
    info!("Received HTTP message: {}", request.message);
    Ok(Json(state.chat.process_message(&request.message).await?))
}

async fn metrics(State(state): State<AppState>) -> Json<Value> {
    info!("Fetching RAG metrics");
    let snapshot = state.metrics.snapshot();
    let cache = state.cache.stats();
    Json(json!({
        "metrics": {
            "totalRequests": snapshot.total_requests,
            "successfulRequests": snapshot.successful_requests,
            "failedRequests": snapshot.failed_requests,
            "successRate": snapshot.success_rate,
            "avgResponseTimeMs": snapshot.avg_response_time_ms,
            "totalRetries": snapshot.total_retries,
        },
        "cache": cache,
    }))
}

async fn document_stats(State(state): State<AppState>) -> Json<Value> {
    info!("Fetching document statistics");
    match state.retrieval.count().await {
        Ok(count) => Json(json!({ "totalDocuments": count, "status": "healthy" })),
        Err(e) => {
            error!("Error fetching document stats: {}", e);
            Json(json!({ "totalDocuments": 0, "status": "error", "error": e.to_string() }))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClearParams {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// `type=search` drops search results only; anything else clears all.
async fn clear_cache(State(state): State<AppState>, Query(params): Query<ClearParams>) -> Json<Value> {
    let kind = params.kind.unwrap_or_else(|| "all".to_string());
    info!("Clearing cache: {}", kind);
    if kind.eq_ignore_ascii_case("search") {
        state.cache.invalidate_search_cache();
    } else {
        state.cache.invalidate_all();
    }
    Json(json!({ "status": "success", "message": format!("Cache cleared: {kind}") }))
}

async fn reset_metrics(State(state): State<AppState>) -> Json<Value> {
    info!("Resetting metrics");
    state.metrics.reset();
    Json(json!({ "status": "success", "message": "Metrics reset successfully" }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    match state.retrieval.count().await {
        Ok(count) => Json(json!({
            "status": "UP",
            "documentsIndexed": count,
            "cacheStats": state.cache.stats().to_string(),
            "successRate": format!("{:.1}%", state.metrics.snapshot().success_rate),
        })),
        Err(e) => {
            error!("Health check failed: {}", e);
            Json(json!({ "status": "DOWN", "error": e.to_string() }))
        }
    }
}

#[derive(Debug, Deserialize)]
struct SummarizeRequest {
    #[serde(default)]
    text: String,
}

async fn summarize(State(state): State<AppState>, Json(request): Json<SummarizeRequest>) -> ApiResult<Json<Value>> {
    let summary = state.ai.summarize(&request.text).await?;
    Ok(Json(json!({ "summary": summary })))
}

async fn upload_txt(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<Value>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::InvalidInput(e.to_string()))? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| Error::InvalidInput(e.to_string()))?;

        let key = state.uploads.upload_txt(&file_name, bytes.to_vec(), content_type.as_deref()).await?;
        return Ok(Json(json!({ "key": key })));
    }
    Err(Error::InvalidInput("multipart field 'file' is missing".into()).into())
}

//! HTTP request handlers.

use super::AppState;
use super::request::{AnalysisType, AnalyzeRequest};
use crate::error::{ApiError, ApiResult, STORE_UNAVAILABLE, VISION_UNAVAILABLE};
use crate::estimator::estimate_fill;
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use binsight_core::{
    BinSlot, BinStatus, DocumentId, DocumentStore, FillEstimate, LogEntry, LogRecord, StoreError,
    classify,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default page size for `/logs`.
pub const DEFAULT_LOG_LIMIT: usize = 20;

/// Largest page size for `/logs`.
pub const MAX_LOG_LIMIT: usize = 200;

// =============================================================================
// RESPONSE TYPES
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SegregationResponse {
    pub status: String,
    pub message: String,
    pub segregated_category: String,
    pub detected_labels: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FullnessResponse {
    pub status: String,
    pub message: String,
    pub segregated_category: String,
    pub bin_level: f64,
    pub alert: bool,
    pub document_id: Option<String>,
    pub method_used: String,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub vision: bool,
    pub model: bool,
    pub store: bool,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// `OPTIONS` on the analysis endpoint.
pub async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST")),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type")),
            (header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("3600")),
        ],
    )
        .into_response()
}

/// `POST /`: validate, then dispatch to exactly one analysis.
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Response> {
    let request = AnalyzeRequest::from_body(&body?)?;
    match request.analysis {
        AnalysisType::Segregation => Ok(segregation(&state, &request.image).await?.into_response()),
        AnalysisType::Fullness => {
            Ok(fullness(&state, request.image, request.slot).await?.into_response())
        }
    }
}

async fn segregation(state: &AppState, image: &[u8]) -> ApiResult<Json<SegregationResponse>> {
    let vision = state
        .vision
        .as_deref()
        .ok_or(ApiError::ClientUnavailable(VISION_UNAVAILABLE))?;

    let labels = vision
        .detect_labels(image)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let classification = classify(&labels);

    tracing::info!(
        category = %classification.category,
        labels = labels.len(),
        "Waste classified"
    );

    Ok(Json(SegregationResponse {
        status: "Success".to_string(),
        message: format!("Waste classified as {}.", classification.category),
        segregated_category: classification.category.to_string(),
        confidence: classification.rounded_confidence(),
        detected_labels: classification.detected_labels,
    }))
}

async fn fullness(state: &AppState, image: Vec<u8>, slot: BinSlot) -> ApiResult<Json<FullnessResponse>> {
    let store = state
        .store
        .clone()
        .ok_or(ApiError::ClientUnavailable(STORE_UNAVAILABLE))?;

    let estimate = estimate_fill(state.model.as_deref(), state.vision.as_deref(), &image).await;
    let alert = estimate.is_alert();

    let recorded = estimate.clone();
    let document_id = blocking(store, move |store| {
        record_reading(store, slot, &recorded, Utc::now())
    })
    .await
    .map_err(|e| ApiError::Fullness(e.to_string()))?;

    tracing::info!(
        slot = %slot,
        level = estimate.level,
        alert,
        method = %estimate.method,
        document_id = %document_id,
        "Fill level recorded"
    );

    Ok(Json(FullnessResponse {
        status: "Success".to_string(),
        message: format!("Fill level recorded. Bin is {:.1}% full.", estimate.level),
        segregated_category: slot.to_string(),
        bin_level: estimate.level,
        alert,
        document_id: Some(document_id.to_string()),
        method_used: estimate.method.to_string(),
        reason: estimate.reason,
    }))
}

/// Append the log record, then overwrite the live status.
pub fn record_reading(
    store: &dyn DocumentStore,
    slot: BinSlot,
    estimate: &FillEstimate,
    at: DateTime<Utc>,
) -> Result<DocumentId, StoreError> {
    let id = store.append_log(&LogRecord::from_estimate(slot, estimate, at))?;
    store.put_status(&BinStatus::from_estimate(slot, estimate, at))?;
    Ok(id)
}

// =============================================================================
// READ ENDPOINTS
// =============================================================================

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        vision: state.vision.is_some(),
        model: state.model.is_some(),
        store: state.store.is_some(),
    })
}

/// `GET /status/{slot}`
pub async fn bin_status(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> ApiResult<Json<BinStatus>> {
    let slot = slot
        .parse::<BinSlot>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let store = state
        .store
        .clone()
        .ok_or(ApiError::ClientUnavailable(STORE_UNAVAILABLE))?;

    blocking(store, move |store| store.status(slot))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No status recorded for {slot}.")))
}

/// `GET /logs?limit=N`
pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(MAX_LOG_LIMIT);
    let store = state
        .store
        .clone()
        .ok_or(ApiError::ClientUnavailable(STORE_UNAVAILABLE))?;

    blocking(store, move |store| store.recent_logs(limit))
        .await
        .map(Json)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Error from a store call run off the async runtime.
#[derive(Debug, thiserror::Error)]
enum BlockingError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run a store operation on the blocking pool.
async fn blocking<T, F>(store: Arc<dyn DocumentStore>, op: F) -> Result<T, BlockingError>
where
    T: Send + 'static,
    F: FnOnce(&dyn DocumentStore) -> Result<T, StoreError> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(move || op(store.as_ref())).await??)
}

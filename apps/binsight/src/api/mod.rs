//! # HTTP API
//!
//! Endpoints:
//! - `POST /`, `POST /analyze`: segregation or fullness analysis
//! - `OPTIONS` on every route: CORS preflight (204, no body)
//! - `GET /health`: which collaborators are configured
//! - `GET /status/{slot}`: live status of one bin slot
//! - `GET /logs?limit=N`: most recent fullness readings
//!
//! Every response carries `Access-Control-Allow-Origin: *`.

mod handlers;
mod request;

pub use handlers::{
    DEFAULT_LOG_LIMIT, FullnessResponse, HealthResponse, MAX_LOG_LIMIT, SegregationResponse,
    record_reading,
};
pub use request::{AnalysisType, AnalyzeRequest, decode_image};

use crate::upstream::{GenerativeModel, LabelDetector};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post};
use binsight_core::DocumentStore;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body. Base64 images outgrow axum's 2 MiB default.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Collaborators shared by all handlers.
///
/// `None` means the collaborator could not be constructed at startup;
/// requests that need it answer 500.
#[derive(Clone, Default)]
pub struct AppState {
    pub vision: Option<Arc<dyn LabelDetector>>,
    pub model: Option<Arc<dyn GenerativeModel>>,
    pub store: Option<Arc<dyn DocumentStore>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_vision(mut self, vision: Arc<dyn LabelDetector>) -> Self {
        self.vision = Some(vision);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: Arc<dyn GenerativeModel>) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::analyze).options(handlers::preflight))
        .route("/analyze", post(handlers::analyze).options(handlers::preflight))
        .route("/health", get(handlers::health).options(handlers::preflight))
        .route("/status/{slot}", get(handlers::bin_status).options(handlers::preflight))
        .route("/logs", get(handlers::logs).options(handlers::preflight))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn preflight_is_no_content() {
        let response = create_router(AppState::new())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "3600");
    }

    #[tokio::test]
    async fn health_reports_missing_collaborators() {
        let response = create_router(AppState::new())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn bad_request_still_carries_cors_header() {
        let response = create_router(AppState::new())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/analyze")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}

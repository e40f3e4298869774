//! HTTP-facing error type.
//!
//! Every variant renders a JSON body; 5xx variants are logged here so
//! handlers only need `?`.

use axum::Json;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Message for segregation requests when no vision client exists.
pub const VISION_UNAVAILABLE: &str = "Vision client failed to initialize.";

/// Message for store-backed requests when no store exists.
pub const STORE_UNAVAILABLE: &str = "Document store failed to initialize. Check logs.";

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request.
    #[error("{0}")]
    BadRequest(String),

    /// A collaborator needed by this request was not constructed at startup.
    #[error("{0}")]
    ClientUnavailable(&'static str),

    /// The request body could not be read (too large, aborted).
    #[error("{message}")]
    Body { status: StatusCode, message: String },

    /// The requested record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Failure while recording a fullness reading.
    #[error("fill estimation failed: {0}")]
    Fullness(String),

    /// Any other handler failure.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::Body { status, message } => (status, json!({ "error": message })),
            ApiError::ClientUnavailable(message) => {
                tracing::error!(reason = message, "Request needs a client that failed to initialize");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "status": "Error", "message": message }),
                )
            }
            ApiError::Fullness(details) => {
                tracing::error!(error = %details, "Unexpected error in fullness handler");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Fill Estimation server-side error.", "details": details }),
                )
            }
            ApiError::Internal(details) => {
                tracing::error!(error = %details, "Unexpected error while processing request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "General server error during request processing.",
                        "details": details,
                    }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

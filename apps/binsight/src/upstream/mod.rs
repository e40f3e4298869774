//! # Upstream Clients
//!
//! The third-party services Binsight consumes:
//! - [`LabelDetector`]: image -> ranked labels (Cloud Vision)
//! - [`GenerativeModel`]: image + instructions -> free-form text (Gemini)
//!
//! Both are traits so the HTTP layer can run against fakes in tests.

mod gemini;
mod vision;

pub use gemini::{DEFAULT_MODEL, DEFAULT_MODEL_ENDPOINT, GeminiClient};
pub use vision::{CloudVisionClient, DEFAULT_VISION_ENDPOINT};

use async_trait::async_trait;
use binsight_core::Label;
use std::time::Duration;
use thiserror::Error;

/// Errors from an upstream call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS, or timeout failure.
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status.
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The service answered 2xx but reported an error in the body.
    #[error("{service} reported an error: {message}")]
    Reported {
        service: &'static str,
        message: String,
    },

    /// The body did not have the expected shape.
    #[error("{service} returned an undecodable body: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

/// Detects labels in an image.
#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Labels in upstream order, descriptions lower-cased.
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<Label>, UpstreamError>;
}

/// One multimodal generation call.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub image: &'a [u8],
    pub mime: &'a str,
}

/// Generates text from an image and instructions.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// The model's text reply. May be empty.
    async fn generate(&self, request: ModelRequest<'_>) -> Result<String, UpstreamError>;
}

/// Build the shared HTTP client for upstream calls.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("binsight/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send a prepared request and return the body of a 2xx response.
async fn send(service: &'static str, request: reqwest::RequestBuilder) -> Result<String, UpstreamError> {
    let transport = |source| UpstreamError::Transport { service, source };

    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    let body = response.text().await.map_err(transport)?;

    if !status.is_success() {
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

//! Cloud Vision `images:annotate` client (label detection only).

use super::{LabelDetector, UpstreamError, send};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use binsight_core::Label;
use serde::Deserialize;
use serde_json::json;

const SERVICE: &str = "vision";

/// Default public endpoint.
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// How many labels to ask for.
const MAX_LABELS: u32 = 10;

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    error: Option<RpcStatus>,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Label detection over the Cloud Vision REST API, authenticated by API key.
#[derive(Debug, Clone)]
pub struct CloudVisionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl CloudVisionClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl LabelDetector for CloudVisionClient {
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<Label>, UpstreamError> {
        let body = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [{ "type": "LABEL_DETECTION", "maxResults": MAX_LABELS }],
            }]
        });

        let request = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body);
        let text = send(SERVICE, request).await?;

        let parsed: AnnotateResponse =
            serde_json::from_str(&text).map_err(|e| UpstreamError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        // An empty `responses` array means no labels, not a failure.
        let image_response = parsed.responses.into_iter().next().unwrap_or_default();
        if let Some(status) = image_response.error {
            return Err(UpstreamError::Reported {
                service: SERVICE,
                message: format!("code {}: {}", status.code, status.message),
            });
        }

        Ok(image_response
            .label_annotations
            .into_iter()
            .map(|a| Label::new(a.description, a.score))
            .collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Gemini `generateContent` client.
//!
//! Only the reply text is kept. A reply with no candidates, no content, or
//! no text parts comes back as an empty string; deciding whether that is
//! usable is the caller's job.

use super::{GenerativeModel, ModelRequest, UpstreamError, send};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;

const SERVICE: &str = "model";

/// Default public endpoint (Generative Language API).
pub const DEFAULT_MODEL_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Gemini over REST, authenticated by API key.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<String, UpstreamError> {
        let body = json!({
            "systemInstruction": { "parts": [{ "text": request.system }] },
            "contents": [{
                "role": "user",
                "parts": [
                    { "inlineData": { "mimeType": request.mime, "data": STANDARD.encode(request.image) } },
                    { "text": request.prompt },
                ],
            }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let http = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body);
        let text = send(SERVICE, http).await?;

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| UpstreamError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(parsed.into_text())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::upstream::http_client;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REQUEST: ModelRequest<'static> = ModelRequest {
        system: "system",
        prompt: "prompt",
        image: b"img",
        mime: "image/png",
    };

    fn client_for(server: &MockServer) -> GeminiClient {
        let http = http_client(Duration::from_secs(5)).unwrap();
        GeminiClient::new(http, server.uri(), "gemini-test", "test-key")
    }

    #[tokio::test]
    async fn joins_text_parts_of_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    { "content": { "parts": [
                        { "text": "{\"fill_percentage\": " },
                        { "text": "40, \"reason\": \"ok\"}" }
                    ] } },
                    { "content": { "parts": [{ "text": "ignored" }] } }
                ]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).generate(REQUEST).await.unwrap();
        assert_eq!(text, "{\"fill_percentage\": 40, \"reason\": \"ok\"}");
    }

    #[tokio::test]
    async fn blocked_reply_yields_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let text = client_for(&server).generate(REQUEST).await.unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn unimplemented_endpoint_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(501))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(REQUEST).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 501, .. }));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(REQUEST).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Decode { .. }));
    }
}

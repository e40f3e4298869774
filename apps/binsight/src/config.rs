//! Runtime configuration and collaborator construction.
//!
//! Settings come from flags with environment fallbacks. Collaborators
//! that cannot be built are logged and left out of the [`AppState`];
//! the server still starts and answers 500 for requests that need them.

use crate::api::AppState;
use crate::upstream::{CloudVisionClient, GeminiClient, http_client};
use crate::upstream::{DEFAULT_MODEL, DEFAULT_MODEL_ENDPOINT, DEFAULT_VISION_ENDPOINT};
use binsight_core::RedbStore;
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Upstream API settings.
#[derive(Debug, Clone, Args)]
pub struct UpstreamConfig {
    /// API key for the vision and model services
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Label-detection endpoint
    #[arg(long, env = "BINSIGHT_VISION_ENDPOINT", default_value = DEFAULT_VISION_ENDPOINT)]
    pub vision_endpoint: String,

    /// Generative model API base URL
    #[arg(long, env = "BINSIGHT_MODEL_ENDPOINT", default_value = DEFAULT_MODEL_ENDPOINT)]
    pub model_endpoint: String,

    /// Generative model name
    #[arg(long, env = "BINSIGHT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Timeout for each upstream request, in seconds
    #[arg(long, env = "BINSIGHT_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

/// Construct every collaborator that can be constructed.
pub fn build_state(db: &Path, upstream: &UpstreamConfig) -> AppState {
    let mut state = AppState::new();

    match RedbStore::open(db) {
        Ok(store) => {
            tracing::info!(path = %db.display(), "Document store opened");
            state = state.with_store(Arc::new(store));
        }
        Err(e) => {
            tracing::error!(path = %db.display(), error = %e, "Document store failed to initialize");
        }
    }

    let Some(api_key) = upstream.api_key.as_deref().filter(|k| !k.is_empty()) else {
        tracing::error!("No API key configured; vision and model clients are disabled");
        return state;
    };

    let client = match http_client(Duration::from_secs(upstream.timeout_secs)) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "HTTP client failed to initialize");
            return state;
        }
    };

    tracing::info!(
        vision = %upstream.vision_endpoint,
        model = %upstream.model,
        "Upstream clients configured"
    );
    state
        .with_vision(Arc::new(CloudVisionClient::new(
            client.clone(),
            upstream.vision_endpoint.clone(),
            api_key,
        )))
        .with_model(Arc::new(GeminiClient::new(
            client,
            upstream.model_endpoint.clone(),
            upstream.model.clone(),
            api_key,
        )))
}

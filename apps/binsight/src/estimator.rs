//! # Fill Estimator
//!
//! The ordered fallback chain:
//!
//! 1. Generative model, strict JSON reply
//! 2. Keyword heuristics over detected labels
//! 3. Top-label confidence, scaled
//!
//! The first tier that succeeds wins. Tier 1 failures are logged and never
//! reach the caller. Labels are detected once and shared by tiers 2 and 3;
//! if detection fails the chain ends with the zero `unavailable` estimate.

use crate::upstream::{GenerativeModel, LabelDetector, ModelRequest, UpstreamError};
use binsight_core::heuristic::{confidence_estimate, keyword_estimate, unavailable};
use binsight_core::media::sniff_mime;
use binsight_core::reply::parse_reply;
use binsight_core::{FillEstimate, Label, ReplyError};
use thiserror::Error;

/// System instruction for the model tier.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert waste level estimator. Analyze the image and \
determine the fill percentage of the dustbin shown. The output MUST be a single, valid JSON object \
with ONLY two keys: 'fill_percentage' (a number 0 to 100, use whole numbers or one decimal place) \
and 'reason' (a brief justification).";

/// User prompt for the model tier.
pub const PROMPT: &str = "Analyze the interior of the waste bin in the image. Estimate the current \
fill level as a single number (percentage) from 0 to 100. Output ONLY the requested JSON object.";

/// Why a tier produced no estimate.
#[derive(Debug, Error)]
pub enum TierFailure {
    /// The collaborator was not constructed at startup.
    #[error("{0} client is not configured")]
    NotConfigured(&'static str),

    /// The upstream call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The upstream answered, but the answer is unusable.
    #[error(transparent)]
    Reply(#[from] ReplyError),

    /// No keyword matched.
    #[error("no label matched a fill keyword")]
    NoMatch,
}

impl TierFailure {
    /// Short tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TierFailure::NotConfigured(_) => "not_configured",
            TierFailure::Upstream(_) => "upstream",
            TierFailure::Reply(_) => "bad_reply",
            TierFailure::NoMatch => "no_match",
        }
    }
}

/// Tier 1: ask the model.
pub async fn model_tier(
    model: Option<&dyn GenerativeModel>,
    image: &[u8],
) -> Result<FillEstimate, TierFailure> {
    let model = model.ok_or(TierFailure::NotConfigured("model"))?;
    let text = model
        .generate(ModelRequest {
            system: SYSTEM_INSTRUCTION,
            prompt: PROMPT,
            image,
            mime: sniff_mime(image),
        })
        .await?;
    Ok(parse_reply(&text)?)
}

/// Tier 2: keyword table over labels.
pub fn keyword_tier(labels: &[Label]) -> Result<FillEstimate, TierFailure> {
    keyword_estimate(labels).ok_or(TierFailure::NoMatch)
}

/// Tier 3: top-label confidence. Always yields an estimate.
pub fn confidence_tier(labels: &[Label]) -> Result<FillEstimate, TierFailure> {
    Ok(confidence_estimate(labels))
}

/// Run the chain and return the first estimate produced.
pub async fn estimate_fill(
    model: Option<&dyn GenerativeModel>,
    vision: Option<&dyn LabelDetector>,
    image: &[u8],
) -> FillEstimate {
    match model_tier(model, image).await {
        Ok(estimate) => return estimate,
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "Model tier failed; falling back to labels");
        }
    }

    let labels = match detect(vision, image).await {
        Ok(labels) => labels,
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "Label detection failed; no estimate");
            return unavailable();
        }
    };

    let tiers: [fn(&[Label]) -> Result<FillEstimate, TierFailure>; 2] =
        [keyword_tier, confidence_tier];
    for tier in tiers {
        match tier(&labels) {
            Ok(estimate) => return estimate,
            Err(err) => tracing::debug!(kind = err.kind(), "Label tier produced no estimate"),
        }
    }
    unavailable()
}

async fn detect(vision: Option<&dyn LabelDetector>, image: &[u8]) -> Result<Vec<Label>, TierFailure> {
    let vision = vision.ok_or(TierFailure::NotConfigured("vision"))?;
    Ok(vision.detect_labels(image).await?)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use binsight_core::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedModel {
        reply: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn replying(text: &'static str) -> Self {
            Self { reply: Ok(text), calls: AtomicUsize::new(0) }
        }

        fn failing(status: u16) -> Self {
            Self { reply: Err(status), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, request: ModelRequest<'_>) -> Result<String, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(request.system, SYSTEM_INSTRUCTION);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(UpstreamError::Status {
                    service: "model",
                    status,
                    body: String::new(),
                }),
            }
        }
    }

    struct ScriptedVision(Option<Vec<Label>>);

    #[async_trait]
    impl LabelDetector for ScriptedVision {
        async fn detect_labels(&self, _image: &[u8]) -> Result<Vec<Label>, UpstreamError> {
            self.0.clone().ok_or(UpstreamError::Reported {
                service: "vision",
                message: "unavailable".to_string(),
            })
        }
    }

    fn vision(names: &[(&str, f64)]) -> ScriptedVision {
        ScriptedVision(Some(names.iter().map(|(n, s)| Label::new(n, *s)).collect()))
    }

    #[tokio::test]
    async fn model_reply_wins() {
        let model = ScriptedModel::replying(r#"{"fill_percentage": 64, "reason": "bags"}"#);
        let estimate = estimate_fill(Some(&model), Some(&vision(&[("overflowing bin", 0.9)])), b"x").await;
        assert_eq!(estimate.method, Method::Llm);
        assert_eq!(estimate.level, 64.0);
        assert_eq!(estimate.reason, "bags");
    }

    #[tokio::test]
    async fn invalid_json_falls_back_to_keywords() {
        let model = ScriptedModel::replying("about half, I think");
        let estimate = estimate_fill(Some(&model), Some(&vision(&[("overflowing bin", 0.9)])), b"x").await;
        assert_eq!(estimate.method, Method::HeuristicFallback);
        assert_eq!(estimate.level, 98.0);
        assert!(estimate.reason.contains("overflowing bin"));
    }

    #[tokio::test]
    async fn model_is_called_once_on_failure() {
        let model = ScriptedModel::failing(503);
        let estimate = estimate_fill(Some(&model), Some(&vision(&[("lid", 0.42)])), b"x").await;
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(estimate.method, Method::ConfidenceFallback);
        assert!((estimate.level - 42.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_model_uses_labels() {
        let estimate = estimate_fill(None, Some(&vision(&[("garbage", 0.7)])), b"x").await;
        assert_eq!(estimate.method, Method::HeuristicFallback);
        assert_eq!(estimate.level, 60.0);
    }

    #[tokio::test]
    async fn failed_detection_is_zero() {
        let model = ScriptedModel::replying("");
        let estimate = estimate_fill(Some(&model), Some(&ScriptedVision(None)), b"x").await;
        assert_eq!(estimate.method, Method::Unavailable);
        assert_eq!(estimate.level, 0.0);
    }

    #[tokio::test]
    async fn nothing_configured_is_zero() {
        let estimate = estimate_fill(None, None, b"x").await;
        assert_eq!(estimate.method, Method::Unavailable);
        assert_eq!(estimate.level, 0.0);
    }

    #[tokio::test]
    async fn model_tier_distinguishes_failures() {
        let missing = model_tier(None, b"x").await.unwrap_err();
        assert_eq!(missing.kind(), "not_configured");

        let down = model_tier(Some(&ScriptedModel::failing(500)), b"x").await.unwrap_err();
        assert_eq!(down.kind(), "upstream");

        let garbage = model_tier(Some(&ScriptedModel::replying("{}")), b"x").await.unwrap_err();
        assert!(matches!(garbage, TierFailure::Reply(ReplyError::MissingField)));
    }
}

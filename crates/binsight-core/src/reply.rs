//! # Model Reply Parsing
//!
//! The generative model is instructed to answer with a single JSON object:
//!
//! ```text
//! {"fill_percentage": 72.5, "reason": "Bin is mostly full of bags."}
//! ```
//!
//! Anything else is a [`ReplyError`], and the caller moves on to the
//! label-based tiers.

use crate::estimate::{FillEstimate, Method};
use serde_json::Value;
use thiserror::Error;

/// Reason used when the model omits one.
pub const DEFAULT_REASON: &str = "Visual estimation provided by the model.";

/// Ways a model reply can fail to yield an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    /// The model returned no text.
    #[error("model returned empty text")]
    Empty,

    /// The text is not a JSON object.
    #[error("model reply is not a JSON object: {0}")]
    Malformed(String),

    /// The object lacks `fill_percentage`.
    #[error("model reply has no fill_percentage")]
    MissingField,

    /// `fill_percentage` is present but not a number.
    #[error("model reply fill_percentage is not a number: {0}")]
    NotNumeric(String),
}

/// Strip a surrounding Markdown code fence, if any.
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a model reply into an [`Method::Llm`] estimate.
pub fn parse_reply(text: &str) -> Result<FillEstimate, ReplyError> {
    let body = strip_fence(text);
    if body.is_empty() {
        return Err(ReplyError::Empty);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| ReplyError::Malformed(e.to_string()))?;
    let object = match value {
        Value::Object(object) => object,
        other => return Err(ReplyError::Malformed(format!("expected object, got {other}"))),
    };

    let level = match object.get("fill_percentage") {
        None | Some(Value::Null) => return Err(ReplyError::MissingField),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ReplyError::NotNumeric(n.to_string()))?,
        Some(other) => return Err(ReplyError::NotNumeric(other.to_string())),
    };

    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(DEFAULT_REASON);

    Ok(FillEstimate::new(level, reason, Method::Llm))
}

// =============================================================================
// TESTS
// =============================================================================

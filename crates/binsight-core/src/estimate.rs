//! # Fill Estimates
//!
//! A fill estimate is a percentage, a short justification, and the
//! provenance tag of the tier that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fill level (percent) at or above which a bin raises an alert.
pub const ALERT_THRESHOLD: f64 = 90.0;

/// Lowest valid fill level.
pub const MIN_LEVEL: f64 = 0.0;

/// Highest valid fill level.
pub const MAX_LEVEL: f64 = 100.0;

/// Which tier produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Generative vision-language model.
    Llm,
    /// Keyword table over detected labels.
    HeuristicFallback,
    /// Top label confidence, scaled.
    ConfidenceFallback,
    /// Label detection failed; no estimate could be made.
    Unavailable,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Llm => "llm",
            Method::HeuristicFallback => "heuristic-fallback",
            Method::ConfidenceFallback => "confidence-fallback",
            Method::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fill-level estimate with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEstimate {
    /// Percentage in [0, 100].
    pub level: f64,
    /// Short justification.
    pub reason: String,
    /// Tier that produced the estimate.
    pub method: Method,
}

impl FillEstimate {
    /// Create an estimate. The level is clamped to [0, 100].
    #[must_use]
    pub fn new(level: f64, reason: impl Into<String>, method: Method) -> Self {
        Self {
            level: clamp_level(level),
            reason: reason.into(),
            method,
        }
    }

    /// Whether this estimate raises an alert.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        is_alert(self.level)
    }
}

/// Clamp a level into [0, 100]. NaN maps to 0.
#[must_use]
pub fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        MIN_LEVEL
    } else {
        level.clamp(MIN_LEVEL, MAX_LEVEL)
    }
}

/// Alert rule: `level >= ALERT_THRESHOLD`.
#[must_use]
pub fn is_alert(level: f64) -> bool {
    level >= ALERT_THRESHOLD
}

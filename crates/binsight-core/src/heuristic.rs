//! # Label Heuristics
//!
//! The fallback tiers that estimate fill level from detected labels alone.
//!
//! - Keyword tier: first label (in upstream order) containing a table
//!   keyword (in table order) decides the level.
//! - Confidence tier: when no keyword matches, the top label's score is
//!   scaled to a percentage and clamped to [5, 100].
//! - When labels could not be detected at all, [`unavailable`] reports 0.

use crate::estimate::{FillEstimate, MAX_LEVEL, Method};
use crate::{Label, top_score};

/// Floor applied to confidence-scaled estimates.
pub const CONFIDENCE_FLOOR: f64 = 5.0;

/// Keyword -> fill level, most specific phrasing first.
///
/// Order matters: "half-full" must be seen before "full", and
/// "almost empty" before "empty".
pub const FILL_HEURISTICS: &[(&str, f64)] = &[
    ("almost empty", 5.0),
    ("empty", 5.0),
    ("half-full", 50.0),
    ("half", 50.0),
    ("almost full", 90.0),
    ("overflowing", 98.0),
    ("overflow", 98.0),
    ("full", 95.0),
    ("trash", 60.0),
    ("garbage", 60.0),
    ("waste", 60.0),
];

/// Reason attached to [`unavailable`].
pub const UNAVAILABLE_REASON: &str = "No estimate available: label detection failed.";

/// Keyword tier. `None` when no label contains a keyword.
#[must_use]
pub fn keyword_estimate(labels: &[Label]) -> Option<FillEstimate> {
    labels.iter().find_map(|label| {
        FILL_HEURISTICS
            .iter()
            .find(|(keyword, _)| label.description.contains(keyword))
            .map(|&(_, level)| {
                FillEstimate::new(
                    level,
                    format!(
                        "Fallback vision heuristic matched label '{}'.",
                        label.description
                    ),
                    Method::HeuristicFallback,
                )
            })
    })
}

/// Confidence tier: top score as a percentage, clamped to [5, 100].
#[must_use]
pub fn confidence_estimate(labels: &[Label]) -> FillEstimate {
    let score = top_score(labels);
    let level = (score * 100.0).clamp(CONFIDENCE_FLOOR, MAX_LEVEL);
    let level = if level.is_nan() { CONFIDENCE_FLOOR } else { level };
    FillEstimate::new(
        level,
        format!("Fallback vision confidence-based estimate ({score:.2})."),
        Method::ConfidenceFallback,
    )
}

/// Keyword tier, then confidence tier.
#[must_use]
pub fn label_estimate(labels: &[Label]) -> FillEstimate {
    keyword_estimate(labels).unwrap_or_else(|| confidence_estimate(labels))
}

/// The zero estimate used when labels could not be obtained.
#[must_use]
pub fn unavailable() -> FillEstimate {
    FillEstimate::new(0.0, UNAVAILABLE_REASON, Method::Unavailable)
}

// =============================================================================
// TESTS
// =============================================================================

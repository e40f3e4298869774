//! # Category Classifier
//!
//! Maps detected labels to a waste category.
//!
//! Matching rules:
//! - Labels are scanned in the order the detector returned them
//! - For each label, keywords are scanned in table order
//! - A keyword matches when it is a substring of the label
//! - The first (label, keyword) hit decides; no hit means `UNCATEGORIZED`

use crate::{Label, top_score};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of labels echoed back in a classification.
pub const REPORTED_LABELS: usize = 5;

/// Waste categories a bin image can be sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Plastic,
    Paper,
    Organic,
    Metal,
    Glass,
    Uncategorized,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 6] = [
        Category::Plastic,
        Category::Paper,
        Category::Organic,
        Category::Metal,
        Category::Glass,
        Category::Uncategorized,
    ];

    /// Upper-case wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Plastic => "PLASTIC",
            Category::Paper => "PAPER",
            Category::Organic => "ORGANIC",
            Category::Metal => "METAL",
            Category::Glass => "GLASS",
            Category::Uncategorized => "UNCATEGORIZED",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a category name that is not one of the six known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Parse a category name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Keyword table, in match priority order.
pub const SEGREGATION_RULES: &[(&str, Category)] = &[
    ("plastic", Category::Plastic),
    ("bottle", Category::Plastic),
    ("container", Category::Plastic),
    ("paper", Category::Paper),
    ("cardboard", Category::Paper),
    ("banana", Category::Organic),
    ("food", Category::Organic),
    ("fruit", Category::Organic),
    ("can", Category::Metal),
    ("tin", Category::Metal),
    ("glass", Category::Glass),
    ("jar", Category::Glass),
    ("cup", Category::Glass),
];

/// Result of classifying a label set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The decided category.
    pub category: Category,
    /// The first [`REPORTED_LABELS`] label descriptions.
    pub detected_labels: Vec<String>,
    /// Score of the first label (0 when there are no labels).
    pub confidence: f64,
}

impl Classification {
    /// Confidence rounded to four decimal places.
    #[must_use]
    pub fn rounded_confidence(&self) -> f64 {
        (self.confidence * 10_000.0).round() / 10_000.0
    }
}

/// Find the category for a label set.
#[must_use]
pub fn categorize(labels: &[Label]) -> Category {
    labels
        .iter()
        .find_map(|label| {
            SEGREGATION_RULES
                .iter()
                .find(|(keyword, _)| label.description.contains(keyword))
                .map(|&(_, category)| category)
        })
        .unwrap_or(Category::Uncategorized)
}

/// Classify a label set, keeping the reported labels and top confidence.
#[must_use]
pub fn classify(labels: &[Label]) -> Classification {
    Classification {
        category: categorize(labels),
        detected_labels: labels
            .iter()
            .take(REPORTED_LABELS)
            .map(|l| l.description.clone())
            .collect(),
        confidence: top_score(labels),
    }
}

// =============================================================================
// TESTS
// =============================================================================

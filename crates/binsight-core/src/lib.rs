//! # Binsight Core
//!
//! The decision logic behind the Binsight endpoint.
//!
//! This crate is synchronous and network-free. Upstream services (label
//! detection, generative model) live in the app layer; they hand their
//! normalized output to the functions here.
//!
//! ## Modules
//!
//! - [`category`]: label -> waste category classifier
//! - [`estimate`]: fill estimates, provenance tags, the alert rule
//! - [`heuristic`]: label-driven fallback tiers
//! - [`reply`]: parsing of generative-model replies
//! - [`record`]: log and live-status records
//! - [`storage`]: document stores for those records
//! - [`media`]: image MIME sniffing

pub mod category;
pub mod estimate;
pub mod heuristic;
pub mod media;
pub mod record;
pub mod reply;
pub mod storage;

pub use category::{Category, Classification, classify};
pub use estimate::{ALERT_THRESHOLD, FillEstimate, Method, is_alert};
pub use record::{BinSlot, BinStatus, LogEntry, LogRecord};
pub use reply::ReplyError;
pub use storage::{DocumentId, DocumentStore, MemoryStore, RedbStore, StoreError};

use serde::{Deserialize, Serialize};

/// A label reported by an image label-detection service.
///
/// Descriptions are lower-cased on construction so that keyword matching
/// never depends on upstream casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Lower-cased label text.
    pub description: String,
    /// Upstream confidence score, nominally in [0, 1].
    pub score: f64,
}

impl Label {
    /// Create a label, normalizing the description to lower case.
    #[must_use]
    pub fn new(description: impl AsRef<str>, score: f64) -> Self {
        Self {
            description: description.as_ref().to_lowercase(),
            score,
        }
    }
}

/// Score of the first label, or 0 when there are none.
#[must_use]
pub fn top_score(labels: &[Label]) -> f64 {
    labels.first().map_or(0.0, |l| l.score)
}

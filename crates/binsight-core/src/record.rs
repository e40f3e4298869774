//! # Records
//!
//! What a fullness reading leaves behind:
//! - a [`LogRecord`] appended to the history (never mutated),
//! - a [`BinStatus`] overwriting the live state of its [`BinSlot`].

use crate::category::{Category, UnknownCategory};
use crate::estimate::{FillEstimate, Method};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status written on every log record.
pub const PROCESSED: &str = "Processed";

/// Wire name of the unassigned slot.
pub const BIN_CHECK: &str = "BIN_CHECK";

/// The key a fill reading is filed under.
///
/// Readings that do not name a bin go to the shared `BIN_CHECK` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BinSlot {
    #[default]
    Check,
    Sorted(Category),
}

impl BinSlot {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BinSlot::Check => BIN_CHECK,
            BinSlot::Sorted(category) => category.as_str(),
        }
    }
}

impl fmt::Display for BinSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BinSlot {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(BIN_CHECK) {
            Ok(BinSlot::Check)
        } else {
            s.parse().map(BinSlot::Sorted)
        }
    }
}

impl From<BinSlot> for String {
    fn from(slot: BinSlot) -> Self {
        slot.as_str().to_string()
    }
}

impl TryFrom<String> for BinSlot {
    type Error = UnknownCategory;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Historical log entry for one fullness reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub category: BinSlot,
    pub bin_level_recorded: f64,
    pub alert_raised: bool,
    pub reasoning: String,
    pub status: String,
    pub method: Method,
}

impl LogRecord {
    /// Build the log record for an estimate filed under `slot`.
    #[must_use]
    pub fn from_estimate(slot: BinSlot, estimate: &FillEstimate, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            category: slot,
            bin_level_recorded: estimate.level,
            alert_raised: estimate.is_alert(),
            reasoning: estimate.reason.clone(),
            status: PROCESSED.to_string(),
            method: estimate.method,
        }
    }
}

/// A log record together with its document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub document_id: String,
    #[serde(flatten)]
    pub record: LogRecord,
}

/// Latest known state of one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinStatus {
    pub level: f64,
    pub last_update: DateTime<Utc>,
    pub is_full: bool,
    pub category: BinSlot,
    pub method: Method,
}

impl BinStatus {
    #[must_use]
    pub fn from_estimate(slot: BinSlot, estimate: &FillEstimate, last_update: DateTime<Utc>) -> Self {
        Self {
            level: estimate.level,
            last_update,
            is_full: estimate.is_alert(),
            category: slot,
            method: estimate.method,
        }
    }
}

//! # Storage Module
//!
//! Document stores for the fullness history and the live bin status.
//!
//! Two collections:
//! - **logs**: append-only, keyed by a monotonically increasing id
//! - **status**: one record per [`BinSlot`], overwritten on each reading
//!
//! Implementations:
//! - [`RedbStore`]: embedded redb database (ACID, crash safe)
//! - [`MemoryStore`]: `BTreeMap`-backed, for tests and dry runs

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::record::{BinSlot, BinStatus, LogEntry, LogRecord};
use std::fmt;
use thiserror::Error;

/// Errors from a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Embedded database failure.
    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    /// Record (de)serialization failure.
    #[error("record encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    /// Every log id has been used.
    #[error("log id space exhausted")]
    IdsExhausted,

    /// A lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Lift any redb error into [`StoreError`].
pub(crate) fn database<E: Into<redb::Error>>(err: E) -> StoreError {
    StoreError::Database(err.into())
}

/// Id of an appended log document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Persistence for fullness readings.
///
/// Writes are independent: a successful `append_log` is not rolled back if
/// the following `put_status` fails.
pub trait DocumentStore: Send + Sync {
    /// Append a record to the history and return its id.
    fn append_log(&self, record: &LogRecord) -> Result<DocumentId, StoreError>;

    /// Overwrite the live status of `status.category`.
    fn put_status(&self, status: &BinStatus) -> Result<(), StoreError>;

    /// Live status of one slot.
    fn status(&self, slot: BinSlot) -> Result<Option<BinStatus>, StoreError>;

    /// Live status of every slot that has one, ordered by slot name.
    fn statuses(&self) -> Result<Vec<BinStatus>, StoreError>;

    /// The most recent `limit` log records, newest first.
    fn recent_logs(&self, limit: usize) -> Result<Vec<LogEntry>, StoreError>;
}

fn entry(id: DocumentId, record: LogRecord) -> LogEntry {
    LogEntry {
        document_id: id.to_string(),
        record,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn document_id_is_fixed_width_hex() {
        assert_eq!(DocumentId(1).to_string(), "0000000000000001");
        assert_eq!(DocumentId(255).to_string(), "00000000000000ff");
    }
}

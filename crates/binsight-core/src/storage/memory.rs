//! In-memory document store.

use super::{DocumentId, DocumentStore, StoreError, entry};
use crate::record::{BinSlot, BinStatus, LogEntry, LogRecord};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Collections {
    logs: BTreeMap<DocumentId, LogRecord>,
    status: BTreeMap<String, BinStatus>,
}

/// `BTreeMap`-backed store. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Number of log records.
    pub fn log_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.logs.len())
    }
}

impl DocumentStore for MemoryStore {
    fn append_log(&self, record: &LogRecord) -> Result<DocumentId, StoreError> {
        let mut inner = self.lock()?;
        let next = match inner.logs.last_key_value() {
            None => 1,
            Some((id, _)) => id.0.checked_add(1).ok_or(StoreError::IdsExhausted)?,
        };
        let id = DocumentId(next);
        inner.logs.insert(id, record.clone());
        Ok(id)
    }

    fn put_status(&self, status: &BinStatus) -> Result<(), StoreError> {
        self.lock()?
            .status
            .insert(status.category.as_str().to_string(), status.clone());
        Ok(())
    }

    fn status(&self, slot: BinSlot) -> Result<Option<BinStatus>, StoreError> {
        Ok(self.lock()?.status.get(slot.as_str()).cloned())
    }

    fn statuses(&self) -> Result<Vec<BinStatus>, StoreError> {
        Ok(self.lock()?.status.values().cloned().collect())
    }

    fn recent_logs(&self, limit: usize) -> Result<Vec<LogEntry>, StoreError> {
        Ok(self
            .lock()?
            .logs
            .iter()
            .rev()
            .take(limit)
            .map(|(id, record)| entry(*id, record.clone()))
            .collect())
    }
}

//! redb-backed document store.
//!
//! Tables:
//! - `logs`: `u64` id -> postcard-encoded [`LogRecord`]
//! - `bin_status`: slot name -> postcard-encoded [`BinStatus`]

use super::{DocumentId, DocumentStore, StoreError, database, entry};
use crate::record::{BinSlot, BinStatus, LogEntry, LogRecord};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

const LOGS: TableDefinition<u64, &[u8]> = TableDefinition::new("logs");
const BIN_STATUS: TableDefinition<&str, &[u8]> = TableDefinition::new("bin_status");

/// Embedded, file-backed store.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open the database at `path`, creating it and its tables if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(database)?;

        // Tables must exist before the first read transaction opens them.
        let txn = db.begin_write().map_err(database)?;
        txn.open_table(LOGS).map_err(database)?;
        txn.open_table(BIN_STATUS).map_err(database)?;
        txn.commit().map_err(database)?;

        Ok(Self { db })
    }
}

impl DocumentStore for RedbStore {
    fn append_log(&self, record: &LogRecord) -> Result<DocumentId, StoreError> {
        let bytes = postcard::to_allocvec(record)?;
        let txn = self.db.begin_write().map_err(database)?;
        let id = {
            let mut table = txn.open_table(LOGS).map_err(database)?;
            let last = table.last().map_err(database)?.map(|(key, _)| key.value());
            let next = match last {
                None => 1,
                Some(id) => id.checked_add(1).ok_or(StoreError::IdsExhausted)?,
            };
            table.insert(next, bytes.as_slice()).map_err(database)?;
            next
        };
        txn.commit().map_err(database)?;
        Ok(DocumentId(id))
    }

    fn put_status(&self, status: &BinStatus) -> Result<(), StoreError> {
        let bytes = postcard::to_allocvec(status)?;
        let txn = self.db.begin_write().map_err(database)?;
        {
            let mut table = txn.open_table(BIN_STATUS).map_err(database)?;
            table
                .insert(status.category.as_str(), bytes.as_slice())
                .map_err(database)?;
        }
        txn.commit().map_err(database)?;
        Ok(())
    }

    fn status(&self, slot: BinSlot) -> Result<Option<BinStatus>, StoreError> {
        let txn = self.db.begin_read().map_err(database)?;
        let table = txn.open_table(BIN_STATUS).map_err(database)?;
        let Some(guard) = table.get(slot.as_str()).map_err(database)? else {
            return Ok(None);
        };
        Ok(Some(postcard::from_bytes(guard.value())?))
    }

    fn statuses(&self) -> Result<Vec<BinStatus>, StoreError> {
        let txn = self.db.begin_read().map_err(database)?;
        let table = txn.open_table(BIN_STATUS).map_err(database)?;
        let mut out = Vec::new();
        for item in table.iter().map_err(database)? {
            let (_, value) = item.map_err(database)?;
            out.push(postcard::from_bytes(value.value())?);
        }
        Ok(out)
    }

    fn recent_logs(&self, limit: usize) -> Result<Vec<LogEntry>, StoreError> {
        let txn = self.db.begin_read().map_err(database)?;
        let table = txn.open_table(LOGS).map_err(database)?;
        let mut out = Vec::with_capacity(limit.min(256));
        for item in table.iter().map_err(database)?.rev().take(limit) {
            let (key, value) = item.map_err(database)?;
            let record: LogRecord = postcard::from_bytes(value.value())?;
            out.push(entry(DocumentId(key.value()), record));
        }
        Ok(out)
    }
}

// =============================================================================
// TESTS
// =============================================================================

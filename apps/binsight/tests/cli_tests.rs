//! Integration tests for Binsight CLI commands.
//!
//! Uses tempfile for the on-disk store.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use binsight::api::record_reading;
use binsight::cli::{CliError, cmd_history, cmd_status};
use binsight_core::{BinSlot, Category, FillEstimate, LogEntry, Method, RedbStore};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Record readings into a fresh store and close it again.
fn seed_store(dir: &TempDir, readings: &[(BinSlot, f64)]) -> PathBuf {
    let path = dir.path().join("binsight.redb");
    let store = RedbStore::open(&path).unwrap();
    for (i, (slot, level)) in readings.iter().enumerate() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, u32::try_from(i).unwrap()).unwrap();
        let estimate = FillEstimate::new(*level, "seeded", Method::Llm);
        record_reading(&store, *slot, &estimate, at).unwrap();
    }
    // redb holds a file lock until the database is dropped
    drop(store);
    path
}

fn empty_store(dir: &TempDir) -> PathBuf {
    seed_store(dir, &[])
}

fn parse(output: &str) -> Value {
    serde_json::from_str(output).unwrap()
}

fn history(path: &Path, limit: usize) -> Vec<LogEntry> {
    serde_json::from_str(&cmd_history(path, limit).unwrap()).unwrap()
}

// =============================================================================
// STATUS COMMAND TESTS
// =============================================================================

#[test]
fn test_status_lists_every_slot() {
    let temp = create_temp_dir();
    let path = seed_store(
        &temp,
        &[
            (BinSlot::Check, 40.0),
            (BinSlot::Sorted(Category::Glass), 95.0),
        ],
    );

    let statuses = parse(&cmd_status(&path, None).unwrap());
    let statuses = statuses.as_array().unwrap();
    assert_eq!(statuses.len(), 2);
}

#[test]
fn test_status_single_slot() {
    let temp = create_temp_dir();
    let path = seed_store(
        &temp,
        &[
            (BinSlot::Sorted(Category::Glass), 20.0),
            (BinSlot::Sorted(Category::Glass), 95.0),
        ],
    );

    let status = parse(&cmd_status(&path, Some("glass")).unwrap());
    assert_eq!(status["category"], "GLASS");
    assert_eq!(status["level"], 95.0);
    assert_eq!(status["is_full"], true);
    assert_eq!(status["method"], "llm");
}

#[test]
fn test_status_missing_slot_fails() {
    let temp = create_temp_dir();
    let path = empty_store(&temp);

    let result = cmd_status(&path, Some("BIN_CHECK"));
    assert!(matches!(result, Err(CliError::NoStatus(BinSlot::Check))));
}

#[test]
fn test_status_unknown_slot_fails() {
    let temp = create_temp_dir();
    let path = empty_store(&temp);

    let result = cmd_status(&path, Some("compost"));
    assert!(matches!(result, Err(CliError::Slot(_))));
}

#[test]
fn test_status_empty_store_is_empty_list() {
    let temp = create_temp_dir();
    let path = empty_store(&temp);

    let statuses = parse(&cmd_status(&path, None).unwrap());
    assert_eq!(statuses, Value::Array(Vec::new()));
}

// =============================================================================
// HISTORY COMMAND TESTS
// =============================================================================

#[test]
fn test_history_newest_first() {
    let temp = create_temp_dir();
    let path = seed_store(
        &temp,
        &[
            (BinSlot::Check, 10.0),
            (BinSlot::Check, 50.0),
            (BinSlot::Sorted(Category::Paper), 91.0),
        ],
    );

    let entries = history(&path, 10);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].record.bin_level_recorded, 91.0);
    assert!(entries[0].record.alert_raised);
    assert_eq!(entries[0].record.category, BinSlot::Sorted(Category::Paper));
    assert_eq!(entries[2].record.bin_level_recorded, 10.0);
    assert!(entries[0].document_id > entries[2].document_id);
}

#[test]
fn test_history_respects_limit() {
    let temp = create_temp_dir();
    let path = seed_store(
        &temp,
        &[
            (BinSlot::Check, 10.0),
            (BinSlot::Check, 20.0),
            (BinSlot::Check, 30.0),
        ],
    );

    let entries = history(&path, 2);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].record.bin_level_recorded, 20.0);
}

#[test]
fn test_history_on_new_store_is_empty() {
    let temp = create_temp_dir();
    let path = temp.path().join("fresh.redb");

    assert!(history(&path, 5).is_empty());
    assert!(path.exists());
}

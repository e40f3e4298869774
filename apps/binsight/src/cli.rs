//! # CLI Commands
//!
//! - `serve`: run the HTTP API
//! - `status`: print live bin status as JSON
//! - `history`: print recent fullness readings as JSON

use crate::api::{MAX_LOG_LIMIT, create_router};
use crate::config::{UpstreamConfig, build_state};
use binsight_core::category::UnknownCategory;
use binsight_core::{BinSlot, DocumentStore, RedbStore, StoreError};
use std::path::Path;
use thiserror::Error;
use tokio::net::TcpListener;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid slot: {0}")]
    Slot(#[from] UnknownCategory),

    #[error("no status recorded for {0}")]
    NoStatus(BinSlot),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run the HTTP server until Ctrl+C.
pub async fn cmd_serve(bind: &str, db: &Path, upstream: &UpstreamConfig) -> Result<(), CliError> {
    let state = build_state(db, upstream);
    let app = create_router(state);

    let listener = TcpListener::bind(bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Binsight listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Print one slot's live status, or every slot's when `slot` is `None`.
pub fn cmd_status(db: &Path, slot: Option<&str>) -> Result<String, CliError> {
    let store = RedbStore::open(db)?;
    let output = match slot {
        Some(name) => {
            let slot: BinSlot = name.parse()?;
            let status = store.status(slot)?.ok_or(CliError::NoStatus(slot))?;
            serde_json::to_string_pretty(&status)?
        }
        None => serde_json::to_string_pretty(&store.statuses()?)?,
    };
    println!("{output}");
    Ok(output)
}

/// Print the most recent `limit` readings, newest first.
pub fn cmd_history(db: &Path, limit: usize) -> Result<String, CliError> {
    let store = RedbStore::open(db)?;
    let entries = store.recent_logs(limit.min(MAX_LOG_LIMIT))?;
    let output = serde_json::to_string_pretty(&entries)?;
    println!("{output}");
    Ok(output)
}

//! Persistence service: snapshot load at startup, periodic flush when dirty.
//!
//! DESIGN
//! ======
//! The book table is the JSON object served by `GET /api/books`. A
//! background task wakes every flush interval and, if a mutation marked
//! the state dirty, clears the flag, snapshots the table under a read lock
//! and writes it out. The previous file is copied to `<file>.backup` first,
//! and the new one is written beside it and renamed into place so a crash
//! never leaves a half-written snapshot.
//!
//! ERROR HANDLING
//! ==============
//! A failed flush is logged and the dirty flag is restored, so the next
//! tick retries.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;

use canvas::doc::{Item, Listing};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not a book table: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_PERSIST_IO",
            Self::Json(_) => "E_PERSIST_JSON",
        }
    }
}

/// Read the book table from `path`. A missing file is an empty table.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_snapshot(path: &Path) -> Result<Vec<Item>, PersistError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no snapshot, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    let listing: Listing = serde_json::from_slice(&bytes)?;
    info!(path = %path.display(), count = listing.0.len(), "snapshot loaded");
    Ok(listing.into_items())
}

/// Write `listing` to `path`, backing up the previous snapshot first.
///
/// # Errors
///
/// Returns an error if the backup, write or rename fails.
pub async fn write_snapshot(path: &Path, listing: &Listing) -> Result<(), PersistError> {
    let body = serde_json::to_vec_pretty(listing)?;
    if tokio::fs::try_exists(path).await? {
        tokio::fs::copy(path, with_suffix(path, ".backup")).await?;
    }
    let staging = with_suffix(path, ".tmp");
    tokio::fs::write(&staging, body).await?;
    tokio::fs::rename(&staging, path).await?;
    Ok(())
}

/// `path` with `suffix` appended to its file name.
#[must_use]
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Flush the table if a mutation marked it dirty. Returns whether a
/// snapshot was written.
///
/// # Errors
///
/// Returns the write error; the state is marked dirty again.
pub async fn flush_if_dirty(state: &AppState) -> Result<bool, PersistError> {
    if !state.dirty.swap(false, Ordering::AcqRel) {
        return Ok(false);
    }
    let listing = state.listing().await;
    if let Err(e) = write_snapshot(&state.data_path, &listing).await {
        state.mark_dirty();
        return Err(e);
    }
    info!(count = listing.0.len(), "snapshot flushed");
    Ok(true)
}

/// Spawn the background persistence task. Returns a handle for shutdown.
pub fn spawn_persistence_task(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = flush_if_dirty(&state).await {
                error!(error = %e, code = e.error_code(), "persistence flush failed");
            }
        }
    })
}

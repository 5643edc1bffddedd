//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! The book table lives in memory in store order and is the source of
//! truth while the service runs; mutations set `dirty` and the
//! persistence task writes the table back to the snapshot file. Display
//! settings are held in memory only.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use canvas::doc::{Item, ItemStore, Listing};
use canvas::settings::DisplaySettings;
use tokio::sync::RwLock;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<RwLock<ItemStore>>,
    pub settings: Arc<RwLock<DisplaySettings>>,
    /// Set by every book mutation, cleared by a successful flush.
    pub dirty: Arc<AtomicBool>,
    /// Snapshot file the book table is flushed to.
    pub data_path: PathBuf,
}

impl AppState {
    #[must_use]
    pub fn new(books: Vec<Item>, data_path: PathBuf) -> Self {
        let mut store = ItemStore::new();
        store.load_snapshot(books);
        Self {
            books: Arc::new(RwLock::new(store)),
            settings: Arc::new(RwLock::new(DisplaySettings::default())),
            dirty: Arc::new(AtomicBool::new(false)),
            data_path,
        }
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// The book table in wire shape, in store order.
    pub async fn listing(&self) -> Listing {
        self.books.read().await.iter().collect()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

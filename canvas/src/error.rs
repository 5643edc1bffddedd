//! Editor error kinds.
//!
//! None of these is fatal. Validation errors block a save and are shown to
//! the user; store errors carry the store's own message and leave the
//! session untouched so the user can retry; a stale surface just defers
//! the operation until the image has been measured.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::doc::ItemId;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("four corner points required")]
    Incomplete { placed: usize },
    #[error("no item selected")]
    NoSelection,
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),
    #[error("corner index out of range: {0}")]
    IndexOutOfRange(usize),
    #[error("surface has not been measured yet")]
    StaleSurface,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EditorError {
    /// Stable machine-readable code for the host UI.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Incomplete { .. } => "E_INCOMPLETE_QUAD",
            Self::NoSelection => "E_NO_SELECTION",
            Self::UnknownItem(_) => "E_UNKNOWN_ITEM",
            Self::IndexOutOfRange(_) => "E_INDEX_OUT_OF_RANGE",
            Self::StaleSurface => "E_STALE_SURFACE",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Whether the host should show this error to the user.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::StaleSurface)
    }
}

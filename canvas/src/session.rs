//! The editor session: which item is selected and its in-progress edits.
//!
//! A session exists exactly while an item is selected, so the controller
//! holds an `Option<Session>`; `None` is the idle state.

use crate::doc::{Item, ItemId};
use crate::points::PointSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub item_id: ItemId,
    /// Label as currently typed; sent with the next save.
    pub label: String,
    pub points: PointSet,
}

impl Session {
    /// Start editing `item`: its stored corners, or corners synthesized
    /// from its region, with the cursor on the first.
    #[must_use]
    pub fn for_item(item: &Item) -> Self {
        Self {
            item_id: item.id.clone(),
            label: item.label.clone(),
            points: PointSet::from_quad(item.geometry.to_quad()),
        }
    }

    #[must_use]
    pub fn is_for(&self, id: &str) -> bool {
        self.item_id == id
    }
}

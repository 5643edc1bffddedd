//! Input model: modifier keys, mouse buttons, keys, and the gesture state
//! tracked between pointer-down and pointer-up.
//!
//! A press becomes either a click (released without travelling) or a
//! region drag (travelled past the drag threshold after starting inside
//! the selected Region-only item). [`InputState`] carries what is needed
//! to tell the two apart and to compute incremental drag deltas.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::ItemId;
use crate::surface::Point;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Escape"`, `"1"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// Corner index for the digit keys `1`–`4`.
    #[must_use]
    pub fn corner_index(&self) -> Option<usize> {
        match self.0.as_str() {
            "1" => Some(0),
            "2" => Some(1),
            "3" => Some(2),
            "4" => Some(3),
            _ => None,
        }
    }
}

/// Gesture state between pointer events.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No button held.
    #[default]
    Idle,
    /// Primary button is down and the pointer has not travelled far enough
    /// to count as a drag.
    Pressed {
        /// Where the press started.
        start: Point,
        /// Region-only item the press may drag, if it started inside the
        /// selected one and not on a control point.
        drag_item: Option<ItemId>,
    },
    /// The selected Region-only item is being moved.
    DraggingRegion {
        /// Id of the item being dragged.
        id: ItemId,
        /// Pointer position at the previous move, used to compute deltas.
        last: Point,
    },
}

//! Point state machine for the item being edited.
//!
//! Four corner slots, each possibly unplaced, and a placement cursor that
//! names the slot the next plain click fills. Placing advances the cursor
//! cyclically; jumping to a slot (after a click on an existing point) moves
//! the cursor without touching any slot.

#[cfg(test)]
#[path = "points_test.rs"]
mod points_test;

use crate::consts::CORNERS;
use crate::doc::{Quad, UnitPoint};
use crate::error::EditorError;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointSet {
    points: [Option<UnitPoint>; CORNERS],
    active: usize,
}

impl PointSet {
    /// Four unplaced slots, cursor on the first.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All four slots placed from `quad`, cursor on the first.
    #[must_use]
    pub fn from_quad(quad: Quad) -> Self {
        Self { points: quad.0.map(Some), active: 0 }
    }

    /// Set the slot under the cursor and advance the cursor.
    pub fn place_at(&mut self, p: UnitPoint) {
        self.points[self.active] = Some(p);
        self.active = (self.active + 1) % CORNERS;
    }

    /// Move the cursor to `index`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::IndexOutOfRange`] for an index past the last
    /// corner.
    pub fn set_active(&mut self, index: usize) -> Result<(), EditorError> {
        if index >= CORNERS {
            return Err(EditorError::IndexOutOfRange(index));
        }
        self.active = index;
        Ok(())
    }

    /// Overwrite one slot directly; the cursor does not move.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::IndexOutOfRange`] for an index past the last
    /// corner.
    pub fn set_from_input(&mut self, index: usize, p: UnitPoint) -> Result<(), EditorError> {
        let slot = self
            .points
            .get_mut(index)
            .ok_or(EditorError::IndexOutOfRange(index))?;
        *slot = Some(p);
        Ok(())
    }

    /// Replace every slot and put the cursor back on the first.
    pub fn reset(&mut self, points: [Option<UnitPoint>; CORNERS]) {
        self.points = points;
        self.active = 0;
    }

    /// Shift every placed point by `(du, dv)`.
    pub fn translate(&mut self, du: f64, dv: f64) {
        for p in self.points.iter_mut().flatten() {
            p.u += du;
            p.v += dv;
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.points.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<UnitPoint> {
        self.points.get(index).copied().flatten()
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<UnitPoint>; CORNERS] {
        &self.points
    }

    /// The placed corners as a quadrilateral, once all four are set.
    #[must_use]
    pub fn to_quad(&self) -> Option<Quad> {
        match self.points {
            [Some(a), Some(b), Some(c), Some(d)] => Some(Quad([a, b, c, d])),
            _ => None,
        }
    }
}

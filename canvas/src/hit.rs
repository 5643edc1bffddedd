//! Hit-testing in surface pixel space.
//!
//! Control points of the item being edited are tested before item regions.
//! Item hits use each item's axis-aligned bounding region, never the
//! quadrilateral itself.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HIT_RADIUS_PX;
use crate::doc::{Item, ItemId, ItemStore};
use crate::error::EditorError;
use crate::points::PointSet;
use crate::surface::{self, Point, SurfaceSize};

/// What a pixel position landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// A control point of the item being edited, by corner index.
    Point(usize),
    /// The bounding region of an item.
    Item(ItemId),
}

/// Test `pos` against the session's control points first, then every
/// item's bounding region. Positions off the surface hit nothing.
///
/// # Errors
///
/// Returns [`EditorError::StaleSurface`] if the surface is not measured.
pub fn hit_test(
    pos: Point,
    size: SurfaceSize,
    items: &ItemStore,
    points: Option<&PointSet>,
) -> Result<Option<Hit>, EditorError> {
    if let Some(points) = points {
        if let Some(index) = hit_point(pos, size, points)? {
            return Ok(Some(Hit::Point(index)));
        }
    }
    Ok(hit_item(pos, size, items)?.map(|item| Hit::Item(item.id.clone())))
}

/// Nearest placed control point within [`HIT_RADIUS_PX`] of `pos`
/// (inclusive). Equal distances resolve to the lower index.
///
/// # Errors
///
/// Returns [`EditorError::StaleSurface`] if the surface is not measured.
pub fn hit_point(pos: Point, size: SurfaceSize, points: &PointSet) -> Result<Option<usize>, EditorError> {
    if !size.is_measured() {
        return Err(EditorError::StaleSurface);
    }
    if !size.contains(pos) {
        return Ok(None);
    }
    let mut best: Option<(usize, f64)> = None;
    for (index, slot) in points.slots().iter().enumerate() {
        let Some(p) = slot else {
            continue;
        };
        let dist = surface::to_pixel(*p, size)?.distance(pos);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((index, dist));
        }
    }
    Ok(best
        .filter(|&(_, dist)| dist <= HIT_RADIUS_PX)
        .map(|(index, _)| index))
}

/// First item, in collection order, whose bounding region contains `pos`.
///
/// # Errors
///
/// Returns [`EditorError::StaleSurface`] if the surface is not measured.
pub fn hit_item(pos: Point, size: SurfaceSize, items: &ItemStore) -> Result<Option<&Item>, EditorError> {
    if !size.is_measured() {
        return Err(EditorError::StaleSurface);
    }
    if !size.contains(pos) {
        return Ok(None);
    }
    let p = surface::to_normalized(pos, size)?;
    Ok(items.iter().find(|item| item.geometry.bounds().contains(p)))
}

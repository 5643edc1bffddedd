//! Coordinate mapping between the normalized unit square and the live pixel
//! space of the rendered photograph.
//!
//! Geometry is stored normalized so it is independent of how large the
//! image happens to be drawn. Every conversion needs the surface's current
//! measured size; before the image has been laid out that size is zero and
//! the conversions refuse with [`EditorError::StaleSurface`].

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use crate::doc::{Quad, Region, UnitPoint};
use crate::error::EditorError;

/// A point in surface pixel space (CSS pixels from the overlay's top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Measured size of the rendering surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are known and positive.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Inclusive bounds check of a pixel position against the surface.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }

    fn check(self) -> Result<Self, EditorError> {
        if self.is_measured() {
            Ok(self)
        } else {
            Err(EditorError::StaleSurface)
        }
    }
}

/// Convert a normalized point to surface pixels.
///
/// # Errors
///
/// Returns [`EditorError::StaleSurface`] if the surface is not measured.
pub fn to_pixel(p: UnitPoint, size: SurfaceSize) -> Result<Point, EditorError> {
    let size = size.check()?;
    Ok(Point { x: p.u * size.width, y: p.v * size.height })
}

/// Convert a pixel position to normalized coordinates. The result is not
/// clamped: positions off the surface map outside `[0, 1]`.
///
/// # Errors
///
/// Returns [`EditorError::StaleSurface`] if the surface is not measured.
pub fn to_normalized(p: Point, size: SurfaceSize) -> Result<UnitPoint, EditorError> {
    let size = size.check()?;
    Ok(UnitPoint { u: p.x / size.width, v: p.y / size.height })
}

/// Convert a pixel displacement to a normalized displacement `(du, dv)`.
///
/// # Errors
///
/// Returns [`EditorError::StaleSurface`] if the surface is not measured.
pub fn delta_to_normalized(dx: f64, dy: f64, size: SurfaceSize) -> Result<(f64, f64), EditorError> {
    let size = size.check()?;
    Ok((dx / size.width, dy / size.height))
}

/// Corners of a region in winding order: top-left, top-right,
/// bottom-right, bottom-left.
#[must_use]
pub fn region_to_quad(region: &Region) -> Quad {
    let (hw, hh) = (region.w / 2.0, region.h / 2.0);
    let (left, right) = (region.x - hw, region.x + hw);
    let (top, bottom) = (region.y - hh, region.y + hh);
    Quad([
        UnitPoint::new(left, top),
        UnitPoint::new(right, top),
        UnitPoint::new(right, bottom),
        UnitPoint::new(left, bottom),
    ])
}

//! Rendering: turns item and session state into an overlay display list.
//!
//! [`draw`] is a pure function of the item collection, the session and the
//! surface size. It emits [`DrawOp`]s in painter's order and mutates
//! nothing; [`crate::backend`] replays them onto a 2D context.
//!
//! Layers, bottom first:
//! 1. clear;
//! 2. every item's outline (corners if stored, else its region), the
//!    selected one highlighted, filled, and labelled;
//! 3. for the selected item, its control points, dashed guides between
//!    consecutive placed corners, and the closed outline once all four
//!    corners are placed.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::consts::{GUIDE_DASH_PX, LABEL_MAX_CHARS, POINT_RADIUS_PX, POINT_RING_RADIUS_PX};
use crate::doc::{Geometry, Item, ItemStore, Quad};
use crate::error::EditorError;
use crate::session::Session;
use crate::surface::{self, Point, SurfaceSize};

const NORMAL_STROKE: &str = "#4caf50";
const SELECTED_STROKE: &str = "#2196f3";
const SELECTED_FILL: &str = "rgba(33, 150, 243, 0.2)";
const LABEL_FONT: &str = "bold 14px sans-serif";
const POINT_COLOR: &str = "#2196f3";
const ACTIVE_POINT_COLOR: &str = "#f44336";
const POINT_INDEX_FONT: &str = "bold 11px sans-serif";
const POINT_INDEX_COLOR: &str = "#fff";
const OUTLINE_STROKE: &str = "#4caf50";

/// Line style for stroked shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    pub width: f64,
    /// Equal dash and gap length in pixels; `None` is a solid line.
    pub dash: Option<f64>,
}

impl Stroke {
    #[must_use]
    pub fn solid(color: &'static str, width: f64) -> Self {
        Self { color, width, dash: None }
    }

    #[must_use]
    pub fn dashed(color: &'static str, width: f64, dash: f64) -> Self {
        Self { color, width, dash: Some(dash) }
    }
}

/// One drawing instruction, in surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Clear the whole overlay.
    Clear { width: f64, height: f64 },
    /// Closed four-sided outline, optionally filled.
    Polygon { points: [Point; 4], stroke: Stroke, fill: Option<&'static str> },
    /// Open line segment.
    Line { from: Point, to: Point, stroke: Stroke },
    /// Circle, filled and/or stroked.
    Circle { center: Point, radius: f64, fill: Option<&'static str>, stroke: Option<Stroke> },
    /// Text centered on `at`.
    Text { text: String, at: Point, font: &'static str, color: &'static str },
}

/// Build the overlay for the current state.
///
/// # Errors
///
/// Returns [`EditorError::StaleSurface`] if the surface is not measured;
/// the caller should skip this frame and redraw after the next resize.
pub fn draw(items: &ItemStore, session: Option<&Session>, size: SurfaceSize) -> Result<Vec<DrawOp>, EditorError> {
    if !size.is_measured() {
        return Err(EditorError::StaleSurface);
    }

    let mut ops = vec![DrawOp::Clear { width: size.width, height: size.height }];

    for item in items.iter() {
        let selected = session.filter(|s| s.is_for(&item.id));
        draw_item(&mut ops, item, selected, size)?;
    }

    if let Some(session) = session {
        draw_control_points(&mut ops, session, size)?;
    }

    Ok(ops)
}

// =============================================================
// Items
// =============================================================

fn draw_item(ops: &mut Vec<DrawOp>, item: &Item, selected: Option<&Session>, size: SurfaceSize) -> Result<(), EditorError> {
    let (quad, label_at) = match &item.geometry {
        Geometry::Quad { corners, .. } => (*corners, corners.centroid()),
        Geometry::Region(region) => (surface::region_to_quad(region), region.center()),
    };
    let points = quad_to_pixels(&quad, size)?;

    let Some(session) = selected else {
        ops.push(DrawOp::Polygon { points, stroke: Stroke::solid(NORMAL_STROKE, 2.0), fill: None });
        return Ok(());
    };

    ops.push(DrawOp::Polygon {
        points,
        stroke: Stroke::solid(SELECTED_STROKE, 3.0),
        fill: Some(SELECTED_FILL),
    });
    let text = truncate_label(&session.label);
    if !text.is_empty() {
        ops.push(DrawOp::Text {
            text,
            at: surface::to_pixel(label_at, size)?,
            font: LABEL_FONT,
            color: SELECTED_STROKE,
        });
    }
    Ok(())
}

/// First [`LABEL_MAX_CHARS`] characters of `label`.
#[must_use]
pub fn truncate_label(label: &str) -> String {
    label.chars().take(LABEL_MAX_CHARS).collect()
}

// =============================================================
// Control points
// =============================================================

fn draw_control_points(ops: &mut Vec<DrawOp>, session: &Session, size: SurfaceSize) -> Result<(), EditorError> {
    let active = session.points.active_index();
    let mut prev: Option<Point> = None;

    for (index, slot) in session.points.slots().iter().enumerate() {
        let Some(p) = slot else {
            prev = None;
            continue;
        };
        let at = surface::to_pixel(*p, size)?;
        let color = if index == active { ACTIVE_POINT_COLOR } else { POINT_COLOR };

        ops.push(DrawOp::Circle { center: at, radius: POINT_RADIUS_PX, fill: Some(color), stroke: None });
        ops.push(DrawOp::Circle {
            center: at,
            radius: POINT_RING_RADIUS_PX,
            fill: None,
            stroke: Some(Stroke::solid(color, 2.0)),
        });
        ops.push(DrawOp::Text {
            text: (index + 1).to_string(),
            at,
            font: POINT_INDEX_FONT,
            color: POINT_INDEX_COLOR,
        });

        if let Some(from) = prev {
            ops.push(DrawOp::Line { from, to: at, stroke: Stroke::dashed(POINT_COLOR, 1.5, GUIDE_DASH_PX) });
        }
        prev = Some(at);
    }

    if let Some(quad) = session.points.to_quad() {
        ops.push(DrawOp::Polygon {
            points: quad_to_pixels(&quad, size)?,
            stroke: Stroke::solid(OUTLINE_STROKE, 2.0),
            fill: None,
        });
    }
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

fn quad_to_pixels(quad: &Quad, size: SurfaceSize) -> Result<[Point; 4], EditorError> {
    let [a, b, c, d] = quad.0;
    Ok([
        surface::to_pixel(a, size)?,
        surface::to_pixel(b, size)?,
        surface::to_pixel(c, size)?,
        surface::to_pixel(d, size)?,
    ])
}

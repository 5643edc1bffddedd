//! Shared numeric constants for the canvas crate.

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space radius in pixels within which a click grabs a control point.
/// The boundary is inclusive.
pub const HIT_RADIUS_PX: f64 = 15.0;

/// Pointer travel in pixels before a press on a region becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 4.0;

// ── Overlay ─────────────────────────────────────────────────────

/// Radius of the filled control-point dot.
pub const POINT_RADIUS_PX: f64 = 4.0;

/// Radius of the ring stroked around each control point.
pub const POINT_RING_RADIUS_PX: f64 = 6.0;

/// Dash and gap length of the guide lines between placed corners.
pub const GUIDE_DASH_PX: f64 = 5.0;

/// Labels longer than this many characters are cut when drawn.
pub const LABEL_MAX_CHARS: usize = 30;

// ── Geometry ────────────────────────────────────────────────────

/// Number of corners in a quadrilateral.
pub const CORNERS: usize = 4;

/// Normalized area below which a quadrilateral is treated as degenerate.
pub const DEGENERATE_AREA: f64 = 1e-9;

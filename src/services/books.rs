//! Book service: list, update and delete catalogued books.
//!
//! DESIGN
//! ======
//! Mutations apply to the in-memory table immediately and mark the state
//! dirty for the persistence task. Every stored coordinate is rounded to
//! four decimals. When corners are given they win over a position, and the
//! stored position becomes the corners' bounding box so consumers that
//! only read `position` still find the book.

#[cfg(test)]
#[path = "books_test.rs"]
mod books_test;

use canvas::doc::{Geometry, ItemRecord, Quad, Region, UnitPoint};
use serde::Deserialize;
use tracing::info;

use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BookError {
    #[error("book not found: {0}")]
    NotFound(String),
    #[error("four points required, got {0}")]
    PointCount(usize),
    #[error("each point needs two finite values [u, v]")]
    MalformedPoint,
    #[error("position needs four finite values [x, y, w, h]")]
    MalformedPosition,
    #[error("position or points required")]
    MissingGeometry,
    #[error("nothing to update")]
    NothingToUpdate,
}

impl BookError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_BOOK_NOT_FOUND",
            Self::PointCount(_) | Self::MalformedPoint => "E_BAD_POINTS",
            Self::MalformedPosition => "E_BAD_POSITION",
            Self::MissingGeometry => "E_MISSING_GEOMETRY",
            Self::NothingToUpdate => "E_NOTHING_TO_UPDATE",
        }
    }
}

/// Update request body. Geometry arrives as raw arrays so malformed
/// shapes can be reported instead of rejected by the decoder.
#[derive(Debug, Default, Deserialize)]
pub struct BookUpdate {
    pub points: Option<Vec<Vec<f64>>>,
    pub position: Option<Vec<f64>>,
    pub full_name: Option<String>,
}

/// What an update changed, for the response.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub record: ItemRecord,
    pub position_updated: bool,
    pub name_updated: bool,
}

// =============================================================================
// UPDATE
// =============================================================================

/// Apply `update` to the book keyed `key`.
///
/// # Errors
///
/// Returns `NothingToUpdate` for an empty body, a geometry error for
/// malformed points or position, and `NotFound` for an unknown key. The
/// table is untouched on any error.
pub async fn update_book(state: &AppState, key: &str, update: BookUpdate) -> Result<UpdateOutcome, BookError> {
    if update.points.is_none() && update.position.is_none() && update.full_name.is_none() {
        return Err(BookError::NothingToUpdate);
    }
    let geometry = parse_geometry(&update)?;

    let mut books = state.books.write().await;
    let book = books.get_mut(key).ok_or_else(|| BookError::NotFound(key.to_owned()))?;

    let position_updated = geometry.is_some();
    if let Some(geometry) = geometry {
        book.geometry = geometry;
    }
    let name_updated = update.full_name.is_some();
    if let Some(name) = update.full_name {
        book.label = name;
    }
    let record = book.to_record();
    drop(books);

    state.mark_dirty();
    info!(%key, position_updated, name_updated, has_points = record.points.is_some(), "book updated");
    Ok(UpdateOutcome { record, position_updated, name_updated })
}

/// New geometry from the body, if it carries any. A non-empty `points`
/// list wins over `position`.
fn parse_geometry(update: &BookUpdate) -> Result<Option<Geometry>, BookError> {
    match (update.points.as_deref(), update.position.as_deref()) {
        (Some(points), _) if !points.is_empty() => parse_corners(points).map(Some),
        (_, Some(position)) => parse_position(position).map(Some),
        (Some(_), None) => Err(BookError::MissingGeometry),
        (None, None) => Ok(None),
    }
}

fn parse_corners(raw: &[Vec<f64>]) -> Result<Geometry, BookError> {
    let [a, b, c, d] = raw else {
        return Err(BookError::PointCount(raw.len()));
    };
    let corners = [parse_point(a)?, parse_point(b)?, parse_point(c)?, parse_point(d)?];
    let bounds = round_region(Region::bounding(&corners));
    Ok(Geometry::Quad { corners: Quad(corners.map(round_point)), bounds })
}

fn parse_point(raw: &[f64]) -> Result<UnitPoint, BookError> {
    match raw {
        &[u, v] if u.is_finite() && v.is_finite() => Ok(UnitPoint::new(u, v)),
        _ => Err(BookError::MalformedPoint),
    }
}

fn parse_position(raw: &[f64]) -> Result<Geometry, BookError> {
    match raw {
        &[x, y, w, h] if raw.iter().all(|v| v.is_finite()) => Ok(Geometry::Region(round_region(Region::new(x, y, w, h)))),
        _ => Err(BookError::MalformedPosition),
    }
}

/// Round to the four decimals every stored coordinate keeps.
#[must_use]
pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

fn round_point(p: UnitPoint) -> UnitPoint {
    UnitPoint::new(round4(p.u), round4(p.v))
}

fn round_region(r: Region) -> Region {
    Region::new(round4(r.x), round4(r.y), round4(r.w), round4(r.h))
}

// =============================================================================
// DELETE
// =============================================================================

/// Remove the book keyed `key`.
///
/// # Errors
///
/// Returns `NotFound` if there is no such book.
pub async fn delete_book(state: &AppState, key: &str) -> Result<(), BookError> {
    let removed = state.books.write().await.remove(key);
    if removed.is_none() {
        return Err(BookError::NotFound(key.to_owned()));
    }
    state.mark_dirty();
    info!(%key, "book deleted");
    Ok(())
}

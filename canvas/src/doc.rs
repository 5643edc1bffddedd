//! Document model: catalogued items, their geometry, and the in-memory store.
//!
//! Everything here is expressed in normalized unit-square coordinates, so
//! it survives any change of rendered image size. An item locates a book
//! spine either with a legacy axis-aligned [`Region`] or with an explicit
//! [`Quad`] of four corners; [`Geometry`] is the tagged union of the two and
//! the single place that turns either into a quadrilateral for editing.
//!
//! Data arrives from the record store as [`ItemRecord`]s keyed by id (see
//! [`Listing`]) and is held in an insertion-ordered [`ItemStore`]. Order is
//! meaningful: the renderer draws in it and the hit-tester takes the first
//! match in it.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::consts::DEGENERATE_AREA;
use crate::surface;

/// Identifier of a catalogued item (the store's key, e.g. `"lean impact"`).
pub type ItemId = String;

// =============================================================
// Points and shapes
// =============================================================

/// A point in normalized surface space. `u` runs left to right and `v` top
/// to bottom; on-surface values lie in `[0, 1]`.
///
/// On the wire a point is a two-element array `[u, v]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct UnitPoint {
    pub u: f64,
    pub v: f64,
}

impl UnitPoint {
    #[must_use]
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

impl From<[f64; 2]> for UnitPoint {
    fn from([u, v]: [f64; 2]) -> Self {
        Self { u, v }
    }
}

impl From<UnitPoint> for [f64; 2] {
    fn from(p: UnitPoint) -> Self {
        [p.u, p.v]
    }
}

/// Legacy axis-aligned box: center `(x, y)` and size `(w, h)`, normalized.
///
/// On the wire a region is the four-element array `[x, y, w, h]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Region {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Smallest region enclosing all of `points`.
    #[must_use]
    pub fn bounding(points: &[UnitPoint; 4]) -> Self {
        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_u = min_u.min(p.u);
            max_u = max_u.max(p.u);
            min_v = min_v.min(p.v);
            max_v = max_v.max(p.v);
        }
        Self {
            x: (min_u + max_u) / 2.0,
            y: (min_v + max_v) / 2.0,
            w: max_u - min_u,
            h: max_v - min_v,
        }
    }

    #[must_use]
    pub fn center(&self) -> UnitPoint {
        UnitPoint::new(self.x, self.y)
    }

    /// Inclusive point-in-rectangle test.
    #[must_use]
    pub fn contains(&self, p: UnitPoint) -> bool {
        let left = self.x - self.w / 2.0;
        let top = self.y - self.h / 2.0;
        p.u >= left && p.u <= left + self.w && p.v >= top && p.v <= top + self.h
    }
}

impl From<[f64; 4]> for Region {
    fn from([x, y, w, h]: [f64; 4]) -> Self {
        Self { x, y, w, h }
    }
}

impl From<Region> for [f64; 4] {
    fn from(r: Region) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}

/// Four placed corners in winding order (conventionally top-left,
/// top-right, bottom-right, bottom-left; neither convexity nor winding is
/// enforced).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad(pub [UnitPoint; 4]);

impl Quad {
    #[must_use]
    pub fn corners(&self) -> &[UnitPoint; 4] {
        &self.0
    }

    #[must_use]
    pub fn bounds(&self) -> Region {
        Region::bounding(&self.0)
    }

    /// Arithmetic mean of the corners; where the label is drawn.
    #[must_use]
    pub fn centroid(&self) -> UnitPoint {
        let (su, sv) = self.0.iter().fold((0.0, 0.0), |(su, sv), p| (su + p.u, sv + p.v));
        UnitPoint::new(su / 4.0, sv / 4.0)
    }

    /// Unsigned shoelace area in normalized units.
    #[must_use]
    pub fn area(&self) -> f64 {
        let mut sum = 0.0;
        for i in 0..4 {
            let a = self.0[i];
            let b = self.0[(i + 1) % 4];
            sum += a.u * b.v - b.u * a.v;
        }
        sum.abs() / 2.0
    }

    /// True when opposite edges (0–1 with 2–3, or 1–2 with 3–0) cross.
    #[must_use]
    pub fn is_self_intersecting(&self) -> bool {
        let [a, b, c, d] = self.0;
        segments_cross(a, b, c, d) || segments_cross(b, c, d, a)
    }

    /// Zero-area or bow-tie shapes that still pass the completeness check.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.area() < DEGENERATE_AREA || self.is_self_intersecting()
    }
}

fn cross(o: UnitPoint, a: UnitPoint, b: UnitPoint) -> f64 {
    (a.u - o.u) * (b.v - o.v) - (a.v - o.v) * (b.u - o.u)
}

/// Proper crossing of segments `p1p2` and `p3p4` (touching does not count).
fn segments_cross(p1: UnitPoint, p2: UnitPoint, p3: UnitPoint, p4: UnitPoint) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Where an item sits on the photograph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Legacy center + size box with no explicit corners.
    Region(Region),
    /// Explicit corners, plus the box the store keeps alongside them for
    /// hit-testing and older consumers.
    Quad { corners: Quad, bounds: Region },
}

impl Geometry {
    /// Geometry for freshly placed corners; the box is derived from them.
    #[must_use]
    pub fn from_corners(corners: Quad) -> Self {
        Self::Quad { corners, bounds: corners.bounds() }
    }

    /// Axis-aligned box used for item hit-testing, whatever the shape.
    #[must_use]
    pub fn bounds(&self) -> Region {
        match self {
            Self::Region(region) | Self::Quad { bounds: region, .. } => *region,
        }
    }

    /// The quadrilateral to edit: stored corners, or corners synthesized
    /// from the region.
    #[must_use]
    pub fn to_quad(&self) -> Quad {
        match self {
            Self::Region(region) => surface::region_to_quad(region),
            Self::Quad { corners, .. } => *corners,
        }
    }

    #[must_use]
    pub fn has_corners(&self) -> bool {
        matches!(self, Self::Quad { .. })
    }
}

// =============================================================
// Items
// =============================================================

/// A catalogued book as the editor sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    /// Display label (the book's full title).
    pub label: String,
    /// Shelf row the book sits on, when the store tracks it.
    pub shelf: Option<i64>,
    pub geometry: Geometry,
}

impl Item {
    /// Build an item from its wire record. A `points` list that is not
    /// exactly four long is ignored and the region is used instead.
    #[must_use]
    pub fn from_record(id: ItemId, record: ItemRecord) -> Self {
        let geometry = match record.points.as_deref() {
            Some(&[a, b, c, d]) => Geometry::Quad { corners: Quad([a, b, c, d]), bounds: record.position },
            _ => Geometry::Region(record.position),
        };
        Self { id, label: record.full_name, shelf: record.shelf, geometry }
    }

    #[must_use]
    pub fn to_record(&self) -> ItemRecord {
        let points = match &self.geometry {
            Geometry::Region(_) => None,
            Geometry::Quad { corners, .. } => Some(corners.0.to_vec()),
        };
        ItemRecord {
            position: self.geometry.bounds(),
            points,
            shelf: self.shelf,
            full_name: self.label.clone(),
        }
    }
}

/// An item as stored and transferred by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Bounding region; always present, even for items with corners.
    pub position: Region,
    /// Four explicit corners, when the item has been annotated with them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<UnitPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf: Option<i64>,
    pub full_name: String,
}

/// Body of an update request. Only present fields are applied; `points`
/// wins over `position` when both are given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<UnitPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Region>,
    #[serde(rename = "full_name", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ItemUpdate {
    /// Update carrying four corners and a label, as sent by a save.
    #[must_use]
    pub fn corners(quad: Quad, label: impl Into<String>) -> Self {
        Self { points: Some(quad.0.to_vec()), position: None, label: Some(label.into()) }
    }

    /// Whether the body carries anything to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_none() && self.position.is_none() && self.label.is_none()
    }
}

/// The store's full item listing: a JSON object from id to record whose
/// key order is preserved in both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing(pub Vec<(ItemId, ItemRecord)>);

impl Listing {
    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        self.0
            .into_iter()
            .map(|(id, record)| Item::from_record(id, record))
            .collect()
    }
}

impl<'a> FromIterator<&'a Item> for Listing {
    fn from_iter<T: IntoIterator<Item = &'a Item>>(iter: T) -> Self {
        Self(iter.into_iter().map(|item| (item.id.clone(), item.to_record())).collect())
    }
}

impl Serialize for Listing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, record) in &self.0 {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Listing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ListingVisitor;

        impl<'de> Visitor<'de> for ListingVisitor {
            type Value = Listing;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from item id to item record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Listing, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, record)) = access.next_entry::<ItemId, ItemRecord>()? {
                    entries.push((id, record));
                }
                Ok(Listing(entries))
            }
        }

        deserializer.deserialize_map(ListingVisitor)
    }
}

// =============================================================
// Store
// =============================================================

/// In-memory, insertion-ordered collection of items.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Replace all items with a full snapshot, keeping its order.
    pub fn load_snapshot(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// Insert an item, replacing one with the same id in place or
    /// appending it.
    pub fn insert(&mut self, item: Item) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    /// Remove an item by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Items in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

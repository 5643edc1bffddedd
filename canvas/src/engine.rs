use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::backend;
use crate::consts::DRAG_THRESHOLD_PX;
use crate::doc::{Geometry, Item, ItemId, ItemStore, ItemUpdate, UnitPoint};
use crate::error::EditorError;
use crate::hit;
use crate::input::{Button, InputState, Key, Modifiers};
use crate::render::{self, DrawOp};
use crate::session::Session;
use crate::store::StoreError;
use crate::surface::{self, Point, SurfaceSize};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// How a save round-trip with the record store ended.
#[derive(Debug)]
pub enum SaveOutcome {
    /// The store applied the update and returned its new listing.
    Saved(Vec<Item>),
    /// The store refused the update.
    Rejected(StoreError),
    /// The store applied the update but listing afterwards failed.
    SavedUnrefreshed(StoreError),
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// State changed; redraw the overlay.
    RenderNeeded,
    /// The selected item changed (`None` when editing ended).
    SelectionChanged(Option<ItemId>),
    /// Hand this update to the record store, then report back through
    /// [`EngineCore::finish_save`].
    SaveRequested(SaveRequest),
    /// Ask the user to confirm deleting the item; on confirmation call
    /// [`EngineCore::delete_selected`].
    ConfirmDelete { id: ItemId, label: String },
    /// Ask the record store to delete the item, then report back through
    /// [`EngineCore::finish_delete`].
    DeleteRequested { id: ItemId },
    /// Show an error message to the user.
    ShowError(String),
    /// Show an informational message to the user.
    Notify(String),
}

/// A validated save, ready for the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub id: ItemId,
    pub update: ItemUpdate,
}

/// Core editor state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
/// Every mutation returns the actions it implies, including an explicit
/// [`Action::RenderNeeded`] whenever the overlay changed.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub items: ItemStore,
    /// `Some` while an item is being edited.
    pub session: Option<Session>,
    pub input: InputState,
    pub surface: SurfaceSize,
    pub dpr: f64,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self { dpr: 1.0, ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace the item collection with a store snapshot. Editing ends if
    /// the selected item is no longer present.
    pub fn load_items(&mut self, items: Vec<Item>) -> Vec<Action> {
        self.items.load_snapshot(items);
        let mut actions = Vec::new();
        let vanished = self.selection().is_some_and(|id| self.items.get(id).is_none());
        if vanished {
            debug!(id = ?self.selection(), "selected item vanished from snapshot");
            actions.extend(self.end_session());
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Record the measured size of the photograph. A redraw skipped while
    /// the surface was unmeasured happens now.
    pub fn set_surface(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.surface = SurfaceSize::new(width, height);
        if self.surface.is_measured() {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Selection ---

    /// Start editing `id`: load its corners (synthesized from its region
    /// when it has none) with the cursor on the first corner.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownItem`] if no item has that id.
    pub fn select_item(&mut self, id: &str) -> Result<Vec<Action>, EditorError> {
        let item = self
            .items
            .get(id)
            .ok_or_else(|| EditorError::UnknownItem(id.to_owned()))?;
        debug!(%id, has_corners = item.geometry.has_corners(), "item selected");
        self.session = Some(Session::for_item(item));
        self.input = InputState::Idle;
        Ok(vec![Action::SelectionChanged(Some(id.to_owned())), Action::RenderNeeded])
    }

    /// Discard the session and return to idle.
    pub fn cancel(&mut self) -> Vec<Action> {
        if self.session.is_none() {
            return Vec::new();
        }
        let mut actions = self.end_session();
        actions.push(Action::RenderNeeded);
        actions
    }

    fn end_session(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        match self.session.take() {
            Some(_) => vec![Action::SelectionChanged(None)],
            None => Vec::new(),
        }
    }

    // --- Point editing ---

    /// A click at `pos`. While editing, a click on a control point makes
    /// it active and anything else on the surface places the active point.
    /// While idle, a click selects the first item whose region contains it.
    pub fn click(&mut self, pos: Point) -> Vec<Action> {
        let size = self.surface;
        let Some(session) = self.session.as_mut() else {
            return match hit::hit_item(pos, size, &self.items) {
                Ok(Some(item)) => {
                    let id = item.id.clone();
                    match self.select_item(&id) {
                        Ok(actions) => actions,
                        Err(e) => ignored("select", &e),
                    }
                }
                Ok(None) => Vec::new(),
                Err(e) => deferred("click", &e),
            };
        };

        match hit::hit_point(pos, size, &session.points) {
            Ok(Some(index)) => {
                debug!(index, "control point grabbed");
                match session.points.set_active(index) {
                    Ok(()) => vec![Action::RenderNeeded],
                    Err(e) => vec![Action::ShowError(e.to_string())],
                }
            }
            Ok(None) if !size.contains(pos) => {
                debug!(x = pos.x, y = pos.y, "click outside surface ignored");
                Vec::new()
            }
            Ok(None) => match surface::to_normalized(pos, size) {
                Ok(p) => {
                    debug!(index = session.points.active_index(), u = p.u, v = p.v, "corner placed");
                    session.points.place_at(p);
                    vec![Action::RenderNeeded]
                }
                Err(e) => deferred("place", &e),
            },
            Err(e) => deferred("click", &e),
        }
    }

    /// Make corner `index` the one the next click places.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] while idle, or
    /// [`EditorError::IndexOutOfRange`] for a bad index.
    pub fn set_active_point(&mut self, index: usize) -> Result<Vec<Action>, EditorError> {
        let session = self.session.as_mut().ok_or(EditorError::NoSelection)?;
        session.points.set_active(index)?;
        Ok(vec![Action::RenderNeeded])
    }

    /// Overwrite corner `index` from the numeric entry fields. Non-finite
    /// values become `0.0`; nothing is clamped and the cursor stays put.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] while idle, or
    /// [`EditorError::IndexOutOfRange`] for a bad index.
    pub fn set_point_from_input(&mut self, index: usize, u: f64, v: f64) -> Result<Vec<Action>, EditorError> {
        let session = self.session.as_mut().ok_or(EditorError::NoSelection)?;
        let finite = |x: f64| if x.is_finite() { x } else { 0.0 };
        session.points.set_from_input(index, UnitPoint::new(finite(u), finite(v)))?;
        Ok(vec![Action::RenderNeeded])
    }

    /// Replace the label being edited.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] while idle.
    pub fn set_label(&mut self, label: &str) -> Result<Vec<Action>, EditorError> {
        let session = self.session.as_mut().ok_or(EditorError::NoSelection)?;
        label.clone_into(&mut session.label);
        Ok(vec![Action::RenderNeeded])
    }

    // --- Save / delete ---

    /// Validate the session for saving. Any four placed corners are
    /// accepted; degenerate shapes are only logged.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] while idle and
    /// [`EditorError::Incomplete`] until all four corners are placed.
    pub fn save(&self) -> Result<SaveRequest, EditorError> {
        let session = self.session.as_ref().ok_or(EditorError::NoSelection)?;
        let quad = session.points.to_quad().ok_or(EditorError::Incomplete {
            placed: session.points.placed_count(),
        })?;
        if quad.is_degenerate() {
            warn!(id = %session.item_id, area = quad.area(), "saving degenerate quadrilateral");
        }
        Ok(SaveRequest {
            id: session.item_id.clone(),
            update: ItemUpdate::corners(quad, session.label.clone()),
        })
    }

    /// Apply the outcome of a save of `id`. A fresh listing replaces the
    /// collection, and if `id` is still selected the session reloads from
    /// it. A success for an item that is no longer selected leaves the
    /// session alone. On rejection the session is untouched and the
    /// store's message is shown. A save whose follow-up listing failed is
    /// reported as saved, with the listing error shown separately.
    pub fn finish_save(&mut self, id: &str, outcome: SaveOutcome) -> Vec<Action> {
        let still_selected = self.session.as_ref().is_some_and(|s| s.is_for(id));
        let items = match outcome {
            SaveOutcome::Saved(items) => items,
            SaveOutcome::Rejected(e) => {
                warn!(%id, error = %e, "save failed");
                return vec![Action::ShowError(e.to_string())];
            }
            SaveOutcome::SavedUnrefreshed(e) => {
                warn!(%id, error = %e, "saved but listing failed");
                let mut actions = Vec::new();
                if still_selected {
                    actions.push(Action::Notify(format!("saved {id}")));
                }
                actions.push(Action::ShowError(format!("saved {id}, but reloading failed: {e}")));
                return actions;
            }
        };

        let mut actions = self.load_items(items);
        if !still_selected {
            warn!(%id, "discarding late save response for deselected item");
            return actions;
        }
        if let Some(item) = self.items.get(id) {
            self.session = Some(Session::for_item(item));
            actions.push(Action::Notify(format!("saved {id}")));
        }
        actions
    }

    /// Ask the host to confirm deleting the selected item.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] while idle.
    pub fn request_delete(&self) -> Result<Action, EditorError> {
        let session = self.session.as_ref().ok_or(EditorError::NoSelection)?;
        Ok(Action::ConfirmDelete { id: session.item_id.clone(), label: session.label.clone() })
    }

    /// The user confirmed: request deletion of the selected item.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoSelection`] while idle.
    pub fn delete_selected(&self) -> Result<Action, EditorError> {
        let session = self.session.as_ref().ok_or(EditorError::NoSelection)?;
        Ok(Action::DeleteRequested { id: session.item_id.clone() })
    }

    /// Apply the outcome of deleting `id`. On success the item leaves the
    /// collection and, if it was selected, editing ends. On failure editing
    /// continues and the error is shown.
    pub fn finish_delete(&mut self, id: &str, result: Result<(), StoreError>) -> Vec<Action> {
        if let Err(e) = result {
            warn!(%id, error = %e, "delete failed");
            return vec![Action::ShowError(e.to_string())];
        }
        self.items.remove(id);
        let mut actions = Vec::new();
        if self.session.as_ref().is_some_and(|s| s.is_for(id)) {
            actions.extend(self.end_session());
        }
        actions.push(Action::Notify(format!("deleted {id}")));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, pos: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let drag_item = self.drag_candidate(pos);
        self.input = InputState::Pressed { start: pos, drag_item };
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, pos: Point, _modifiers: Modifiers) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Pressed { start, drag_item: Some(id) } if pos.distance(start) > DRAG_THRESHOLD_PX => {
                let actions = self.drag_region(&id, start, pos);
                self.input = InputState::DraggingRegion { id, last: pos };
                actions
            }
            InputState::DraggingRegion { id, last } => {
                let actions = self.drag_region(&id, last, pos);
                self.input = InputState::DraggingRegion { id, last: pos };
                actions
            }
            other => {
                self.input = other;
                Vec::new()
            }
        }
    }

    /// A release without travel is a click; a release after dragging just
    /// ends the drag.
    pub fn on_pointer_up(&mut self, pos: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match std::mem::take(&mut self.input) {
            InputState::Pressed { .. } => self.click(pos),
            InputState::DraggingRegion { id, .. } => {
                debug!(%id, "region drag finished");
                Vec::new()
            }
            InputState::Idle => Vec::new(),
        }
    }

    /// The pointer left the surface: abandon any gesture without clicking.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        Vec::new()
    }

    /// The selected item, if a press at `pos` could start dragging it: it
    /// must be Region-only and the press must be inside its region and not
    /// on a control point.
    fn drag_candidate(&self, pos: Point) -> Option<ItemId> {
        let session = self.session.as_ref()?;
        let item = self.items.get(&session.item_id)?;
        if item.geometry.has_corners() {
            return None;
        }
        if !matches!(hit::hit_point(pos, self.surface, &session.points), Ok(None)) {
            return None;
        }
        match surface::to_normalized(pos, self.surface) {
            Ok(p) if item.geometry.bounds().contains(p) => Some(item.id.clone()),
            _ => None,
        }
    }

    /// Move a Region-only item's center by the pointer travel from `from`
    /// to `to`, clamped to the unit square. Placed session corners follow
    /// by the same applied amount.
    fn drag_region(&mut self, id: &str, from: Point, to: Point) -> Vec<Action> {
        let (du, dv) = match surface::delta_to_normalized(to.x - from.x, to.y - from.y, self.surface) {
            Ok(delta) => delta,
            Err(e) => return deferred("drag", &e),
        };
        let Some(Item { geometry: Geometry::Region(region), .. }) = self.items.get_mut(id) else {
            return Vec::new();
        };
        let (old_x, old_y) = (region.x, region.y);
        region.x = (old_x + du).clamp(0.0, 1.0);
        region.y = (old_y + dv).clamp(0.0, 1.0);
        let (applied_u, applied_v) = (region.x - old_x, region.y - old_y);

        if let Some(session) = self.session.as_mut().filter(|s| s.is_for(id)) {
            session.points.translate(applied_u, applied_v);
        }
        vec![Action::RenderNeeded]
    }

    // --- Keyboard input ---

    /// `Escape` cancels, `Enter` saves, `Delete`/`Backspace` asks to
    /// delete, and `1`–`4` pick the corner the next click places.
    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if let Some(index) = key.corner_index() {
            return match self.set_active_point(index) {
                Ok(actions) => actions,
                Err(e) => ignored("set active point", &e),
            };
        }
        let outcome = match key.0.as_str() {
            "Escape" => Ok(self.cancel()),
            "Enter" => self.save().map(|req| vec![Action::SaveRequested(req)]),
            "Delete" | "Backspace" => self.request_delete().map(|action| vec![action]),
            _ => Ok(Vec::new()),
        };
        match outcome {
            Ok(actions) => actions,
            Err(EditorError::NoSelection) => Vec::new(),
            Err(e) => vec![Action::ShowError(e.to_string())],
        }
    }

    // --- Queries ---

    /// The id of the item being edited, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.item_id.as_str())
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    /// Display list for the current state.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::StaleSurface`] until the surface is measured.
    pub fn scene(&self) -> Result<Vec<DrawOp>, EditorError> {
        render::draw(&self.items, self.session.as_ref(), self.surface)
    }
}

/// Log an operation skipped because the surface isn't ready yet.
fn deferred(op: &str, e: &EditorError) -> Vec<Action> {
    debug!(op, error = %e, "operation deferred");
    Vec::new()
}

fn ignored(op: &str, e: &EditorError) -> Vec<Action> {
    debug!(op, error = %e, "operation ignored");
    Vec::new()
}

/// The full editor bound to a browser canvas. Wraps `EngineCore` and owns the overlay element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given overlay canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, core: EngineCore::new() }
    }

    // --- Viewport ---

    /// Match the overlay to the displayed image size (CSS pixels) and the
    /// device pixel ratio.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.core.dpr = dpr;
        self.canvas.set_width((width_css * dpr).round().max(0.0) as u32);
        self.canvas.set_height((height_css * dpr).round().max(0.0) as u32);
        self.core.set_surface(width_css, height_css)
    }

    // --- Render ---

    /// Draw the current state to the canvas. Skipped silently while the
    /// image is unmeasured.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ops = match self.core.scene() {
            Ok(ops) => ops,
            Err(e) => {
                debug!(error = %e, "render skipped");
                return Ok(());
            }
        };
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        backend::paint(&ctx, &ops, self.core.dpr)
    }

    // --- Delegated inputs ---

    pub fn load_items(&mut self, items: Vec<Item>) -> Vec<Action> {
        self.core.load_items(items)
    }

    pub fn on_pointer_down(&mut self, pos: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(pos, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, pos: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(pos, modifiers)
    }

    pub fn on_pointer_up(&mut self, pos: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(pos, button, modifiers)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.core.selection()
    }
}

#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{Quad, Region};
use crate::store::test_helpers::{quad_item, region_item};

// =============================================================
// Helpers
// =============================================================

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn up(u: f64, v: f64) -> UnitPoint {
    UnitPoint::new(u, v)
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn square() -> Quad {
    Quad([up(0.25, 0.25), up(0.75, 0.25), up(0.75, 0.75), up(0.25, 0.75)])
}

/// Two Region-only items side by side and one with corners, on a
/// 1000x1000 surface.
fn shelf() -> Vec<Item> {
    vec![
        region_item("left", "Left Book", 0.2, 0.5, 0.2, 0.4),
        region_item("mid", "Lean Impact", 0.5, 0.5, 0.2, 0.2),
        quad_item("quad", "Tilted", Quad([up(0.8, 0.3), up(0.9, 0.3), up(0.9, 0.7), up(0.8, 0.7)])),
    ]
}

fn core() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_surface(1000.0, 1000.0);
    core.load_items(shelf());
    core
}

fn editing(id: &str) -> EngineCore {
    let mut core = core();
    core.select_item(id).unwrap();
    core
}

fn session(core: &EngineCore) -> &Session {
    core.session.as_ref().unwrap()
}

fn rejected(message: &str) -> StoreError {
    StoreError::Rejected { status: 400, message: message.to_owned() }
}

fn press_release(core: &mut EngineCore, pos: Point) -> Vec<Action> {
    core.on_pointer_down(pos, Button::Primary, no_modifiers());
    core.on_pointer_up(pos, Button::Primary, no_modifiers())
}

// =============================================================
// Construction and surface
// =============================================================

#[test]
fn new_core_is_idle() {
    let core = EngineCore::new();
    assert!(!core.is_editing());
    assert_eq!(core.selection(), None);
    assert_eq!(core.input, InputState::Idle);
    assert_eq!(core.dpr, 1.0);
    assert!(core.items.is_empty());
}

#[test]
fn unmeasured_surface_requests_nothing() {
    let mut core = EngineCore::new();
    assert!(core.set_surface(0.0, 0.0).is_empty());
    assert!(matches!(core.scene(), Err(EditorError::StaleSurface)));
}

#[test]
fn measuring_surface_requests_render() {
    let mut core = EngineCore::new();
    assert_eq!(core.set_surface(640.0, 480.0), vec![Action::RenderNeeded]);
    assert!(core.scene().is_ok());
}

#[test]
fn resize_keeps_normalized_geometry() {
    let mut core = editing("mid");
    let before = session(&core).points;
    core.set_surface(333.0, 777.0);
    assert_eq!(session(&core).points, before);
    assert_eq!(core.item("mid").unwrap().geometry.bounds(), Region::new(0.5, 0.5, 0.2, 0.2));
}

// =============================================================
// Loading
// =============================================================

#[test]
fn load_items_requests_render() {
    let mut core = EngineCore::new();
    assert_eq!(core.load_items(shelf()), vec![Action::RenderNeeded]);
    assert_eq!(core.items.len(), 3);
}

#[test]
fn load_items_ends_session_when_selection_vanishes() {
    let mut core = editing("mid");
    let actions = core.load_items(vec![region_item("left", "Left Book", 0.2, 0.5, 0.2, 0.4)]);
    assert_eq!(actions, vec![Action::SelectionChanged(None), Action::RenderNeeded]);
    assert!(!core.is_editing());
}

#[test]
fn load_items_keeps_session_when_selection_survives() {
    let mut core = editing("mid");
    core.set_point_from_input(0, 0.1, 0.1).unwrap();
    core.load_items(shelf());
    assert_eq!(session(&core).points.get(0), Some(up(0.1, 0.1)));
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_region_item_synthesizes_corners() {
    let mut core = core();
    let actions = core.select_item("mid").unwrap();
    assert_eq!(actions, vec![Action::SelectionChanged(Some("mid".into())), Action::RenderNeeded]);

    let s = session(&core);
    assert_eq!(s.label, "Lean Impact");
    assert_eq!(s.points.active_index(), 0);
    let quad = s.points.to_quad().unwrap();
    assert!(approx_eq(quad.0[0].u, 0.4) && approx_eq(quad.0[0].v, 0.4));
    assert!(approx_eq(quad.0[2].u, 0.6) && approx_eq(quad.0[2].v, 0.6));
}

#[test]
fn select_quad_item_loads_stored_corners() {
    let core = editing("quad");
    assert_eq!(session(&core).points.get(1), Some(up(0.9, 0.3)));
}

#[test]
fn select_unknown_item_fails() {
    let mut core = core();
    assert!(matches!(core.select_item("ghost"), Err(EditorError::UnknownItem(id)) if id == "ghost"));
    assert!(!core.is_editing());
}

#[test]
fn selecting_another_item_replaces_session() {
    let mut core = editing("mid");
    core.set_label("typed but unsaved").unwrap();
    core.select_item("left").unwrap();
    assert_eq!(core.selection(), Some("left"));
    assert_eq!(session(&core).label, "Left Book");
}

#[test]
fn cancel_discards_edits() {
    let mut core = editing("mid");
    core.set_point_from_input(0, 0.0, 0.0).unwrap();
    let actions = core.cancel();
    assert_eq!(actions, vec![Action::SelectionChanged(None), Action::RenderNeeded]);
    assert!(!core.is_editing());
    assert_eq!(core.item("mid").unwrap().geometry, Geometry::Region(Region::new(0.5, 0.5, 0.2, 0.2)));
}

#[test]
fn cancel_while_idle_is_a_no_op() {
    let mut core = core();
    assert!(core.cancel().is_empty());
}

// =============================================================
// Clicks while idle
// =============================================================

#[test]
fn idle_click_selects_item_under_pointer() {
    let mut core = core();
    let actions = core.click(pt(500.0, 500.0));
    assert_eq!(actions, vec![Action::SelectionChanged(Some("mid".into())), Action::RenderNeeded]);
    assert_eq!(core.selection(), Some("mid"));
}

#[test]
fn idle_click_on_empty_space_does_nothing() {
    let mut core = core();
    assert!(core.click(pt(650.0, 100.0)).is_empty());
    assert!(!core.is_editing());
}

#[test]
fn idle_click_prefers_first_overlapping_item() {
    let mut core = EngineCore::new();
    core.set_surface(1000.0, 1000.0);
    core.load_items(vec![
        region_item("outer", "Outer", 0.5, 0.5, 0.6, 0.6),
        region_item("inner", "Inner", 0.5, 0.5, 0.2, 0.2),
    ]);
    core.click(pt(500.0, 500.0));
    assert_eq!(core.selection(), Some("outer"));
}

#[test]
fn idle_click_before_measure_is_deferred() {
    let mut core = EngineCore::new();
    core.load_items(shelf());
    assert!(core.click(pt(500.0, 500.0)).is_empty());
    assert!(!core.is_editing());
}

// =============================================================
// Clicks while editing
// =============================================================

#[test]
fn editing_click_places_active_corner_and_advances() {
    let mut core = editing("mid");
    let actions = core.click(pt(100.0, 900.0));
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(session(&core).points.get(0), Some(up(0.1, 0.9)));
    assert_eq!(session(&core).points.active_index(), 1);
}

#[test]
fn four_clicks_place_exact_normalized_corners() {
    let mut core = EngineCore::new();
    core.set_surface(1000.0, 500.0);
    core.load_items(vec![region_item("a", "A", 0.9, 0.9, 0.1, 0.1)]);
    core.select_item("a").unwrap();

    for pos in [pt(250.0, 125.0), pt(750.0, 125.0), pt(750.0, 375.0), pt(250.0, 375.0)] {
        core.click(pos);
    }
    assert_eq!(session(&core).points.to_quad(), Some(square()));
    assert_eq!(session(&core).points.active_index(), 0);
}

#[test]
fn editing_click_on_point_activates_it_without_moving() {
    let mut core = editing("mid");
    let before = *session(&core).points.slots();
    // Corner 2 (index 2) sits at (600, 600).
    let actions = core.click(pt(605.0, 595.0));
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(session(&core).points.active_index(), 2);
    assert_eq!(*session(&core).points.slots(), before);
}

#[test]
fn click_after_activation_moves_that_corner() {
    let mut core = editing("mid");
    core.click(pt(600.0, 600.0));
    core.click(pt(700.0, 800.0));
    assert_eq!(session(&core).points.get(2), Some(up(0.7, 0.8)));
    assert_eq!(session(&core).points.active_index(), 3);
}

#[test]
fn editing_click_off_surface_places_nothing() {
    let mut core = editing("mid");
    let before = session(&core).clone();
    assert!(core.click(pt(1200.0, 500.0)).is_empty());
    assert!(core.click(pt(-1.0, 500.0)).is_empty());
    assert_eq!(session(&core), &before);
}

#[test]
fn editing_click_on_other_item_places_a_corner() {
    let mut core = editing("mid");
    core.click(pt(200.0, 500.0));
    assert_eq!(core.selection(), Some("mid"));
    assert_eq!(session(&core).points.get(0), Some(up(0.2, 0.5)));
}

// =============================================================
// Manual entry
// =============================================================

#[test]
fn manual_entry_sets_corner_unclamped() {
    let mut core = editing("mid");
    core.set_point_from_input(3, 1.25, -0.5).unwrap();
    assert_eq!(session(&core).points.get(3), Some(up(1.25, -0.5)));
    assert_eq!(session(&core).points.active_index(), 0);
}

#[test]
fn manual_entry_coerces_non_finite_to_zero() {
    let mut core = editing("mid");
    core.set_point_from_input(1, f64::NAN, f64::INFINITY).unwrap();
    assert_eq!(session(&core).points.get(1), Some(up(0.0, 0.0)));
}

#[test]
fn manual_entry_requires_selection() {
    let mut core = core();
    assert!(matches!(core.set_point_from_input(0, 0.5, 0.5), Err(EditorError::NoSelection)));
}

#[test]
fn manual_entry_rejects_bad_index() {
    let mut core = editing("mid");
    assert!(matches!(core.set_point_from_input(4, 0.5, 0.5), Err(EditorError::IndexOutOfRange(4))));
}

#[test]
fn set_label_updates_session_only() {
    let mut core = editing("mid");
    core.set_label("Lean Impact (2nd ed.)").unwrap();
    assert_eq!(session(&core).label, "Lean Impact (2nd ed.)");
    assert_eq!(core.item("mid").unwrap().label, "Lean Impact");
}

// =============================================================
// Save
// =============================================================

#[test]
fn save_requires_selection() {
    assert!(matches!(core().save(), Err(EditorError::NoSelection)));
}

#[test]
fn save_requires_four_corners() {
    let mut core = editing("mid");
    core.session
        .as_mut()
        .unwrap()
        .points
        .reset([Some(up(0.1, 0.1)), Some(up(0.2, 0.1)), Some(up(0.2, 0.2)), None]);
    assert!(matches!(core.save(), Err(EditorError::Incomplete { placed: 3 })));
}

#[test]
fn save_builds_corner_update() {
    let mut core = editing("mid");
    for (i, p) in square().0.iter().enumerate() {
        core.set_point_from_input(i, p.u, p.v).unwrap();
    }
    core.set_label("Renamed").unwrap();

    let request = core.save().unwrap();
    assert_eq!(request.id, "mid");
    assert_eq!(request.update, ItemUpdate::corners(square(), "Renamed"));
}

#[test]
fn save_accepts_degenerate_quad() {
    let mut core = editing("mid");
    for i in 0..4 {
        core.set_point_from_input(i, 0.5, 0.5).unwrap();
    }
    assert!(core.save().is_ok());
}

#[test]
fn save_does_not_mutate_state() {
    let core = editing("mid");
    let before = session(&core).clone();
    core.save().unwrap();
    assert_eq!(session(&core), &before);
}

#[test]
fn finish_save_reloads_session_from_store() {
    let mut core = editing("mid");
    core.set_label("Renamed").unwrap();
    let refreshed = vec![quad_item("mid", "Renamed", square())];

    let actions = core.finish_save("mid", SaveOutcome::Saved(refreshed));
    assert!(actions.contains(&Action::RenderNeeded));
    assert!(actions.contains(&Action::Notify("saved mid".into())));
    assert_eq!(core.selection(), Some("mid"));
    assert_eq!(session(&core).points.to_quad(), Some(square()));
    assert_eq!(session(&core).points.active_index(), 0);
    assert!(core.item("mid").unwrap().geometry.has_corners());
}

#[test]
fn late_save_refreshes_list_but_keeps_other_session() {
    let mut core = editing("mid");
    core.select_item("left").unwrap();
    core.set_point_from_input(0, 0.05, 0.05).unwrap();
    let before = session(&core).clone();

    let mut refreshed = shelf();
    refreshed[1] = quad_item("mid", "Lean Impact", square());
    let actions = core.finish_save("mid", SaveOutcome::Saved(refreshed));

    assert!(!actions.iter().any(|a| matches!(a, Action::Notify(_))));
    assert_eq!(session(&core), &before);
    assert!(core.item("mid").unwrap().geometry.has_corners());
}

#[test]
fn late_save_after_cancel_stays_idle() {
    let mut core = editing("mid");
    core.cancel();
    core.finish_save("mid", SaveOutcome::Saved(vec![quad_item("mid", "Lean Impact", square())]));
    assert!(!core.is_editing());
    assert!(core.item("mid").unwrap().geometry.has_corners());
}

#[test]
fn failed_save_keeps_session_and_reports_store_message() {
    let mut core = editing("mid");
    core.set_label("Unsaved").unwrap();
    let before = session(&core).clone();

    let actions = core.finish_save("mid", SaveOutcome::Rejected(rejected("Invalid points format")));
    assert_eq!(actions, vec![Action::ShowError("Invalid points format".into())]);
    assert_eq!(session(&core), &before);
    assert_eq!(core.items.len(), 3);
}

#[test]
fn saved_but_unlisted_reports_both() {
    let mut core = editing("mid");
    core.set_point_from_input(0, 0.25, 0.25).unwrap();
    let before = session(&core).clone();

    let actions = core.finish_save("mid", SaveOutcome::SavedUnrefreshed(rejected("listing unavailable")));
    assert_eq!(
        actions,
        vec![
            Action::Notify("saved mid".into()),
            Action::ShowError("saved mid, but reloading failed: listing unavailable".into()),
        ]
    );
    assert_eq!(session(&core), &before);
}

#[test]
fn saved_but_unlisted_after_deselect_only_reports_error() {
    let mut core = editing("mid");
    core.cancel();

    let actions = core.finish_save("mid", SaveOutcome::SavedUnrefreshed(rejected("listing unavailable")));
    assert_eq!(actions, vec![Action::ShowError("saved mid, but reloading failed: listing unavailable".into())]);
    assert!(!core.is_editing());
}

// =============================================================
// Delete
// =============================================================

#[test]
fn request_delete_asks_for_confirmation() {
    let core = editing("mid");
    assert_eq!(
        core.request_delete().unwrap(),
        Action::ConfirmDelete { id: "mid".into(), label: "Lean Impact".into() }
    );
}

#[test]
fn delete_selected_requires_selection() {
    assert!(matches!(core().delete_selected(), Err(EditorError::NoSelection)));
}

#[test]
fn finish_delete_removes_item_and_ends_session() {
    let mut core = editing("mid");
    assert_eq!(core.delete_selected().unwrap(), Action::DeleteRequested { id: "mid".into() });

    let actions = core.finish_delete("mid", Ok(()));
    assert_eq!(
        actions,
        vec![Action::SelectionChanged(None), Action::Notify("deleted mid".into()), Action::RenderNeeded]
    );
    assert!(core.item("mid").is_none());
    assert!(!core.is_editing());
}

#[test]
fn failed_delete_keeps_everything() {
    let mut core = editing("mid");
    let actions = core.finish_delete("mid", Err(rejected("Book not found")));
    assert_eq!(actions, vec![Action::ShowError("Book not found".into())]);
    assert!(core.item("mid").is_some());
    assert_eq!(core.selection(), Some("mid"));
}

// =============================================================
// Pointer gestures
// =============================================================

#[test]
fn press_and_release_is_a_click() {
    let mut core = core();
    let actions = press_release(&mut core, pt(500.0, 500.0));
    assert!(actions.contains(&Action::SelectionChanged(Some("mid".into()))));
    assert_eq!(core.input, InputState::Idle);
}

#[test]
fn small_jitter_is_still_a_click() {
    let mut core = editing("mid");
    core.on_pointer_down(pt(500.0, 500.0), Button::Primary, no_modifiers());
    assert!(core.on_pointer_move(pt(502.0, 501.0), no_modifiers()).is_empty());
    core.on_pointer_up(pt(502.0, 501.0), Button::Primary, no_modifiers());
    assert_eq!(session(&core).points.get(0), Some(up(0.502, 0.501)));
    assert_eq!(core.item("mid").unwrap().geometry.bounds(), Region::new(0.5, 0.5, 0.2, 0.2));
}

#[test]
fn dragging_region_moves_center_and_session_points() {
    let mut core = editing("mid");
    core.on_pointer_down(pt(500.0, 500.0), Button::Primary, no_modifiers());
    let actions = core.on_pointer_move(pt(600.0, 550.0), no_modifiers());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(matches!(core.input, InputState::DraggingRegion { ref id, .. } if id == "mid"));

    let region = core.item("mid").unwrap().geometry.bounds();
    assert!(approx_eq(region.x, 0.6));
    assert!(approx_eq(region.y, 0.55));
    assert_eq!(region.w, 0.2);

    let first = session(&core).points.get(0).unwrap();
    assert!(approx_eq(first.u, 0.5));
    assert!(approx_eq(first.v, 0.45));

    // Release ends the drag without placing a corner.
    assert!(core.on_pointer_up(pt(600.0, 550.0), Button::Primary, no_modifiers()).is_empty());
    assert_eq!(core.input, InputState::Idle);
    assert_eq!(session(&core).points.active_index(), 0);
}

#[test]
fn drag_applies_incremental_deltas() {
    let mut core = editing("mid");
    core.on_pointer_down(pt(500.0, 500.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(550.0, 500.0), no_modifiers());
    core.on_pointer_move(pt(600.0, 500.0), no_modifiers());
    core.on_pointer_move(pt(580.0, 500.0), no_modifiers());
    assert!(approx_eq(core.item("mid").unwrap().geometry.bounds().x, 0.58));
}

#[test]
fn drag_clamps_center_to_unit_square() {
    let mut core = editing("mid");
    core.on_pointer_down(pt(500.0, 500.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(1000.0, 500.0), no_modifiers());
    core.on_pointer_move(pt(1300.0, 500.0), no_modifiers());

    let region = core.item("mid").unwrap().geometry.bounds();
    assert!(approx_eq(region.x, 1.0));
    // Session points moved by the applied 0.5 only.
    assert!(approx_eq(session(&core).points.get(0).unwrap().u, 0.9));
}

#[test]
fn quad_items_are_not_dragged() {
    let mut core = editing("quad");
    core.on_pointer_down(pt(850.0, 500.0), Button::Primary, no_modifiers());
    assert!(core.on_pointer_move(pt(700.0, 500.0), no_modifiers()).is_empty());
    assert_eq!(core.item("quad").unwrap().geometry.to_quad().0[0], up(0.8, 0.3));
}

#[test]
fn press_on_control_point_does_not_drag() {
    let mut core = editing("mid");
    core.on_pointer_down(pt(400.0, 400.0), Button::Primary, no_modifiers());
    assert_eq!(core.input, InputState::Pressed { start: pt(400.0, 400.0), drag_item: None });
}

#[test]
fn press_outside_selected_region_does_not_drag() {
    let mut core = editing("mid");
    core.on_pointer_down(pt(200.0, 500.0), Button::Primary, no_modifiers());
    assert!(core.on_pointer_move(pt(300.0, 500.0), no_modifiers()).is_empty());
    assert_eq!(core.item("left").unwrap().geometry.bounds().x, 0.2);
}

#[test]
fn pointer_leave_abandons_gesture() {
    let mut core = core();
    core.on_pointer_down(pt(500.0, 500.0), Button::Primary, no_modifiers());
    core.on_pointer_leave();
    assert_eq!(core.input, InputState::Idle);
    assert!(core.on_pointer_up(pt(500.0, 500.0), Button::Primary, no_modifiers()).is_empty());
    assert!(!core.is_editing());
}

#[test]
fn secondary_button_is_ignored() {
    let mut core = core();
    core.on_pointer_down(pt(500.0, 500.0), Button::Secondary, no_modifiers());
    assert_eq!(core.input, InputState::Idle);
    assert!(core.on_pointer_up(pt(500.0, 500.0), Button::Secondary, no_modifiers()).is_empty());
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn escape_cancels() {
    let mut core = editing("mid");
    let actions = core.on_key_down(&Key::named("Escape"), no_modifiers());
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(!core.is_editing());
}

#[test]
fn enter_requests_save() {
    let mut core = editing("mid");
    let actions = core.on_key_down(&Key::named("Enter"), no_modifiers());
    let [Action::SaveRequested(request)] = actions.as_slice() else {
        panic!("expected a save request, got {actions:?}");
    };
    assert_eq!(request.id, "mid");
}

#[test]
fn enter_with_missing_corner_shows_error() {
    let mut core = editing("mid");
    core.session.as_mut().unwrap().points.reset([None; 4]);
    let actions = core.on_key_down(&Key::named("Enter"), no_modifiers());
    assert_eq!(actions, vec![Action::ShowError("four corner points required".into())]);
}

#[test]
fn delete_key_asks_for_confirmation() {
    let mut core = editing("mid");
    for name in ["Delete", "Backspace"] {
        let actions = core.on_key_down(&Key::named(name), no_modifiers());
        assert_eq!(actions, vec![Action::ConfirmDelete { id: "mid".into(), label: "Lean Impact".into() }]);
    }
    assert!(core.item("mid").is_some());
}

#[test]
fn digit_keys_pick_active_corner() {
    let mut core = editing("mid");
    assert_eq!(core.on_key_down(&Key::named("3"), no_modifiers()), vec![Action::RenderNeeded]);
    assert_eq!(session(&core).points.active_index(), 2);
}

#[test]
fn keys_while_idle_do_nothing() {
    let mut core = core();
    for name in ["Escape", "Enter", "Delete", "1", "x"] {
        assert!(core.on_key_down(&Key::named(name), no_modifiers()).is_empty(), "{name}");
    }
}

// =============================================================
// Scene
// =============================================================

#[test]
fn scene_draws_every_item() {
    let core = core();
    let ops = core.scene().unwrap();
    assert!(matches!(ops[0], DrawOp::Clear { .. }));
    assert_eq!(ops.iter().filter(|op| matches!(op, DrawOp::Polygon { .. })).count(), 3);
}

#[test]
fn scene_includes_control_points_while_editing() {
    let core = editing("mid");
    let ops = core.scene().unwrap();
    assert_eq!(ops.iter().filter(|op| matches!(op, DrawOp::Circle { .. })).count(), 8);
}

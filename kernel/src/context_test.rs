#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{PartialShape, ShapeKind};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn rect(id: &str, x: f64, y: f64) -> Shape {
    Shape { p: pt(x, y), width: 10.0, height: 10.0, ..Shape::new(id, ShapeKind::Rectangle) }
}

fn ctx_with(shapes: Vec<Shape>) -> ModeContext {
    let mut ctx = ModeContext::new(KernelConfig::default());
    ctx.load(SceneComposite::new(shapes).unwrap());
    ctx.take_actions();
    ctx
}

fn moved(id: &str, x: f64, y: f64) -> PatchMap {
    let mut patch = PatchMap::new();
    patch.insert(id.into(), PartialShape { p: Some(pt(x, y)), ..Default::default() });
    patch
}

// =============================================================
// Live overlay
// =============================================================

#[test]
fn set_tmp_keeps_committed_shapes() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0)]);
    ctx.set_tmp(moved("a", 5.0, 5.0));
    assert_eq!(ctx.composite().shape("a").unwrap().p, pt(0.0, 0.0));
    assert_eq!(ctx.composite().merged_shape("a").unwrap().p, pt(5.0, 5.0));
    assert_eq!(ctx.take_actions(), [Action::RenderNeeded]);
}

#[test]
fn clearing_empty_overlay_is_silent() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0)]);
    ctx.clear_tmp();
    assert!(ctx.take_actions().is_empty());
}

#[test]
fn commit_folds_overlay_and_reports_patch() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0)]);
    ctx.set_tmp(moved("a", 5.0, 5.0));
    ctx.take_actions();
    ctx.commit();
    assert!(ctx.tmp_patch().is_empty());
    assert_eq!(ctx.composite().shape("a").unwrap().p, pt(5.0, 5.0));
    assert_eq!(ctx.take_actions(), [Action::ShapesUpdated(moved("a", 5.0, 5.0))]);
}

#[test]
fn commit_without_overlay_does_nothing() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0)]);
    ctx.commit();
    assert!(ctx.take_actions().is_empty());
}

#[test]
fn gesture_base_survives_overlay_changes() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0)]);
    let base = Rc::clone(ctx.composite());
    ctx.set_tmp(moved("a", 5.0, 5.0));
    assert_eq!(base.merged_shape("a").unwrap().p, pt(0.0, 0.0));
}

// =============================================================
// Document changes
// =============================================================

#[test]
fn add_shapes_reports_created() {
    let mut ctx = ctx_with(vec![]);
    ctx.add_shapes(vec![rect("n", 1.0, 1.0)]);
    assert!(ctx.composite().contains("n"));
    assert_eq!(ctx.take_actions(), [Action::ShapesCreated(vec![rect("n", 1.0, 1.0)])]);
}

#[test]
fn add_shapes_that_form_a_cycle_are_rejected() {
    let mut ctx = ctx_with(vec![]);
    let mut x = Shape::new("x", ShapeKind::Group);
    x.parent_id = Some("x".into());
    ctx.add_shapes(vec![x]);
    assert!(!ctx.composite().contains("x"));
    assert!(ctx.take_actions().is_empty());
}

#[test]
fn delete_removes_descendants_and_prunes_selection() {
    let mut g = Shape::new("g", ShapeKind::Group);
    g.parent_id = None;
    let mut a = rect("a", 0.0, 0.0);
    a.parent_id = Some("g".into());
    let mut ctx = ctx_with(vec![g, a, rect("b", 50.0, 0.0)]);
    ctx.select(vec!["g".into(), "b".into()]);
    ctx.take_actions();

    ctx.delete_shapes(&["g".into()]);
    assert!(!ctx.composite().contains("a"));
    assert_eq!(ctx.selection(), ["b".to_string()]);
    assert_eq!(
        ctx.take_actions(),
        [Action::SelectionChanged(vec!["b".into()]), Action::ShapesDeleted(vec!["g".into(), "a".into()])]
    );
}

#[test]
fn delete_unknown_is_silent() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0)]);
    ctx.delete_shapes(&["zz".into()]);
    assert!(ctx.take_actions().is_empty());
}

#[test]
fn apply_patch_is_not_reported() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0)]);
    ctx.apply_patch(&moved("a", 3.0, 4.0));
    assert_eq!(ctx.composite().shape("a").unwrap().p, pt(3.0, 4.0));
    assert!(ctx.take_actions().is_empty());
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_skips_unknown_and_repeats() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0), rect("b", 20.0, 0.0)]);
    ctx.select(vec!["b".into(), "zz".into(), "a".into(), "b".into()]);
    assert_eq!(ctx.selection(), ["b".to_string(), "a".to_string()]);
    ctx.select(vec!["b".into(), "a".into()]);
    assert_eq!(ctx.take_actions().len(), 1);
}

#[test]
fn toggle_adds_and_removes() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0), rect("b", 20.0, 0.0)]);
    ctx.toggle_selected("a");
    ctx.toggle_selected("b");
    ctx.toggle_selected("a");
    assert_eq!(ctx.selection(), ["b".to_string()]);
    assert!(ctx.is_selected("b"));
}

#[test]
fn select_all_picks_roots() {
    let mut a = rect("a", 0.0, 0.0);
    a.parent_id = Some("g".into());
    let mut ctx = ctx_with(vec![Shape::new("g", ShapeKind::Group), a, rect("b", 20.0, 0.0)]);
    ctx.select_all();
    assert_eq!(ctx.selection(), ["g".to_string(), "b".to_string()]);
}

#[test]
fn bounding_box_follows_selection() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0)]);
    assert!(ctx.bounding_box().is_none());
    ctx.select(vec!["a".into()]);
    let bbox = ctx.bounding_box().unwrap();
    assert_eq!(bbox.center(), pt(5.0, 5.0));
}

// =============================================================
// Clipboard / plumbing
// =============================================================

#[test]
fn paste_offsets_copies_and_remaps_parents() {
    let mut a = rect("a", 0.0, 0.0);
    a.parent_id = Some("g".into());
    let mut ctx = ctx_with(vec![Shape::new("g", ShapeKind::Group), a]);
    ctx.select(vec!["g".into()]);
    ctx.copy_selection();
    ctx.paste();

    let shapes = ctx.composite().shapes();
    assert_eq!(shapes.len(), 4);
    let new_group = &shapes[2];
    let new_child = &shapes[3];
    assert_ne!(new_group.id, "g");
    assert_eq!(new_child.parent_id.as_ref(), Some(&new_group.id));
    assert_eq!(new_child.p, pt(PASTE_OFFSET, PASTE_OFFSET));
    assert_eq!(ctx.selection(), [new_group.id.clone()]);
}

#[test]
fn paste_with_empty_clipboard_is_noop() {
    let mut ctx = ctx_with(vec![rect("a", 0.0, 0.0)]);
    ctx.paste();
    assert_eq!(ctx.composite().shapes().len(), 1);
    assert!(ctx.take_actions().is_empty());
}

#[test]
fn cursor_changes_are_reported_once() {
    let mut ctx = ctx_with(vec![]);
    ctx.set_cursor("move");
    ctx.set_cursor("move");
    assert_eq!(ctx.take_actions(), [Action::SetCursor("move".into())]);
    assert_eq!(ctx.cursor(), "move");
}

#[test]
fn render_needed_is_queued_once() {
    let mut ctx = ctx_with(vec![]);
    ctx.pan_camera(pt(1.0, 0.0));
    ctx.pan_camera(pt(1.0, 0.0));
    assert_eq!(ctx.take_actions(), [Action::RenderNeeded]);
    assert_eq!(ctx.camera().pan, pt(2.0, 0.0));
}

#[test]
fn generated_ids_are_uuids() {
    let id = ModeContext::generate_id();
    assert!(Uuid::parse_str(&id).is_ok());
    assert_ne!(id, ModeContext::generate_id());
}

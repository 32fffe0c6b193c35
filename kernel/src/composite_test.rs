#![allow(clippy::float_cmp)]

use super::*;
use crate::geom::{Rect, approx_eq};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape { p: pt(x, y), width: w, height: h, ..Shape::new(id, ShapeKind::Rectangle) }
}

fn child(mut shape: Shape, parent: &str) -> Shape {
    shape.parent_id = Some(parent.to_string());
    shape
}

fn group(id: &str) -> Shape {
    Shape::new(id, ShapeKind::Group)
}

/// g contains a and h; h contains b. c is a free root.
fn scene() -> SceneComposite {
    SceneComposite::new(vec![
        group("g"),
        child(rect("a", 0.0, 0.0, 10.0, 10.0), "g"),
        child(group("h"), "g"),
        child(rect("b", 20.0, 20.0, 10.0, 10.0), "h"),
        rect("c", 100.0, 0.0, 10.0, 10.0),
    ])
    .unwrap()
}

// =============================================================
// Construction
// =============================================================

#[test]
fn tree_is_built_from_parent_ids() {
    let s = scene();
    assert_eq!(s.roots(), ["g".to_string(), "c".to_string()]);
    assert_eq!(s.children("g"), ["a".to_string(), "h".to_string()]);
    assert_eq!(s.parent_id("b").map(String::as_str), Some("h"));
    assert!(s.children("missing").is_empty());
}

#[test]
fn parent_cycle_is_rejected() {
    let err = SceneComposite::new(vec![child(group("x"), "y"), child(group("y"), "x")]).unwrap_err();
    assert!(matches!(err, CompositeError::ParentCycle(_)));
}

#[test]
fn self_parent_is_a_cycle() {
    let err = SceneComposite::new(vec![child(group("x"), "x")]).unwrap_err();
    assert_eq!(err, CompositeError::ParentCycle("x".into()));
}

#[test]
fn orphan_becomes_root() {
    let s = SceneComposite::new(vec![child(rect("a", 0.0, 0.0, 1.0, 1.0), "gone")]).unwrap();
    assert!(s.is_orphan("a"));
    assert_eq!(s.roots(), ["a".to_string()]);
    assert!(s.parent_id("a").is_none());
}

#[test]
fn duplicate_id_keeps_first_position_last_value() {
    let s = SceneComposite::new(vec![
        rect("a", 0.0, 0.0, 1.0, 1.0),
        rect("b", 0.0, 0.0, 1.0, 1.0),
        rect("a", 5.0, 5.0, 1.0, 1.0),
    ])
    .unwrap();
    assert_eq!(s.shapes().len(), 2);
    assert_eq!(s.shapes()[0].id, "a");
    assert_eq!(s.shapes()[0].p, pt(5.0, 5.0));
}

#[test]
fn default_is_empty() {
    let s = SceneComposite::default();
    assert!(s.shapes().is_empty());
    assert!(s.roots().is_empty());
    assert!(s.find_shape_at(pt(0.0, 0.0)).is_none());
}

// =============================================================
// Lookups
// =============================================================

#[test]
fn unknown_shape_is_an_error() {
    let s = scene();
    assert_eq!(s.shape("zz").unwrap_err(), CompositeError::UnknownShape("zz".into()));
    assert!(s.merged_shape("zz").is_err());
    assert!(s.get_local_rect_polygon("zz").is_err());
    assert_eq!(CompositeError::UnknownShape("zz".into()).to_string(), "unknown shape: zz");
}

#[test]
fn root_and_ancestor_queries() {
    let s = scene();
    assert_eq!(s.root_of("b"), "g");
    assert_eq!(s.root_of("c"), "c");
    let ids: HashSet<&str> = ["g"].into_iter().collect();
    assert!(s.has_ancestor_in("b", &ids));
    assert!(!s.has_ancestor_in("g", &ids));
    assert!(!s.has_ancestor_in("c", &ids));
}

#[test]
fn branch_ids_lists_parents_first() {
    let s = scene();
    assert_eq!(s.branch_ids("g"), ["g", "a", "h", "b"]);
    assert_eq!(s.branch_ids("c"), ["c"]);
    assert!(s.branch_ids("zz").is_empty());
}

#[test]
fn branch_merged_shapes_are_deduplicated_in_document_order() {
    let s = scene();
    let ids: Vec<ShapeId> = s
        .get_all_branch_merged_shapes(&["h".to_string(), "g".to_string()])
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, ["g", "a", "h", "b"]);
}

// =============================================================
// Overlay
// =============================================================

#[test]
fn overlay_changes_merged_view_only() {
    let s = scene();
    let mut patch = PatchMap::new();
    patch.insert("a".into(), PartialShape { p: Some(pt(50.0, 50.0)), ..Default::default() });
    let next = s.with_tmp_patch(patch);
    assert_eq!(next.shape("a").unwrap().p, pt(0.0, 0.0));
    assert_eq!(next.merged_shape("a").unwrap().p, pt(50.0, 50.0));
    assert_eq!(next.tmp_patch().len(), 1);
    // The group follows its children in the merged view.
    let g = next.merged_shape("g").unwrap();
    let wrapper = ShapeContext::wrapper_rect(&next, g);
    assert!(wrapper.approx_eq(&Rect::new(20.0, 20.0, 40.0, 40.0)));
}

#[test]
fn cached_polygon_matches_fresh_computation() {
    let s = scene();
    let a = s.merged_shape("a").unwrap();
    let cached = s.get_local_rect_polygon("a").unwrap();
    let copy = a.clone();
    let fresh = ShapeContext::local_rect_polygon(&s, &copy);
    assert_eq!(cached, fresh);
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn find_shape_at_resolves_to_root() {
    let s = scene();
    assert_eq!(s.find_shape_at(pt(25.0, 25.0)).as_deref(), Some("g"));
    assert_eq!(s.find_shape_at(pt(105.0, 5.0)).as_deref(), Some("c"));
    // Inside the group's wrapper but on no leaf.
    assert!(s.find_shape_at(pt(15.0, 15.0)).is_none());
}

#[test]
fn find_shape_at_prefers_topmost() {
    let s = SceneComposite::new(vec![rect("under", 0.0, 0.0, 10.0, 10.0), rect("over", 5.0, 5.0, 10.0, 10.0)]).unwrap();
    assert_eq!(s.find_shape_at(pt(7.0, 7.0)).as_deref(), Some("over"));
    assert_eq!(s.find_shape_at(pt(2.0, 2.0)).as_deref(), Some("under"));
}

#[test]
fn selection_polygon_single_and_many() {
    let mut rotated = rect("r", 0.0, 0.0, 10.0, 10.0);
    rotated.rotation = 0.3;
    let s = SceneComposite::new(vec![rotated, rect("c", 20.0, 0.0, 10.0, 10.0)]).unwrap();

    let (_, rotation) = s.selection_polygon(&["r".into()]).unwrap();
    assert_eq!(rotation, 0.3);

    let (poly, rotation) = s.selection_polygon(&["c".into(), "zz".into()]).unwrap();
    assert_eq!(rotation, 0.0);
    assert_eq!(poly, Rect::new(20.0, 0.0, 10.0, 10.0).to_polygon());

    let (poly, rotation) = s.selection_polygon(&["c".into(), "r".into()]).unwrap();
    assert_eq!(rotation, 0.0);
    assert!(approx_eq(poly[2].x, 30.0));
    assert!(poly[2].y > 10.0);

    assert!(s.selection_polygon(&[]).is_none());
}

#[test]
fn wrapper_rect_for_shapes() {
    let s = scene();
    let a = s.merged_shape("a").unwrap();
    let c = s.merged_shape("c").unwrap();
    let r = s.get_wrapper_rect_for_shapes(&[a, c]).unwrap();
    assert!(r.approx_eq(&Rect::new(0.0, 0.0, 110.0, 10.0)));
    assert!(s.get_wrapper_rect_for_shapes(&[]).is_none());
}

#[test]
fn attached_checks_host_kind() {
    let line = Shape { q: Some(pt(10.0, 0.0)), ..Shape::new("l", ShapeKind::Line) };
    let mut label = rect("label", 0.0, 0.0, 5.0, 5.0);
    label.attachment = Some(crate::doc::Attachment {
        id: "l".into(),
        to: pt(0.5, 0.0),
        anchor: pt(0.5, 0.5),
        rotation_type: crate::doc::AttachmentRotation::Absolute,
        rotation: 0.0,
    });
    let s = SceneComposite::new(vec![line, label.clone()]).unwrap();
    assert!(s.attached(&label, AttachKind::Line));
    assert!(!s.attached(&label, AttachKind::Shape));
    let loose = SceneComposite::new(vec![label.clone()]).unwrap();
    assert!(!loose.attached(&label, AttachKind::Line));
}

#[test]
fn snapping_lines_exclude_branches() {
    let s = scene();
    let ids: Vec<ShapeId> = s.snapping_lines(&["g".into()]).into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, ["c"]);
    let (_, lines) = &s.snapping_lines(&[])[4];
    assert_eq!(lines.v.len(), 3);
    assert_eq!(lines.h.len(), 3);
}

#[test]
fn transform_shape_is_pure() {
    let s = scene();
    let a = s.merged_shape("a").unwrap();
    let patch = s.transform_shape(a, &AffineMatrix::translate(pt(5.0, 0.0)));
    assert_eq!(patch.p, Some(pt(5.0, 0.0)));
    assert_eq!(s.merged_shape("a").unwrap().p, pt(0.0, 0.0));
}

#![allow(clippy::float_cmp)]

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use proptest::prelude::*;

use super::*;
use crate::geom::{AffineMatrix, approx_eq};

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn tall_box() -> BoundingBox {
    BoundingBox::from_rect(&Rect::new(0.0, 0.0, 100.0, 200.0))
}

fn assert_affine(m: &AffineMatrix, expected: [f64; 6]) {
    for (i, (a, b)) in m.0.iter().zip(expected.iter()).enumerate() {
        assert!(approx_eq(*a, *b), "component {i}: {a} != {b} in {m:?}");
    }
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn hit_corners_clockwise_from_top_left() {
    let b = tall_box();
    assert_eq!(b.hit_test(pt(0.0, 0.0), 1.0), Some(BoxHit::Corner(0)));
    assert_eq!(b.hit_test(pt(100.0, 0.0), 1.0), Some(BoxHit::Corner(1)));
    assert_eq!(b.hit_test(pt(100.0, 200.0), 1.0), Some(BoxHit::Corner(2)));
    assert_eq!(b.hit_test(pt(0.0, 200.0), 1.0), Some(BoxHit::Corner(3)));
}

#[test]
fn hit_edge_midpoints() {
    let b = tall_box();
    assert_eq!(b.hit_test(pt(50.0, 0.0), 1.0), Some(BoxHit::Segment(0)));
    assert_eq!(b.hit_test(pt(100.0, 100.0), 1.0), Some(BoxHit::Segment(1)));
    assert_eq!(b.hit_test(pt(50.0, 200.0), 1.0), Some(BoxHit::Segment(2)));
    assert_eq!(b.hit_test(pt(0.0, 100.0), 1.0), Some(BoxHit::Segment(3)));
}

#[test]
fn hit_interior_and_outside() {
    let b = tall_box();
    assert_eq!(b.hit_test(pt(50.0, 100.0), 1.0), Some(BoxHit::Area));
    assert_eq!(b.hit_test(pt(500.0, 500.0), 1.0), None);
}

#[test]
fn hit_rotation_beyond_top_right_corner() {
    let b = tall_box();
    let anchor = b.rotation_anchor(1.0);
    assert!(anchor.x > 100.0 && anchor.y < 0.0);
    assert!(approx_eq(anchor.distance(pt(100.0, 0.0)), ROTATE_HANDLE_OFFSET_PX));
    assert_eq!(b.hit_test(anchor, 1.0), Some(BoxHit::Rotation));
}

#[test]
fn small_box_interior_is_area() {
    let b = BoundingBox::from_rect(&Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(b.hit_test(pt(5.0, 5.0), 1.0), Some(BoxHit::Area));
    assert_eq!(b.hit_test(pt(0.0, 0.0), 1.0), Some(BoxHit::Corner(0)));
    assert_eq!(b.hit_test(pt(10.0, 5.0), 1.0), Some(BoxHit::Segment(1)));
    // Outside the box the full handle radius still applies.
    assert_eq!(b.hit_test(pt(-5.0, -5.0), 1.0), Some(BoxHit::Corner(0)));
}

#[test]
fn hit_tolerance_shrinks_when_zoomed_in() {
    let b = tall_box();
    assert_eq!(b.hit_test(pt(-5.0, -5.0), 1.0), Some(BoxHit::Corner(0)));
    assert_eq!(b.hit_test(pt(-5.0, -5.0), 4.0), None);
}

#[test]
fn hit_custom_handle_sizes() {
    let b = tall_box().with_handles(HandleSizes { radius_px: 1.0, ..HandleSizes::default() });
    assert_eq!(b.hit_test(pt(-5.0, -5.0), 1.0), None);
}

#[test]
fn box_hit_serializes_tagged() {
    assert_eq!(serde_json::to_value(BoxHit::Corner(2)).unwrap(), serde_json::json!({ "type": "corner", "index": 2 }));
    assert_eq!(serde_json::to_value(BoxHit::Area).unwrap(), serde_json::json!({ "type": "area" }));
}

// =============================================================
// Resizing base
// =============================================================

#[test]
fn resizing_base_for_corner_zero() {
    let base = tall_box().get_resizing_base(BoxHit::Corner(0)).unwrap();
    assert_eq!(base.origin, pt(100.0, 200.0));
    assert_eq!(base.direction, pt(-100.0, -200.0));
    assert_eq!(base.handle(), pt(0.0, 0.0));
}

#[test]
fn resizing_base_for_segment_spans_one_axis() {
    let b = tall_box();
    let right = b.get_resizing_base(BoxHit::Segment(1)).unwrap();
    assert_eq!(right.origin, pt(0.0, 100.0));
    assert_eq!(right.direction, pt(100.0, 0.0));
    let top = b.get_resizing_base(BoxHit::Segment(0)).unwrap();
    assert_eq!(top.origin, pt(50.0, 200.0));
    assert_eq!(top.direction, pt(0.0, -200.0));
}

#[test]
fn resizing_base_none_for_area_and_rotation() {
    let b = tall_box();
    assert!(b.get_resizing_base(BoxHit::Area).is_none());
    assert!(b.get_resizing_base(BoxHit::Rotation).is_none());
}

// =============================================================
// Resize affine
// =============================================================

#[test]
fn corner_drag_scales_uniformly_along_diagonal() {
    let resizing = tall_box().resizing(BoxHit::Corner(0)).unwrap();
    let m = resizing.get_affine(pt(-10.0, -20.0), ResizeOptions::default());
    assert_affine(&m, [1.1, 0.0, 0.0, 1.1, -10.0, -20.0]);
    let keep = resizing.get_affine(pt(-10.0, -20.0), ResizeOptions { keep_aspect: true, centralize: false });
    assert_affine(&keep, [1.1, 0.0, 0.0, 1.1, -10.0, -20.0]);
}

#[test]
fn corner_drag_scales_axes_independently() {
    let resizing = tall_box().resizing(BoxHit::Corner(0)).unwrap();
    let m = resizing.get_affine(pt(-10.0, -40.0), ResizeOptions::default());
    assert_affine(&m, [1.1, 0.0, 0.0, 1.2, -10.0, -40.0]);
    assert!(m.apply(pt(100.0, 200.0)).approx_eq(pt(100.0, 200.0)));
}

#[test]
fn keep_aspect_takes_larger_factor() {
    let square = BoundingBox::from_rect(&Rect::new(0.0, 0.0, 100.0, 100.0));
    let resizing = square.resizing(BoxHit::Corner(0)).unwrap();
    let m = resizing.get_affine(pt(-10.0, -30.0), ResizeOptions { keep_aspect: true, centralize: false });
    assert!(approx_eq(m[0], m[3]));
    assert!(approx_eq(m[0], 1.3));
}

#[test]
fn keep_aspect_on_bottom_edge_scales_about_top_midpoint() {
    let square = BoundingBox::from_rect(&Rect::new(0.0, 0.0, 100.0, 100.0));
    let resizing = square.resizing(BoxHit::Segment(2)).unwrap();
    let m = resizing.get_affine(pt(0.0, 50.0), ResizeOptions { keep_aspect: true, centralize: false });
    assert_affine(&m, [1.5, 0.0, 0.0, 1.5, -25.0, 0.0]);
}

#[test]
fn keep_aspect_on_edge_uses_active_axis() {
    let resizing = tall_box().resizing(BoxHit::Segment(1)).unwrap();
    let free = resizing.get_affine(pt(20.0, 5.0), ResizeOptions::default());
    assert!(approx_eq(free[0], 1.2));
    assert!(approx_eq(free[3], 1.0));
    let keep = resizing.get_affine(pt(20.0, 5.0), ResizeOptions { keep_aspect: true, centralize: false });
    assert!(approx_eq(keep[0], 1.2));
    assert!(approx_eq(keep[3], 1.2));
}

#[test]
fn centralize_keeps_center_fixed() {
    let b = tall_box();
    let resizing = b.resizing(BoxHit::Corner(2)).unwrap();
    let m = resizing.get_affine(pt(10.0, 20.0), ResizeOptions { keep_aspect: false, centralize: true });
    assert!(approx_eq(m[0], 1.2));
    assert!(approx_eq(m[3], 1.2));
    assert!(m.apply(b.center()).approx_eq(b.center()));
    assert!(m.apply(pt(100.0, 200.0)).approx_eq(pt(110.0, 220.0)));
}

#[test]
fn rotated_box_resizes_in_local_frame() {
    let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    let poly = AffineMatrix::rotate_around(rect.center(), FRAC_PI_2).apply_polygon(&rect.to_polygon());
    let b = BoundingBox::new(poly, FRAC_PI_2);
    let resizing = b.resizing(BoxHit::Corner(2)).unwrap();
    // Local +x is world +y after a quarter turn.
    let m = resizing.get_affine(pt(0.0, 10.0), ResizeOptions::default());
    assert!(m.apply(poly[0]).approx_eq(poly[0]));
    assert!(m.apply(poly[2]).approx_eq(poly[2] + pt(0.0, 10.0)));
    let after = m.apply_polygon(&poly);
    assert!(approx_eq(after[0].distance(after[1]), 110.0));
    assert!(approx_eq(after[1].distance(after[2]), 50.0));
}

#[test]
fn zero_size_box_yields_identity() {
    let b = BoundingBox::new([pt(5.0, 5.0); 4], 0.0);
    let resizing = b.resizing(BoxHit::Corner(0)).unwrap();
    let m = resizing.get_affine(pt(10.0, 10.0), ResizeOptions { keep_aspect: true, centralize: true });
    assert!(m.is_identity());
}

// =============================================================
// Rotating
// =============================================================

#[test]
fn rotating_quarter_turn() {
    let r = BoundingBoxRotating::new(pt(0.0, 0.0), 0.0);
    let m = r.get_affine(pt(10.0, 0.0), pt(0.0, 10.0), false);
    assert!(m.apply(pt(10.0, 0.0)).approx_eq(pt(0.0, 10.0)));
}

#[test]
fn rotating_loose_snap_engages_near_grid() {
    let r = BoundingBoxRotating::new(pt(0.0, 0.0), 0.0);
    let near = pt(1.0, 0.0).rotate(44.0_f64.to_radians()) * 10.0;
    assert!(approx_eq(r.get_target_rotation(pt(10.0, 0.0), near, false), FRAC_PI_4));
    let far = pt(1.0, 0.0).rotate(40.0_f64.to_radians()) * 10.0;
    assert!(approx_eq(r.get_target_rotation(pt(10.0, 0.0), far, false), 40.0_f64.to_radians()));
}

#[test]
fn rotating_force_snap_always_snaps() {
    let r = BoundingBoxRotating::new(pt(0.0, 0.0), 0.0);
    let far = pt(1.0, 0.0).rotate(30.0_f64.to_radians()) * 10.0;
    assert!(approx_eq(r.get_target_rotation(pt(10.0, 0.0), far, true), FRAC_PI_4));
}

#[test]
fn rotating_snaps_absolute_angle() {
    // Box already at 10°; dragging 33° lands at 43°, which loose-snaps to 45°.
    let r = BoundingBoxRotating::new(pt(0.0, 0.0), 10.0_f64.to_radians());
    let current = pt(1.0, 0.0).rotate(33.0_f64.to_radians());
    let target = r.get_target_rotation(pt(1.0, 0.0), current, false);
    assert!(approx_eq(target, FRAC_PI_4));
    let m = r.get_affine(pt(1.0, 0.0), current, false);
    assert!(m.apply(pt(1.0, 0.0)).approx_eq(pt(1.0, 0.0).rotate(35.0_f64.to_radians())));
}

#[test]
fn rotating_loose_snap_can_be_disabled() {
    let r = BoundingBoxRotating::new(pt(0.0, 0.0), 0.0).with_loose_snap_deg(0.0);
    let near = pt(1.0, 0.0).rotate(44.0_f64.to_radians());
    assert!(approx_eq(r.get_target_rotation(pt(1.0, 0.0), near, false), 44.0_f64.to_radians()));
}

#[test]
fn rotating_degenerate_pointer_is_identity() {
    let r = BoundingBoxRotating::new(pt(3.0, 3.0), 0.0);
    assert!(r.get_affine(pt(3.0, 3.0), pt(10.0, 0.0), false).is_identity());
    assert!(r.get_affine(pt(10.0, 0.0), pt(3.0, 3.0), true).is_identity());
}

#[test]
fn rotating_from_box_uses_center() {
    let r = tall_box().rotating();
    assert_eq!(r.origin, pt(50.0, 100.0));
    assert_eq!(r.rotation, 0.0);
}

proptest! {
    #[test]
    fn prop_hit_test_totality(w in 0.05f64..1000.0, h in 0.05f64..1000.0, x in -500.0f64..500.0, y in -500.0f64..500.0) {
        let b = BoundingBox::from_rect(&Rect::new(x, y, w, h));
        for (i, corner) in b.polygon.iter().enumerate() {
            prop_assert_eq!(b.hit_test(*corner, 1.0), Some(BoxHit::Corner(i)));
        }
        for i in 0..4 {
            let mid = b.polygon[i].midpoint(b.polygon[(i + 1) % 4]);
            prop_assert_eq!(b.hit_test(mid, 1.0), Some(BoxHit::Segment(i)));
        }
        prop_assert_eq!(b.hit_test(b.center(), 1.0), Some(BoxHit::Area));
        prop_assert_eq!(b.hit_test(b.rotation_anchor(1.0), 1.0), Some(BoxHit::Rotation));
    }

    #[test]
    fn prop_keep_aspect_equal_factors(dx in -50.0f64..50.0, dy in -50.0f64..50.0, corner in 0usize..4) {
        let square = BoundingBox::from_rect(&Rect::new(0.0, 0.0, 100.0, 100.0));
        let resizing = square.resizing(BoxHit::Corner(corner)).unwrap();
        let m = resizing.get_affine(pt(dx, dy), ResizeOptions { keep_aspect: true, centralize: false });
        prop_assert!(approx_eq(m[0], m[3]));
    }

    #[test]
    fn prop_degenerate_box_never_produces_nan(
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
        w in 0.0f64..1.0e-7,
        dx in -50.0f64..50.0,
        dy in -50.0f64..50.0,
        rotation in -3.0f64..3.0,
    ) {
        let b = BoundingBox::new(Rect::new(x, y, w, w).to_polygon(), rotation);
        for hit in [BoxHit::Corner(0), BoxHit::Corner(3), BoxHit::Segment(1), BoxHit::Segment(2)] {
            let resizing = b.resizing(hit).unwrap();
            let m = resizing.get_affine(pt(dx, dy), ResizeOptions { keep_aspect: true, centralize: true });
            prop_assert!(m.is_finite());
        }
        prop_assert!(b.rotating().get_affine(pt(dx, dy), pt(dy, dx), false).is_finite());
    }
}

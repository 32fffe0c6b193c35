//! Geometry primitives: points, affine matrices, rects, segments and rotation helpers.
//!
//! Everything here is plain value math with no knowledge of shapes. Matrices
//! follow the SVG convention `[a, b, c, d, e, f]`, mapping `(x, y)` to
//! `(a*x + c*y + e, b*x + d*y + f)`, so `m[0]` and `m[3]` are the x/y scale
//! of an axis-aligned scale matrix.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::f64::consts::{PI, TAU};
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::consts::MINVALUE;

/// A point or vector in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Angle of the vector from the positive x axis, in radians.
    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Unit vector in the same direction. A zero vector stays zero.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len < MINVALUE { Self::default() } else { self * (1.0 / len) }
    }

    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Rotate around the origin.
    #[must_use]
    pub fn rotate(self, radian: f64) -> Self {
        let (sin, cos) = radian.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Rotate around `origin`.
    #[must_use]
    pub fn rotate_around(self, origin: Self, radian: f64) -> Self {
        (self - origin).rotate(radian) + origin
    }

    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Four corners, clockwise from the local top-left.
pub type Polygon = [Point; 4];

#[must_use]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < MINVALUE
}

/// Normalize an angle into `[-PI, PI)`.
#[must_use]
pub fn normalize_radian(radian: f64) -> f64 {
    let r = (radian + PI).rem_euclid(TAU) - PI;
    if r.is_finite() { r } else { 0.0 }
}

/// True when two angles describe the same direction.
#[must_use]
pub fn radian_eq(a: f64, b: f64) -> bool {
    normalize_radian(a - b).abs() < MINVALUE
}

/// Round an angle to the nearest multiple of `step`.
#[must_use]
pub fn snap_angle(radian: f64, step: f64) -> f64 {
    if step.abs() < MINVALUE {
        return radian;
    }
    (radian / step).round() * step
}

// =============================================================
// Affine matrix
// =============================================================

/// 2D affine transform `[a, b, c, d, e, f]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix(pub [f64; 6]);

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Index<usize> for AffineMatrix {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl AffineMatrix {
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    #[must_use]
    pub fn translate(v: Point) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, v.x, v.y])
    }

    #[must_use]
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    #[must_use]
    pub fn rotate(radian: f64) -> Self {
        let (sin, cos) = radian.sin_cos();
        Self([cos, sin, -sin, cos, 0.0, 0.0])
    }

    /// Rotation by `radian` around `origin`.
    #[must_use]
    pub fn rotate_around(origin: Point, radian: f64) -> Self {
        Self::translate(origin)
            .then_after(&Self::rotate(radian))
            .then_after(&Self::translate(-origin))
    }

    /// Scale around `origin`.
    #[must_use]
    pub fn scale_around(origin: Point, sx: f64, sy: f64) -> Self {
        Self([sx, 0.0, 0.0, sy, origin.x - sx * origin.x, origin.y - sy * origin.y])
    }

    /// `self ∘ other`: the result applies `other` first, then `self`.
    #[must_use]
    pub fn then_after(&self, other: &Self) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Self([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        ])
    }

    /// Compose so that `self` runs first and `next` second.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        next.then_after(self)
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.0[0] * self.0[3] - self.0[1] * self.0[2]
    }

    /// Inverse matrix, or `None` when the matrix is singular.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < MINVALUE {
            return None;
        }
        let [a, b, c, d, e, f] = self.0;
        Some(Self([
            d / det,
            -b / det,
            -c / det,
            a / det,
            (c * f - d * e) / det,
            (b * e - a * f) / det,
        ]))
    }

    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    /// Apply only the linear part (no translation).
    #[must_use]
    pub fn apply_vector(&self, v: Point) -> Point {
        let [a, b, c, d, _, _] = self.0;
        Point::new(a * v.x + c * v.y, b * v.x + d * v.y)
    }

    #[must_use]
    pub fn apply_polygon(&self, polygon: &Polygon) -> Polygon {
        polygon.map(|p| self.apply(p))
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.0
            .iter()
            .zip(Self::IDENTITY.0.iter())
            .all(|(a, b)| approx_eq(*a, *b))
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

// =============================================================
// Rect
// =============================================================

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rect spanning two arbitrary corners.
    #[must_use]
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Smallest rect containing every point. `None` for an empty iterator.
    pub fn wrap_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some(Self::from_points(min, max))
    }

    /// Smallest rect containing every rect. `None` for an empty iterator.
    pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Self> {
        Self::wrap_points(rects.into_iter().flat_map(|r| [r.top_left(), r.bottom_right()]))
    }

    #[must_use]
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Corners clockwise from top-left.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    #[must_use]
    pub fn translate(&self, v: Point) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.width, self.height)
    }

    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        approx_eq(self.x, other.x)
            && approx_eq(self.y, other.y)
            && approx_eq(self.width, other.width)
            && approx_eq(self.height, other.height)
    }
}

/// Polygon center, taken as the midpoint of the first diagonal.
#[must_use]
pub fn polygon_center(polygon: &Polygon) -> Point {
    polygon[0].midpoint(polygon[2])
}

/// Axis-aligned rect of a polygon after rotating it by `-radian` around `origin`.
#[must_use]
pub fn derotated_rect(polygon: &Polygon, origin: Point, radian: f64) -> Rect {
    let m = AffineMatrix::rotate_around(origin, -radian);
    Rect::wrap_points(m.apply_polygon(polygon)).unwrap_or_default()
}

/// Point-in-convex-polygon test. Works for either winding.
#[must_use]
pub fn is_on_polygon(p: Point, polygon: &Polygon) -> bool {
    let mut positive: Option<bool> = None;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        let c = (b - a).cross(p - a);
        if c.abs() < MINVALUE {
            continue;
        }
        match positive {
            None => positive = Some(c > 0.0),
            Some(side) if side != (c > 0.0) => return false,
            Some(_) => {}
        }
    }
    positive.is_some()
}

// =============================================================
// Segment
// =============================================================

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment(pub Point, pub Point);

impl Segment {
    #[must_use]
    pub fn direction(&self) -> Point {
        self.1 - self.0
    }

    #[must_use]
    pub fn midpoint(&self) -> Point {
        self.0.midpoint(self.1)
    }

    /// True when the segment is parallel to `v`. Degenerate inputs are never parallel.
    #[must_use]
    pub fn is_parallel(&self, v: Point) -> bool {
        let d = self.direction().normalize();
        let n = v.normalize();
        if d.length() < MINVALUE || n.length() < MINVALUE {
            return false;
        }
        d.cross(n).abs() < MINVALUE
    }

    /// Orthogonal projection of `p` onto the infinite line through the segment.
    #[must_use]
    pub fn project(&self, p: Point) -> Point {
        let d = self.direction();
        let len2 = d.dot(d);
        if len2 < MINVALUE {
            return self.0;
        }
        self.0 + d * ((p - self.0).dot(d) / len2)
    }

    /// Distance from `p` to the closest point on the segment itself.
    #[must_use]
    pub fn distance_to(&self, p: Point) -> f64 {
        let d = self.direction();
        let len2 = d.dot(d);
        if len2 < MINVALUE {
            return p.distance(self.0);
        }
        let t = ((p - self.0).dot(d) / len2).clamp(0.0, 1.0);
        p.distance(self.0 + d * t)
    }

    /// Intersection point of two segments, if they cross.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Point> {
        let r = self.direction();
        let s = other.direction();
        let denom = r.cross(s);
        if denom.abs() < MINVALUE {
            return None;
        }
        let qp = other.0 - self.0;
        let t = qp.cross(s) / denom;
        let u = qp.cross(r) / denom;
        if (-MINVALUE..=1.0 + MINVALUE).contains(&t) && (-MINVALUE..=1.0 + MINVALUE).contains(&u) {
            Some(self.0 + r * t)
        } else {
            None
        }
    }

    /// Intersection of the infinite lines through both segments.
    #[must_use]
    pub fn line_intersection(&self, other: &Self) -> Option<Point> {
        let r = self.direction();
        let s = other.direction();
        let denom = r.cross(s);
        if denom.abs() < MINVALUE {
            return None;
        }
        let t = (other.0 - self.0).cross(s) / denom;
        Some(self.0 + r * t)
    }
}

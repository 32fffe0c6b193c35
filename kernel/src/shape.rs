//! Shape contract: the geometric capabilities every shape kind provides.
//!
//! Each [`ShapeKind`] maps to exactly one [`ShapeStruct`] implementation in
//! the [`ShapeRegistry`], which is built once on first use. The composite and
//! the resize engine only ever talk to shapes through this trait.
//!
//! Groups are the one exception to "geometry is stored on the shape": a group
//! has no size of its own and derives its box from its descendants on every
//! call, through the [`ShapeContext`] it is handed.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::consts::{DEFAULT_SHAPE_SIZE, LINE_HIT_WIDTH, MINVALUE};
use crate::doc::{PartialShape, Shape, ShapeKind};
use crate::geom::{
    AffineMatrix, Point, Polygon, Rect, Segment, approx_eq, is_on_polygon, normalize_radian, radian_eq,
};

/// Read access a shape needs to resolve geometry that depends on other shapes.
pub trait ShapeContext {
    /// Direct children of `id`, in document order.
    fn children_of(&self, id: &str) -> Vec<&Shape>;

    /// Local rect polygon of any shape, dispatched through the registry.
    fn local_rect_polygon(&self, shape: &Shape) -> Polygon;

    /// Wrapper rect of any shape, dispatched through the registry.
    fn wrapper_rect(&self, shape: &Shape) -> Rect;
}

/// Geometry contract implemented once per shape kind.
pub trait ShapeStruct: Send + Sync {
    /// Kind tag this implementation governs.
    fn kind(&self) -> ShapeKind;

    /// Build a new shape with kind defaults, then apply `init`.
    fn create(&self, id: &str, init: &PartialShape) -> Shape;

    /// Axis-aligned bounds in world space.
    fn get_wrapper_rect(&self, shape: &Shape, ctx: &dyn ShapeContext) -> Rect {
        Rect::wrap_points(self.get_local_rect_polygon(shape, ctx)).unwrap_or_default()
    }

    /// Corners of the unrotated box, rotated into place. Clockwise from local top-left.
    fn get_local_rect_polygon(&self, shape: &Shape, ctx: &dyn ShapeContext) -> Polygon;

    fn is_point_on(&self, shape: &Shape, p: Point, ctx: &dyn ShapeContext) -> bool;

    /// Fields that change when `affine` is applied. Must not mutate and must
    /// return an empty patch when nothing changes.
    fn resize(&self, shape: &Shape, affine: &AffineMatrix) -> PartialShape;
}

// =============================================================
// Registry
// =============================================================

/// Kind tag to implementation lookup.
pub struct ShapeRegistry {
    structs: HashMap<ShapeKind, Box<dyn ShapeStruct>>,
}

static GLOBAL_REGISTRY: LazyLock<ShapeRegistry> = LazyLock::new(ShapeRegistry::with_builtin);

impl ShapeRegistry {
    /// The process-wide registry holding every built-in kind.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_REGISTRY
    }

    fn with_builtin() -> Self {
        let mut structs: HashMap<ShapeKind, Box<dyn ShapeStruct>> = HashMap::new();
        for s in [
            Box::new(RectStruct { kind: ShapeKind::Rectangle }) as Box<dyn ShapeStruct>,
            Box::new(RectStruct { kind: ShapeKind::Ellipse }),
            Box::new(LineStruct),
            Box::new(GroupStruct),
        ] {
            structs.insert(s.kind(), s);
        }
        Self { structs }
    }

    /// Implementation for `kind`. Every [`ShapeKind`] is registered, so the
    /// fallback to the rectangle struct only guards against future kinds.
    #[must_use]
    pub fn get(&self, kind: ShapeKind) -> &dyn ShapeStruct {
        match self.structs.get(&kind) {
            Some(s) => s.as_ref(),
            None => &RECT_FALLBACK,
        }
    }
}

static RECT_FALLBACK: RectStruct = RectStruct { kind: ShapeKind::Rectangle };

// =============================================================
// Rect-like shapes (rectangle, ellipse)
// =============================================================

/// Box polygon for a shape described by `p`, `width`, `height` and `rotation`.
#[must_use]
pub fn box_polygon(shape: &Shape) -> Polygon {
    let rect = Rect::new(shape.p.x, shape.p.y, shape.width, shape.height);
    if approx_eq(shape.rotation, 0.0) {
        return rect.to_polygon();
    }
    AffineMatrix::rotate_around(rect.center(), shape.rotation).apply_polygon(&rect.to_polygon())
}

/// Recover `p`, `width`, `height` and `rotation` from a transformed box polygon.
fn resize_box(shape: &Shape, affine: &AffineMatrix) -> PartialShape {
    if affine.is_identity() || !affine.is_finite() {
        return PartialShape::default();
    }
    let q = affine.apply_polygon(&box_polygon(shape));
    let top = q[1] - q[0];
    let side = q[3] - q[0];
    let width = top.length();
    let height = if width > MINVALUE { top.cross(side).abs() / width } else { side.length() };
    let rotation = if width > MINVALUE {
        top.angle()
    } else if height > MINVALUE {
        side.angle() - std::f64::consts::FRAC_PI_2
    } else {
        shape.rotation
    };
    let center = q[0].midpoint(q[2]);
    let p = center - Point::new(width * 0.5, height * 0.5);

    let mut patch = PartialShape::default();
    if !p.approx_eq(shape.p) {
        patch.p = Some(p);
    }
    if !approx_eq(width, shape.width) {
        patch.width = Some(width);
    }
    if !approx_eq(height, shape.height) {
        patch.height = Some(height);
    }
    if !radian_eq(rotation, shape.rotation) {
        patch.rotation = Some(normalize_radian(rotation));
    }
    patch
}

struct RectStruct {
    kind: ShapeKind,
}

impl ShapeStruct for RectStruct {
    fn kind(&self) -> ShapeKind {
        self.kind
    }

    fn create(&self, id: &str, init: &PartialShape) -> Shape {
        let mut shape = Shape {
            width: DEFAULT_SHAPE_SIZE,
            height: DEFAULT_SHAPE_SIZE,
            ..Shape::new(id, self.kind)
        };
        shape.apply_partial(init);
        shape
    }

    fn get_local_rect_polygon(&self, shape: &Shape, _ctx: &dyn ShapeContext) -> Polygon {
        box_polygon(shape)
    }

    fn is_point_on(&self, shape: &Shape, p: Point, _ctx: &dyn ShapeContext) -> bool {
        if self.kind == ShapeKind::Ellipse {
            let rx = shape.width * 0.5;
            let ry = shape.height * 0.5;
            if rx < MINVALUE || ry < MINVALUE {
                return false;
            }
            let center = shape.p + Point::new(rx, ry);
            let local = p.rotate_around(center, -shape.rotation) - center;
            return (local.x / rx).powi(2) + (local.y / ry).powi(2) <= 1.0;
        }
        is_on_polygon(p, &box_polygon(shape))
    }

    fn resize(&self, shape: &Shape, affine: &AffineMatrix) -> PartialShape {
        resize_box(shape, affine)
    }
}

// =============================================================
// Line
// =============================================================

/// Start and end of a line shape. A line without `q` is a point.
#[must_use]
pub fn line_points(shape: &Shape) -> (Point, Point) {
    (shape.p, shape.q.unwrap_or(shape.p))
}

struct LineStruct;

impl ShapeStruct for LineStruct {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Line
    }

    fn create(&self, id: &str, init: &PartialShape) -> Shape {
        let mut shape = Shape::new(id, ShapeKind::Line);
        shape.apply_partial(init);
        if shape.q.is_none() {
            shape.q = Some(shape.p + Point::new(DEFAULT_SHAPE_SIZE, 0.0));
        }
        shape
    }

    fn get_local_rect_polygon(&self, shape: &Shape, _ctx: &dyn ShapeContext) -> Polygon {
        let (p, q) = line_points(shape);
        Rect::from_points(p, q).to_polygon()
    }

    fn is_point_on(&self, shape: &Shape, p: Point, _ctx: &dyn ShapeContext) -> bool {
        let (a, b) = line_points(shape);
        Segment(a, b).distance_to(p) <= LINE_HIT_WIDTH
    }

    fn resize(&self, shape: &Shape, affine: &AffineMatrix) -> PartialShape {
        if affine.is_identity() || !affine.is_finite() {
            return PartialShape::default();
        }
        let (p, q) = line_points(shape);
        let (np, nq) = (affine.apply(p), affine.apply(q));
        PartialShape {
            p: (!np.approx_eq(p)).then_some(np),
            q: (!nq.approx_eq(q)).then_some(nq),
            ..Default::default()
        }
    }
}

// =============================================================
// Group
// =============================================================

/// Groups store no size. Their box is the wrapper of every descendant's
/// polygon, taken in the group's own rotated frame.
struct GroupStruct;

impl ShapeStruct for GroupStruct {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Group
    }

    fn create(&self, id: &str, init: &PartialShape) -> Shape {
        let mut shape = Shape::new(id, ShapeKind::Group);
        shape.apply_partial(init);
        shape
    }

    fn get_wrapper_rect(&self, shape: &Shape, ctx: &dyn ShapeContext) -> Rect {
        let rects: Vec<Rect> = ctx.children_of(&shape.id).into_iter().map(|c| ctx.wrapper_rect(c)).collect();
        Rect::union_all(&rects).unwrap_or(Rect::new(shape.p.x, shape.p.y, 0.0, 0.0))
    }

    fn get_local_rect_polygon(&self, shape: &Shape, ctx: &dyn ShapeContext) -> Polygon {
        let mut points = Vec::new();
        collect_leaf_points(shape, ctx, &mut points);
        if points.is_empty() {
            return [shape.p; 4];
        }
        let origin = Point::default();
        let rect = derotated_rect_of(&points, origin, shape.rotation);
        AffineMatrix::rotate_around(origin, shape.rotation).apply_polygon(&rect.to_polygon())
    }

    fn is_point_on(&self, shape: &Shape, p: Point, ctx: &dyn ShapeContext) -> bool {
        ctx.children_of(&shape.id).into_iter().any(|c| {
            let s = ShapeRegistry::global().get(c.kind);
            s.is_point_on(c, p, ctx)
        })
    }

    fn resize(&self, shape: &Shape, affine: &AffineMatrix) -> PartialShape {
        if affine.is_identity() || !affine.is_finite() {
            return PartialShape::default();
        }
        let dir = affine.apply_vector(Point::new(1.0, 0.0).rotate(shape.rotation));
        if dir.length() < MINVALUE {
            return PartialShape::default();
        }
        let rotation = dir.angle();
        PartialShape {
            rotation: (!radian_eq(rotation, shape.rotation)).then(|| normalize_radian(rotation)),
            ..Default::default()
        }
    }
}

fn collect_leaf_points(shape: &Shape, ctx: &dyn ShapeContext, out: &mut Vec<Point>) {
    for child in ctx.children_of(&shape.id) {
        if child.is_group() {
            collect_leaf_points(child, ctx, out);
        } else {
            out.extend(ctx.local_rect_polygon(child));
        }
    }
}

fn derotated_rect_of(points: &[Point], origin: Point, radian: f64) -> Rect {
    if approx_eq(radian, 0.0) {
        return Rect::wrap_points(points.iter().copied()).unwrap_or_default();
    }
    let m = AffineMatrix::rotate_around(origin, -radian);
    Rect::wrap_points(points.iter().map(|p| m.apply(*p))).unwrap_or_default()
}

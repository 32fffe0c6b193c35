//! Snapping engine: pulls a moving point or rect onto nearby guide lines.
//!
//! Candidates come from two places: the pre-extracted edge and center lines of
//! every shape that is not being dragged, and the grid when one is configured.
//! Grid lines are produced on demand around the probe point, so an unbounded
//! grid never has to be materialized.
//!
//! Thresholds are given in screen pixels and divided by the camera scale, so
//! snapping feels the same at every zoom level.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use serde::Serialize;

use crate::consts::MINVALUE;
use crate::doc::ShapeId;
use crate::geom::{Point, Rect, Segment, approx_eq};

/// Guide lines extracted from one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnappingLines {
    /// Lines of constant y. They correct the y coordinate.
    pub h: Vec<Segment>,
    /// Lines of constant x. They correct the x coordinate.
    pub v: Vec<Segment>,
}

/// Edge and center guides of an axis-aligned rect.
#[must_use]
pub fn rect_snapping_lines(rect: &Rect) -> SnappingLines {
    let c = rect.center();
    let h = [rect.y, c.y, rect.bottom()]
        .into_iter()
        .map(|y| Segment(Point::new(rect.x, y), Point::new(rect.right(), y)))
        .collect();
    let v = [rect.x, c.x, rect.right()]
        .into_iter()
        .map(|x| Segment(Point::new(x, rect.y), Point::new(x, rect.bottom())))
        .collect();
    SnappingLines { h, v }
}

/// Outcome of a snap test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnappingResult {
    /// Vector to add to the raw point to land on the snapped point.
    pub diff: Point,
    /// Lines the point snapped to, for highlighting.
    pub lines: Vec<Segment>,
}

#[derive(Debug, Clone, Copy)]
struct AxisHit {
    line: Segment,
    snapped: Point,
    distance: f64,
}

#[derive(Debug, Clone)]
pub struct Snapping {
    h: Vec<Segment>,
    v: Vec<Segment>,
    grid_size: Option<f64>,
    threshold: f64,
}

impl Snapping {
    #[must_use]
    pub fn new(shape_lines: &[(ShapeId, SnappingLines)], grid_size: Option<f64>, scale: f64, threshold_px: f64) -> Self {
        let scale = if scale.is_finite() && scale > MINVALUE { scale } else { 1.0 };
        Self {
            h: shape_lines.iter().flat_map(|(_, l)| l.h.iter().copied()).collect(),
            v: shape_lines.iter().flat_map(|(_, l)| l.v.iter().copied()).collect(),
            grid_size: grid_size.filter(|g| g.is_finite() && *g > MINVALUE),
            threshold: threshold_px / scale,
        }
    }

    /// Threshold in world units.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Snap `point`, dragged from `origin`, onto the nearest guides.
    ///
    /// Lines parallel to the drag vector are ignored. When both axes hit and
    /// agree on the corrected point both lines are reported; otherwise only
    /// the closer axis is.
    #[must_use]
    pub fn test_point(&self, point: Point, origin: Point) -> Option<SnappingResult> {
        let drag = point - origin;
        let hit_h = self.closest(self.h_candidates(point), point, drag);
        let hit_v = self.closest(self.v_candidates(point), point, drag);

        match (hit_h, hit_v) {
            (None, None) => None,
            (Some(h), None) => Some(SnappingResult { diff: h.snapped - point, lines: vec![h.line] }),
            (None, Some(v)) => Some(SnappingResult { diff: v.snapped - point, lines: vec![v.line] }),
            (Some(h), Some(v)) => {
                let via_v = h.line.project(v.snapped);
                let via_h = v.line.project(h.snapped);
                if via_v.approx_eq(via_h) {
                    Some(SnappingResult { diff: via_v - point, lines: vec![h.line, v.line] })
                } else if h.distance <= v.distance {
                    Some(SnappingResult { diff: h.snapped - point, lines: vec![h.line] })
                } else {
                    Some(SnappingResult { diff: v.snapped - point, lines: vec![v.line] })
                }
            }
        }
    }

    /// Snap a moving rect by its left/center/right and top/center/bottom.
    /// Each axis is corrected independently.
    #[must_use]
    pub fn test_rect(&self, rect: &Rect) -> Option<SnappingResult> {
        let c = rect.center();
        let best_v = [rect.x, c.x, rect.right()]
            .into_iter()
            .filter_map(|x| {
                let probe = Point::new(x, c.y);
                self.closest(self.v_candidates(probe), probe, Point::default())
                    .map(|hit| (hit, hit.snapped.x - x))
            })
            .min_by(|a, b| a.0.distance.total_cmp(&b.0.distance));
        let best_h = [rect.y, c.y, rect.bottom()]
            .into_iter()
            .filter_map(|y| {
                let probe = Point::new(c.x, y);
                self.closest(self.h_candidates(probe), probe, Point::default())
                    .map(|hit| (hit, hit.snapped.y - y))
            })
            .min_by(|a, b| a.0.distance.total_cmp(&b.0.distance));

        if best_v.is_none() && best_h.is_none() {
            return None;
        }
        let mut diff = Point::default();
        let mut lines = Vec::new();
        if let Some((hit, dx)) = best_v {
            diff.x = dx;
            lines.push(hit.line);
        }
        if let Some((hit, dy)) = best_h {
            diff.y = dy;
            lines.push(hit.line);
        }
        Some(SnappingResult { diff, lines })
    }

    fn h_candidates(&self, near: Point) -> impl Iterator<Item = Segment> + '_ {
        let grid = self.grid_size.map(|g| {
            let y = (near.y / g).round() * g;
            Segment(Point::new(near.x - g, y), Point::new(near.x + g, y))
        });
        self.h.iter().copied().chain(grid)
    }

    fn v_candidates(&self, near: Point) -> impl Iterator<Item = Segment> + '_ {
        let grid = self.grid_size.map(|g| {
            let x = (near.x / g).round() * g;
            Segment(Point::new(x, near.y - g), Point::new(x, near.y + g))
        });
        self.v.iter().copied().chain(grid)
    }

    fn closest(&self, lines: impl Iterator<Item = Segment>, p: Point, drag: Point) -> Option<AxisHit> {
        let mut best: Option<AxisHit> = None;
        for line in lines {
            if line.direction().length() < MINVALUE || line.is_parallel(drag) {
                continue;
            }
            let snapped = line.project(p);
            let distance = p.distance(snapped);
            if distance > self.threshold && !approx_eq(distance, self.threshold) {
                continue;
            }
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(AxisHit { line, snapped, distance });
            }
        }
        best
    }
}

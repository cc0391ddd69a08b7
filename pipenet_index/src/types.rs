// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry helpers shared by the backends.

use core::cmp::Ordering;

use kurbo::{Line, ParamCurveNearest, Point, Rect};

/// Splitting axis used by partitioning backends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Partition by x coordinate.
    X,
    /// Partition by y coordinate.
    Y,
}

impl Axis {
    /// Axis used at a given tree depth (x at even depths, y at odd).
    pub const fn for_depth(depth: usize) -> Self {
        if depth % 2 == 0 { Self::X } else { Self::Y }
    }

    /// The other axis.
    pub const fn flip(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// Coordinate of `p` along this axis.
    #[inline]
    pub fn coord(self, p: Point) -> f64 {
        match self {
            Self::X => p.x,
            Self::Y => p.y,
        }
    }
}

/// Candidate produced by a nearest query against a backend.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor {
    /// Backend slot of the segment.
    pub slot: usize,
    /// Squared distance from the query point to the segment.
    pub distance_sq: f64,
    /// Clamped projection parameter of the query point on the segment.
    pub t: f64,
}

impl Neighbor {
    /// Measure `line` (stored in `slot`) against `pt`.
    #[inline]
    pub fn measure(slot: usize, line: &Line, pt: Point) -> Self {
        let n = line.nearest(pt, 0.0);
        Self {
            slot,
            distance_sq: n.distance_sq,
            t: n.t,
        }
    }

    /// Total order used by every backend: smaller distance first, then lower slot.
    ///
    /// Sharing the tie-break keeps backends interchangeable.
    #[inline]
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        self.distance_sq
            .total_cmp(&other.distance_sq)
            .then(self.slot.cmp(&other.slot))
    }

    /// Whether `self` ranks strictly ahead of `other`.
    #[inline]
    pub fn beats(&self, other: &Self) -> bool {
        self.cmp_rank(other) == Ordering::Less
    }
}

/// Axis-aligned bounds of a segment.
#[inline]
pub fn bounds(line: &Line) -> Rect {
    Rect::new(
        line.p0.x.min(line.p1.x),
        line.p0.y.min(line.p1.y),
        line.p0.x.max(line.p1.x),
        line.p0.y.max(line.p1.y),
    )
}

/// Midpoint of a segment.
#[inline]
pub fn midpoint(line: &Line) -> Point {
    line.p0.midpoint(line.p1)
}

/// Closed overlap test; degenerate (zero-area) rectangles still overlap.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Squared distance from `p` to the closest point of `rect` (zero inside).
#[inline]
pub fn rect_distance_sq(rect: &Rect, p: Point) -> f64 {
    let dx = (rect.x0 - p.x).max(0.0).max(p.x - rect.x1);
    let dy = (rect.y0 - p.y).max(0.0).max(p.y - rect.y1);
    dx * dx + dy * dy
}

/// Half-perimeter of a rectangle.
///
/// Used instead of area for split and enlargement costs: a horizontal or
/// vertical segment has a zero-area box, which would make every area cost tie.
#[inline]
pub fn margin(rect: &Rect) -> f64 {
    rect.width().max(0.0) + rect.height().max(0.0)
}

/// Whether two closed segments share at least one point.
pub fn segments_intersect(a: &Line, b: &Line) -> bool {
    let d1 = orient(b.p0, b.p1, a.p0);
    let d2 = orient(b.p0, b.p1, a.p1);
    let d3 = orient(a.p0, a.p1, b.p0);
    let d4 = orient(a.p0, a.p1, b.p1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b, a.p0))
        || (d2 == 0.0 && on_segment(b, a.p1))
        || (d3 == 0.0 && on_segment(a, b.p0))
        || (d4 == 0.0 && on_segment(a, b.p1))
}

#[inline]
fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

// `p` is known to be collinear with `line`.
#[inline]
fn on_segment(line: &Line, p: Point) -> bool {
    let r = bounds(line);
    r.x0 <= p.x && p.x <= r.x1 && r.y0 <= p.y && p.y <= r.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_distance_is_zero_inside_and_grows_outside() {
        let r = Rect::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(rect_distance_sq(&r, Point::new(3.0, 3.0)), 0.0);
        assert_eq!(rect_distance_sq(&r, Point::new(13.0, 1.0)), 9.0);
        assert_eq!(rect_distance_sq(&r, Point::new(13.0, 9.0)), 25.0);
    }

    #[test]
    fn crossing_and_touching_segments_intersect() {
        let a = Line::new((0.0, 0.0), (10.0, 10.0));
        let b = Line::new((0.0, 10.0), (10.0, 0.0));
        assert!(segments_intersect(&a, &b));

        let touching = Line::new((10.0, 10.0), (20.0, 10.0));
        assert!(segments_intersect(&a, &touching));

        let apart = Line::new((0.0, 1.0), (0.0, 5.0));
        assert!(!segments_intersect(&a, &apart));
    }

    #[test]
    fn collinear_disjoint_segments_do_not_intersect() {
        let a = Line::new((0.0, 0.0), (1.0, 0.0));
        let b = Line::new((2.0, 0.0), (3.0, 0.0));
        assert!(!segments_intersect(&a, &b));
        let c = Line::new((0.5, 0.0), (3.0, 0.0));
        assert!(segments_intersect(&a, &c));
    }

    #[test]
    fn neighbor_rank_breaks_ties_by_slot() {
        let a = Neighbor {
            slot: 3,
            distance_sq: 1.0,
            t: 0.0,
        };
        let b = Neighbor {
            slot: 1,
            distance_sq: 1.0,
            t: 0.5,
        };
        assert!(b.beats(&a));
        assert!(!a.beats(&b));
    }

    #[test]
    fn zero_length_segment_projects_to_start() {
        let l = Line::new((2.0, 2.0), (2.0, 2.0));
        let n = Neighbor::measure(0, &l, Point::new(5.0, 6.0));
        assert_eq!(n.t, 0.0);
        assert_eq!(n.distance_sq, 25.0);
    }
}

// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Segment nodes: identifiers, flags, and per-segment geometry.

use core::fmt;

use bitflags::bitflags;
use kurbo::{Line, ParamCurveNearest, Point, Rect};

use crate::point::Point2D;

/// Identifier for a segment in a [`Graph`](crate::Graph).
///
/// This is an index into the graph's segment arena. It is stable for the
/// lifetime of one build; rebuilding the graph reassigns ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub(crate) u32);

impl SegmentId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Segment ids are 32-bit; networks never approach that many segments."
    )]
    pub(crate) const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    /// Position of the segment in [`Graph::segments`](crate::Graph::segments).
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque caller-side identifier of a building marker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingId(pub u64);

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Segment flags describing how a segment came to exist.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SegmentFlags: u8 {
        /// Synthetic link from a building to its projection on the network.
        const BUILDING_CONNECTION = 0b0000_0001;
        /// Piece of an input segment split at building projection points.
        const SPLIT               = 0b0000_0010;
    }
}

impl Default for SegmentFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// One straight segment of the network and its adjacency.
///
/// Endpoints are never equal: zero-length pieces are dropped before a node
/// is created.
#[derive(Clone, Debug)]
pub struct SegmentNode {
    id: SegmentId,
    start: Point2D,
    end: Point2D,
    neighbors: Vec<SegmentId>,
    flags: SegmentFlags,
    building: Option<BuildingId>,
}

impl SegmentNode {
    pub(crate) fn new(id: SegmentId, start: Point2D, end: Point2D, flags: SegmentFlags) -> Self {
        debug_assert!(start != end, "segment endpoints must differ");
        Self {
            id,
            start,
            end,
            neighbors: Vec::new(),
            flags,
            building: None,
        }
    }

    pub(crate) fn connection(
        id: SegmentId,
        start: Point2D,
        end: Point2D,
        building: BuildingId,
    ) -> Self {
        Self {
            building: Some(building),
            ..Self::new(id, start, end, SegmentFlags::BUILDING_CONNECTION)
        }
    }

    /// This segment's id.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Start vertex.
    pub fn start(&self) -> Point2D {
        self.start
    }

    /// End vertex.
    pub fn end(&self) -> Point2D {
        self.end
    }

    /// Segments sharing an endpoint with this one, in insertion order.
    pub fn neighbors(&self) -> &[SegmentId] {
        &self.neighbors
    }

    /// Flags.
    pub fn flags(&self) -> SegmentFlags {
        self.flags
    }

    /// Whether this is a synthetic building connection.
    pub fn is_building_connection(&self) -> bool {
        self.flags.contains(SegmentFlags::BUILDING_CONNECTION)
    }

    /// The building this connection serves, if any.
    pub fn building_id(&self) -> Option<BuildingId> {
        self.building
    }

    /// The segment as a kurbo line.
    pub fn line(&self) -> Line {
        Line::new(self.start.to_point(), self.end.to_point())
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.start.distance_squared_to(&self.end).sqrt()
    }

    /// Axis-aligned bounds of the segment.
    pub fn bounding_box(&self) -> Rect {
        Rect::from_points(self.start.to_point(), self.end.to_point())
    }

    /// Whether `p` is one of the endpoints.
    pub fn touches(&self, p: Point2D) -> bool {
        self.start == p || self.end == p
    }

    /// The endpoint opposite `p`, or `None` if `p` is not an endpoint.
    pub fn other_end(&self, p: Point2D) -> Option<Point2D> {
        if p == self.start {
            Some(self.end)
        } else if p == self.end {
            Some(self.start)
        } else {
            None
        }
    }

    /// Clamped projection parameter of `p` (0 at start, 1 at end).
    pub fn parameter_at_point(&self, p: Point) -> f64 {
        self.line().nearest(p, 0.0).t
    }

    /// Closest point of the segment to `p`.
    pub fn nearest_point(&self, p: Point) -> Point {
        let t = self.parameter_at_point(p);
        self.start.to_point().lerp(self.end.to_point(), t)
    }

    /// Squared distance from `p` to its clamped projection.
    pub fn distance_squared_to_point(&self, p: Point) -> f64 {
        self.line().nearest(p, 0.0).distance_sq
    }

    /// Arithmetic mean of the endpoints.
    pub fn midpoint(&self) -> Point {
        self.start.to_point().midpoint(self.end.to_point())
    }

    /// Link `other` as a neighbor. Repeats and self-links are ignored.
    pub(crate) fn add_neighbor(&mut self, other: SegmentId) {
        if other != self.id && !self.neighbors.contains(&other) {
            self.neighbors.push(other);
        }
    }

    /// Whether `other` is a neighbor.
    pub fn has_neighbor(&self, other: SegmentId) -> bool {
        self.neighbors.contains(&other)
    }

    pub(crate) fn clear_neighbors(&mut self) {
        self.neighbors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    fn seg(id: usize, a: (f64, f64), b: (f64, f64)) -> SegmentNode {
        SegmentNode::new(
            SegmentId::new(id),
            Point2D::snapped(a.into(), TOL),
            Point2D::snapped(b.into(), TOL),
            SegmentFlags::empty(),
        )
    }

    #[test]
    fn projection_is_clamped() {
        let s = seg(0, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(s.parameter_at_point(Point::new(-5.0, 1.0)), 0.0);
        assert_eq!(s.parameter_at_point(Point::new(15.0, 1.0)), 1.0);
        assert!((s.parameter_at_point(Point::new(3.0, 4.0)) - 0.3).abs() < 1e-12);
        assert!((s.distance_squared_to_point(Point::new(-3.0, 4.0)) - 25.0).abs() < 1e-9);
        assert!((s.distance_squared_to_point(Point::new(3.0, 4.0)) - 16.0).abs() < 1e-9);
        let q = s.nearest_point(Point::new(7.0, -2.0));
        assert!((q - Point::new(7.0, 0.0)).hypot() < 1e-9);
    }

    #[test]
    fn geometry_helpers() {
        let s = seg(0, (0.0, 0.0), (3.0, 4.0));
        assert!((s.length() - 5.0).abs() < 1e-9);
        let m = s.midpoint();
        assert!((m - Point::new(1.5, 2.0)).hypot() < 1e-9);
        let bb = s.bounding_box();
        assert!((bb.width() - 3.0).abs() < 1e-9 && (bb.height() - 4.0).abs() < 1e-9);
        assert_eq!(s.other_end(s.start()), Some(s.end()));
        assert_eq!(s.other_end(s.end()), Some(s.start()));
        assert_eq!(s.other_end(Point2D::snapped(Point::new(1.0, 1.0), TOL)), None);
    }

    #[test]
    fn add_neighbor_is_idempotent() {
        let mut s = seg(0, (0.0, 0.0), (1.0, 0.0));
        s.add_neighbor(SegmentId::new(3));
        s.add_neighbor(SegmentId::new(3));
        s.add_neighbor(SegmentId::new(0));
        assert_eq!(s.neighbors(), &[SegmentId::new(3)]);
        assert!(s.has_neighbor(SegmentId::new(3)));
        assert!(!s.has_neighbor(SegmentId::new(0)), "self-links are ignored");
    }

    #[test]
    fn connection_carries_building() {
        let s = SegmentNode::connection(
            SegmentId::new(1),
            Point2D::snapped(Point::new(0.0, 5.0), TOL),
            Point2D::snapped(Point::new(0.0, 0.0), TOL),
            BuildingId(9),
        );
        assert!(s.is_building_connection());
        assert_eq!(s.building_id(), Some(BuildingId(9)));
        assert!(!s.flags().contains(SegmentFlags::SPLIT));
    }
}

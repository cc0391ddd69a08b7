// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived read-only views: dead-end vertices and segment labels.

use core::fmt;
use std::collections::HashMap;

use kurbo::Point;

use crate::graph::Graph;
use crate::point::Point2D;
use crate::segment::SegmentId;

/// Human-readable label for one segment.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentLabel {
    /// The labelled segment.
    pub segment: SegmentId,
    /// Where to draw the label: the segment midpoint.
    pub position: Point,
    /// `"<component>.<order>"`, both counted from 1.
    pub label: String,
}

impl fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Lazy depth-first labelling of every component, root first.
///
/// Created by [`Graph::segments_numbering`].
#[derive(Clone, Debug)]
pub struct SegmentNumbering<'a> {
    graph: &'a Graph,
    /// Components started so far; also the current component number.
    component: usize,
    order: usize,
    stack: Vec<SegmentId>,
    visited: Vec<bool>,
}

impl Iterator for SegmentNumbering<'_> {
    type Item = SegmentLabel;

    fn next(&mut self) -> Option<SegmentLabel> {
        loop {
            if let Some(id) = self.stack.pop() {
                if std::mem::replace(&mut self.visited[id.index()], true) {
                    continue;
                }
                let seg = &self.graph.segments()[id.index()];
                // Reversed so the lowest neighbor is visited first.
                for &n in seg.neighbors().iter().rev() {
                    if !self.visited[n.index()] {
                        self.stack.push(n);
                    }
                }
                self.order += 1;
                return Some(SegmentLabel {
                    segment: id,
                    position: seg.midpoint(),
                    label: format!("{}.{}", self.component, self.order),
                });
            }
            let next = self.graph.components().get(self.component)?;
            self.component += 1;
            self.order = 0;
            if let Some(start) = next.root().or_else(|| next.segments().first().copied()) {
                self.stack.push(start);
            }
        }
    }
}

impl Graph {
    /// Vertices touched by exactly one segment, in ascending order.
    pub fn leaf_node_points(&self) -> Vec<Point2D> {
        let mut degree: HashMap<Point2D, usize> = HashMap::new();
        for s in &self.segments {
            *degree.entry(s.start()).or_default() += 1;
            *degree.entry(s.end()).or_default() += 1;
        }
        let mut leaves: Vec<Point2D> = degree
            .into_iter()
            .filter_map(|(p, n)| (n == 1).then_some(p))
            .collect();
        leaves.sort_unstable();
        leaves
    }

    /// Label every segment by component and depth-first visitation order.
    ///
    /// Components are numbered in discovery order. Each traversal starts at
    /// the component's root. Calling this again restarts the sequence.
    ///
    /// ```rust
    /// use pipenet_topology::{Graph, NetworkInput};
    ///
    /// let mut graph = Graph::default();
    /// let input = NetworkInput::new()
    ///     .with_polyline([(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)])
    ///     .with_root((20.0, 0.0));
    /// graph.build_graph(&input).unwrap();
    /// let labels: Vec<String> = graph.segments_numbering().map(|l| l.label).collect();
    /// assert_eq!(labels, ["1.1", "1.2"]);
    /// ```
    pub fn segments_numbering(&self) -> SegmentNumbering<'_> {
        SegmentNumbering {
            graph: self,
            component: 0,
            order: 0,
            stack: Vec::new(),
            visited: vec![false; self.segments.len()],
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Graph, NetworkInput, SegmentId};

    fn star() -> NetworkInput {
        // Three arms meeting at the origin, plus a separate two-piece line.
        NetworkInput::new()
            .with_polyline([(0.0, 0.0), (10.0, 0.0)])
            .with_polyline([(0.0, 0.0), (0.0, 10.0)])
            .with_polyline([(0.0, 0.0), (-10.0, 0.0)])
            .with_polyline([(50.0, 0.0), (60.0, 0.0), (70.0, 0.0)])
            .with_root((10.0, 0.0))
            .with_root((70.0, 0.0))
    }

    #[test]
    fn leaf_points_are_dead_ends() {
        let mut g = Graph::default();
        g.build_graph(&star()).unwrap();
        let leaves: Vec<(f64, f64)> = g
            .leaf_node_points()
            .iter()
            .map(|p| (p.x().round(), p.y().round()))
            .collect();
        assert_eq!(
            leaves,
            vec![(-10.0, 0.0), (0.0, 10.0), (10.0, 0.0), (50.0, 0.0), (70.0, 0.0)]
        );
    }

    #[test]
    fn numbering_starts_at_roots() {
        let mut g = Graph::default();
        g.build_graph(&star()).unwrap();
        let labels: Vec<(SegmentId, String)> = g
            .segments_numbering()
            .map(|l| (l.segment, l.label))
            .collect();
        let expected = [
            (0, "1.1"),
            (1, "1.2"),
            (2, "1.3"),
            (4, "2.1"),
            (3, "2.2"),
        ];
        assert_eq!(labels.len(), expected.len());
        for ((seg, label), (want_seg, want_label)) in labels.iter().zip(expected) {
            assert_eq!(seg.index(), want_seg);
            assert_eq!(label, want_label);
        }
    }

    #[test]
    fn numbering_restarts() {
        let mut g = Graph::default();
        g.build_graph(&star()).unwrap();
        let first: Vec<_> = g.segments_numbering().collect();
        let second: Vec<_> = g.segments_numbering().collect();
        assert_eq!(first, second);
        assert_eq!(first[0].to_string(), "1.1");
        assert!((first[0].position.x - 5.0).abs() < 1e-9);
    }
}

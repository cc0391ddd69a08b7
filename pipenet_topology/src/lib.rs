// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipenet Topology: turn loose digitized line work into a rooted network graph.
//!
//! Road and pipe centerlines arrive from a drawing as independent polylines whose
//! endpoints only nearly meet. This crate reconstructs the network they describe:
//!
//! - Snaps vertices within a tolerance into shared graph vertices.
//! - Links segments that share an endpoint and partitions them into connected components.
//! - Resolves externally supplied root points, one per independent sub-network.
//! - Projects building markers onto their nearest segment (steering around no-cross
//!   barrier lines), splits the segment there, and adds a connection segment.
//! - Refuses to hand out a graph with an unrooted or leftover component.
//!
//! Downstream stages (sizing, numbering, rendering) can then rely on every segment
//! having exactly one component and every component exactly one root.
//!
//! ## Vertices and tolerance
//!
//! Vertex identity is decided once per build by a [`VertexPool`]: each point is snapped
//! to a grid of spacing [`TopologyConfig::tolerance`], and a point within tolerance of
//! an earlier one reuses that point's vertex even across a grid line. [`Point2D`] equality
//! and hashing use the integer grid cell only, so they always agree.
//!
//! ## Spatial queries
//!
//! Nearest-segment queries run on [`pipenet_index`]. The backend for the network and
//! for the barriers is picked with [`TopologyConfig::index`] and
//! [`TopologyConfig::barrier_index`]; every backend returns the same answers.
//!
//! ## API overview
//!
//! - [`Graph`]: owns the segments, the indexes and the build result.
//! - [`NetworkInput`]: polylines, root points, [`BuildingMarker`]s and barrier lines.
//! - [`SegmentNode`]: one segment with its neighbors, [`SegmentFlags`] and building id.
//! - [`ConnectedComponent`]: member segments and root.
//! - [`BuildingAttachment`]: where each building joined the network.
//! - [`TopologyError`]: why a build failed.
//!
//! Key operations:
//! - [`Graph::build_graph`] → `Result<()>`
//! - [`Graph::find_nearest`] and [`Graph::find_nearest_avoiding_barriers`]
//! - [`Graph::leaf_node_points`] → dead-end vertices
//! - [`Graph::segments_numbering`] → lazy `"<component>.<order>"` labels
//!
//! ## Logging
//!
//! Builds emit [`tracing`] events: `debug` per phase, `info` on success, and `warn`
//! when a build fails or a building can only be attached across a barrier.
//!
//! ### Minimal usage
//!
//! ```
//! use pipenet_topology::{BuildingId, Graph, NetworkInput, SegmentFlags};
//!
//! let input = NetworkInput::new()
//!     // An L-shaped street and a separate straight one.
//!     .with_polyline([(0.0, 0.0), (100.0, 0.0), (100.0, 80.0)])
//!     .with_polyline([(200.0, 0.0), (300.0, 0.0)])
//!     .with_root((0.0, 0.0))
//!     .with_root((300.0, 0.0))
//!     .with_building((40.0, 12.0), BuildingId(7));
//!
//! let mut graph = Graph::default();
//! graph.build_graph(&input).unwrap();
//!
//! assert_eq!(graph.components().len(), 2);
//! assert_eq!(graph.roots().len(), 2);
//!
//! // The first street was split where the building projects onto it.
//! let attachment = graph.attachments()[0];
//! assert!((attachment.point.x() - 40.0).abs() < 1e-9);
//! let connection = graph.segment(attachment.connection.unwrap()).unwrap();
//! assert!(connection.flags().contains(SegmentFlags::BUILDING_CONNECTION));
//! assert_eq!(connection.building_id(), Some(BuildingId(7)));
//! ```

pub mod component;
pub mod config;
pub mod error;
pub mod graph;
pub mod input;
pub mod numbering;
pub mod point;
pub mod projection;
pub mod segment;

pub use component::ConnectedComponent;
pub use config::{DEFAULT_TOLERANCE, TopologyConfig};
pub use error::{PointKind, Result, TopologyError};
pub use graph::Graph;
pub use input::{BuildingMarker, NetworkInput};
pub use numbering::{SegmentLabel, SegmentNumbering};
pub use pipenet_index::IndexKind;
pub use point::{Point2D, VertexPool};
pub use projection::BuildingAttachment;
pub use segment::{BuildingId, SegmentFlags, SegmentId, SegmentNode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_symmetric_after_projection() {
        let input = NetworkInput::new()
            .with_polyline([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
            .with_polyline([(10.0, 10.0), (20.0, 10.0)])
            .with_root((0.0, 0.0))
            .with_building((4.0, 3.0), BuildingId(1))
            .with_building((14.0, 12.0), BuildingId(2));
        let mut graph = Graph::default();
        graph.build_graph(&input).unwrap();
        for s in graph.segments() {
            for &n in s.neighbors() {
                assert!(
                    graph.segments()[n.index()].has_neighbor(s.id()),
                    "{:?} -> {:?} is one-sided",
                    s.id(),
                    n
                );
            }
        }
        assert_eq!(graph.components().len(), 1);
    }

    #[test]
    fn components_partition_segments() {
        let input = NetworkInput::new()
            .with_polyline([(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])
            .with_polyline([(5.0, 5.0), (6.0, 6.0)])
            .with_polyline([(2.0, 0.0), (2.0, 3.0)])
            .with_root((0.0, 0.0))
            .with_root((5.0, 5.0));
        let mut graph = Graph::default();
        graph.build_graph(&input).unwrap();
        let mut seen = vec![0_usize; graph.segments().len()];
        for c in graph.components() {
            for s in c.segments() {
                seen[s.index()] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
        assert_eq!(graph.components().len(), graph.roots().len());
    }
}

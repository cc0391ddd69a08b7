// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for graph construction.

use core::fmt;

use thiserror::Error;

use crate::segment::{BuildingId, SegmentId};

/// Result type alias for topology operations.
pub type Result<T, E = TopologyError> = core::result::Result<T, E>;

/// Which kind of input point carried a bad coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointKind {
    /// A root point.
    Root,
    /// A building marker position.
    Building,
    /// An endpoint of a no-cross barrier line.
    Barrier,
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Root => "root point",
            Self::Building => "building marker",
            Self::Barrier => "barrier line",
        })
    }
}

/// Errors that abort a graph build.
///
/// None of these are recoverable inside a build: fix the input (add a root
/// point, close a gap) and build again.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TopologyError {
    /// The configured tolerance is not a finite positive number.
    #[error("tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),

    /// A polyline vertex has a NaN or infinite coordinate.
    #[error("vertex {vertex} of polyline {polyline} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Index of the polyline in the input.
        polyline: usize,
        /// Index of the vertex within the polyline.
        vertex: usize,
    },

    /// A root, building or barrier point has a NaN or infinite coordinate.
    #[error("{kind} {index} has a non-finite coordinate")]
    NonFinitePoint {
        /// What the point belongs to.
        kind: PointKind,
        /// Index of the item in its input collection.
        index: usize,
    },

    /// A building marker has no network segment to attach to.
    #[error("building {building} has no network segment to attach to")]
    InputGeometry {
        /// The building that could not be attached.
        building: BuildingId,
    },

    /// Two root points resolve to the same connected component.
    #[error("root point {root} resolves to component {component}, which already has a root")]
    AmbiguousRootAssignment {
        /// Index of the offending root point in the input.
        root: usize,
        /// Index of the component both roots resolved to.
        component: usize,
    },

    /// A root point's nearest segment belongs to no discovered component.
    #[error("root point {root} does not map to any discovered component")]
    OrphanRootPoint {
        /// Index of the root point in the input.
        root: usize,
    },

    /// Some components received no root point.
    ///
    /// The offending segments are also available from
    /// [`Graph::unrooted_segments`](crate::Graph::unrooted_segments).
    #[error(
        "{} component(s) have no root point ({} segment(s) unrooted)",
        .components.len(),
        .segments.len()
    )]
    UnrootedNetwork {
        /// Indices of the unrooted components.
        components: Vec<usize>,
        /// Every segment of the unrooted components, in id order.
        segments: Vec<SegmentId>,
    },

    /// Rooted components do not cover every segment.
    #[error("{} segment(s) are not covered by any rooted component", .segments.len())]
    LeftoverSegments {
        /// Segments outside every rooted component.
        segments: Vec<SegmentId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TopologyError::InputGeometry {
            building: BuildingId(42),
        };
        assert!(format!("{err}").contains("#42"));

        let err = TopologyError::UnrootedNetwork {
            components: vec![1, 3],
            segments: vec![SegmentId::new(4), SegmentId::new(5), SegmentId::new(6)],
        };
        assert_eq!(
            format!("{err}"),
            "2 component(s) have no root point (3 segment(s) unrooted)"
        );

        let err = TopologyError::NonFinitePoint {
            kind: PointKind::Barrier,
            index: 2,
        };
        assert_eq!(format!("{err}"), "barrier line 2 has a non-finite coordinate");
    }
}

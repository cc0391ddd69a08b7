// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input geometry for a graph build.

use kurbo::{Line, Point};

use crate::error::{PointKind, Result, TopologyError};
use crate::segment::BuildingId;

/// A building marker: a position and the caller's identifier for it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingMarker {
    /// Where the building is.
    pub position: Point,
    /// Opaque caller-side id.
    pub id: BuildingId,
}

/// Everything one build consumes.
///
/// ```rust
/// use pipenet_topology::{BuildingId, NetworkInput};
///
/// let input = NetworkInput::new()
///     .with_polyline([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)])
///     .with_root((0.0, 0.0))
///     .with_building((5.0, 3.0), BuildingId(1));
/// assert_eq!(input.polylines[0].len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkInput {
    /// Digitized centerlines, each an ordered vertex list.
    pub polylines: Vec<Vec<Point>>,
    /// One point per intended independent sub-network.
    pub roots: Vec<Point>,
    /// Buildings to attach to the network.
    pub buildings: Vec<BuildingMarker>,
    /// Lines that building connections must not cross.
    pub barriers: Vec<Line>,
}

impl NetworkInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a polyline.
    #[must_use]
    pub fn with_polyline<I, P>(mut self, vertices: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        self.polylines
            .push(vertices.into_iter().map(Into::into).collect());
        self
    }

    /// Add a root point.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<Point>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Add a building marker.
    #[must_use]
    pub fn with_building(mut self, position: impl Into<Point>, id: BuildingId) -> Self {
        self.buildings.push(BuildingMarker {
            position: position.into(),
            id,
        });
        self
    }

    /// Add a no-cross barrier line.
    #[must_use]
    pub fn with_barrier(mut self, p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        self.barriers.push(Line::new(p0, p1));
        self
    }

    /// Reject NaN and infinite coordinates anywhere in the input.
    pub fn validate(&self) -> Result<()> {
        for (polyline, vertices) in self.polylines.iter().enumerate() {
            if let Some(vertex) = vertices.iter().position(|p| !p.is_finite()) {
                return Err(TopologyError::NonFiniteVertex { polyline, vertex });
            }
        }
        let bad = |kind, index| Err(TopologyError::NonFinitePoint { kind, index });
        if let Some(i) = self.roots.iter().position(|p| !p.is_finite()) {
            return bad(PointKind::Root, i);
        }
        if let Some(i) = self.buildings.iter().position(|b| !b.position.is_finite()) {
            return bad(PointKind::Building, i);
        }
        if let Some(i) = self
            .barriers
            .iter()
            .position(|l| !(l.p0.is_finite() && l.p1.is_finite()))
        {
            return bad(PointKind::Barrier, i);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_reports_first_bad_vertex() {
        let input = NetworkInput::new()
            .with_polyline([(0.0, 0.0), (1.0, 0.0)])
            .with_polyline([(0.0, 0.0), (1.0, 1.0), (f64::NAN, 0.0)]);
        assert_eq!(
            input.validate(),
            Err(TopologyError::NonFiniteVertex {
                polyline: 1,
                vertex: 2
            })
        );
    }

    #[test]
    fn validate_checks_points() {
        let input = NetworkInput::new()
            .with_root((0.0, 0.0))
            .with_building((f64::INFINITY, 0.0), BuildingId(3));
        assert_eq!(
            input.validate(),
            Err(TopologyError::NonFinitePoint {
                kind: PointKind::Building,
                index: 0
            })
        );
        let input = NetworkInput::new().with_barrier((0.0, 0.0), (0.0, f64::NEG_INFINITY));
        assert!(matches!(
            input.validate(),
            Err(TopologyError::NonFinitePoint {
                kind: PointKind::Barrier,
                ..
            })
        ));
        assert!(NetworkInput::new().validate().is_ok());
    }
}

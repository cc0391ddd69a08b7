// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building projection and segment splitting.
//!
//! Every building is projected onto its nearest network segment first. Only
//! then are the targeted segments split, in one batch, at the projection
//! points, and the building connection segments appended.

use std::collections::BTreeMap;

use kurbo::Line;
use tracing::{debug, warn};

use crate::error::{Result, TopologyError};
use crate::graph::Graph;
use crate::input::BuildingMarker;
use crate::point::{Point2D, VertexPool};
use crate::segment::{BuildingId, SegmentFlags, SegmentId, SegmentNode};

/// Where one building joined the network.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuildingAttachment {
    /// The building.
    pub building: BuildingId,
    /// The building's own position, snapped.
    pub location: Point2D,
    /// Its projection onto the network.
    pub point: Point2D,
    /// Network segment ending at `point` after splitting.
    pub target: SegmentId,
    /// The connection segment, absent when the building sits on the network.
    pub connection: Option<SegmentId>,
}

#[derive(Copy, Clone, Debug)]
struct Projection {
    building: BuildingId,
    location: Point2D,
    target: SegmentId,
    point: Point2D,
}

// Sort rank of a cut: the original endpoints stay at the ends of the chain
// even when a clamped projection shares their parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Start,
    Interior,
    End,
}

impl Graph {
    pub(crate) fn attach_buildings(
        &mut self,
        buildings: &[BuildingMarker],
        pool: &mut VertexPool,
    ) -> Result<()> {
        let projections = self.project(buildings, pool)?;
        let pieces = self.split_targets(&projections);
        for p in &projections {
            let target = pieces
                .get(&p.target)
                .and_then(|ids| {
                    ids.iter()
                        .copied()
                        .find(|id| self.segments[id.index()].touches(p.point))
                })
                .unwrap_or(p.target);
            let connection = (p.location != p.point).then(|| {
                let id = SegmentId::new(self.segments.len());
                self.push_segment(SegmentNode::connection(id, p.location, p.point, p.building))
            });
            self.attachments.push(BuildingAttachment {
                building: p.building,
                location: p.location,
                point: p.point,
                target,
                connection,
            });
        }
        debug!(
            buildings = projections.len(),
            split = pieces.len(),
            connections = self
                .attachments
                .iter()
                .filter(|a| a.connection.is_some())
                .count(),
            "attached buildings"
        );
        Ok(())
    }

    fn project(
        &self,
        buildings: &[BuildingMarker],
        pool: &mut VertexPool,
    ) -> Result<Vec<Projection>> {
        let mut out = Vec::with_capacity(buildings.len());
        for marker in buildings {
            let Some(hit) = self.index.nearest_avoiding(marker.position, &self.barriers) else {
                warn!(building = %marker.id, "no network segment to attach to");
                return Err(TopologyError::InputGeometry {
                    building: marker.id,
                });
            };
            let foot = hit.point();
            if !self.barriers.is_empty() && self.barriers.crosses(&Line::new(marker.position, foot))
            {
                warn!(
                    building = %marker.id,
                    "every candidate crosses a barrier, attaching to the nearest segment"
                );
            }
            out.push(Projection {
                building: marker.id,
                location: pool.snap(marker.position),
                target: hit.payload,
                point: pool.snap(foot),
            });
        }
        Ok(out)
    }

    /// Split every targeted segment at its projection points.
    ///
    /// Returns, per split segment, the ids of its pieces in chain order. The
    /// first piece reuses the original id.
    fn split_targets(
        &mut self,
        projections: &[Projection],
    ) -> BTreeMap<SegmentId, Vec<SegmentId>> {
        let mut by_target: BTreeMap<SegmentId, Vec<Point2D>> = BTreeMap::new();
        for p in projections {
            by_target.entry(p.target).or_default().push(p.point);
        }

        let mut pieces = BTreeMap::new();
        for (target, points) in by_target {
            let seg = &self.segments[target.index()];
            let mut cuts = vec![
                (Rank::Start, 0.0, seg.start()),
                (Rank::End, 1.0, seg.end()),
            ];
            for p in points {
                if !cuts.iter().any(|&(_, _, q)| q == p) {
                    cuts.push((Rank::Interior, seg.parameter_at_point(p.to_point()), p));
                }
            }
            if cuts.len() == 2 {
                continue;
            }
            cuts.sort_by(|a, b| {
                a.0.cmp(&b.0)
                    .then(a.1.total_cmp(&b.1))
                    .then(a.2.cmp(&b.2))
            });

            let flags = seg.flags() | SegmentFlags::SPLIT;
            let mut ids = Vec::with_capacity(cuts.len() - 1);
            for (k, w) in cuts.windows(2).enumerate() {
                if k == 0 {
                    self.replace_segment(SegmentNode::new(target, w[0].2, w[1].2, flags));
                    ids.push(target);
                } else {
                    let id = SegmentId::new(self.segments.len());
                    ids.push(self.push_segment(SegmentNode::new(id, w[0].2, w[1].2, flags)));
                }
            }
            pieces.insert(target, ids);
        }
        pieces
    }
}

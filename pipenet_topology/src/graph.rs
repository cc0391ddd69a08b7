// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The graph build and its read-only queries.

use std::collections::HashMap;

use kurbo::{Line, Point};
use pipenet_index::{DynIndex, Index, Key};
use tracing::{debug, info, warn};

use crate::component::{self, ConnectedComponent};
use crate::config::TopologyConfig;
use crate::error::{Result, TopologyError};
use crate::input::NetworkInput;
use crate::point::{Point2D, VertexPool};
use crate::projection::BuildingAttachment;
use crate::segment::{SegmentFlags, SegmentId, SegmentNode};

/// A network graph: segments, their adjacency, rooted components and
/// building attachments.
///
/// A graph is filled by [`Graph::build_graph`]. Every build starts from
/// scratch, so one `Graph` may be rebuilt with new input. After a failed
/// build the contents are diagnostic only and [`Graph::is_built`] is false.
#[derive(Clone, Debug)]
pub struct Graph {
    pub(crate) config: TopologyConfig,
    pub(crate) segments: Vec<SegmentNode>,
    /// Index key of every segment, parallel to `segments`.
    pub(crate) keys: Vec<Key>,
    pub(crate) index: DynIndex<SegmentId>,
    pub(crate) barriers: DynIndex<usize>,
    pub(crate) components: Vec<ConnectedComponent>,
    /// Component of every segment, parallel to `segments`.
    owner: Vec<Option<usize>>,
    roots: Vec<SegmentId>,
    pub(crate) attachments: Vec<BuildingAttachment>,
    unrooted: Vec<SegmentId>,
    built: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(TopologyConfig::default())
    }
}

impl Graph {
    /// Create an empty graph.
    pub fn new(config: TopologyConfig) -> Self {
        Self {
            config,
            segments: Vec::new(),
            keys: Vec::new(),
            index: Index::with_kind(config.index),
            barriers: Index::with_kind(config.barrier_index),
            components: Vec::new(),
            owner: Vec::new(),
            roots: Vec::new(),
            attachments: Vec::new(),
            unrooted: Vec::new(),
            built: false,
        }
    }

    /// Build the graph from `input`.
    ///
    /// Phases, in order:
    /// 1. Split polylines into segments, dropping zero-length pieces.
    /// 2. Index the segments and the barrier lines.
    /// 3. Attach buildings, splitting the segments they project onto.
    /// 4. Link segments that share an endpoint.
    /// 5. Discover connected components.
    /// 6. Resolve every root point to the component of its nearest segment.
    /// 7. Require a root for every component and full segment coverage.
    ///
    /// ```rust
    /// use pipenet_topology::{Graph, NetworkInput, TopologyError};
    ///
    /// let mut graph = Graph::default();
    /// let input = NetworkInput::new()
    ///     .with_polyline([(0.0, 0.0), (10.0, 0.0)])
    ///     .with_polyline([(20.0, 0.0), (30.0, 0.0)])
    ///     .with_root((0.0, 0.0));
    /// let err = graph.build_graph(&input).unwrap_err();
    /// assert!(matches!(err, TopologyError::UnrootedNetwork { .. }));
    /// assert_eq!(graph.unrooted_segments().len(), 1);
    /// assert!(!graph.is_built());
    /// ```
    pub fn build_graph(&mut self, input: &NetworkInput) -> Result<()> {
        self.reset();
        self.config.validate()?;
        input.validate()?;
        let mut pool = VertexPool::new(self.config.tolerance);

        let dropped = self.decompose(&input.polylines, &mut pool);
        debug!(
            segments = self.segments.len(),
            dropped, "decomposed polylines"
        );

        self.index_segments();
        let barriers: Vec<(Line, usize)> = input
            .barriers
            .iter()
            .enumerate()
            .map(|(i, line)| (*line, i))
            .collect();
        self.barriers = Index::with_kind_bulk(self.config.barrier_index, &barriers);
        debug!(
            index = ?self.config.index,
            barriers = self.barriers.len(),
            "indexed segments and barriers"
        );

        if !input.buildings.is_empty() {
            self.attach_buildings(&input.buildings, &mut pool)?;
        }

        self.build_adjacency();
        let (components, owner) = component::discover(&self.segments);
        self.components = components;
        self.owner = owner;
        debug!(
            components = self.components.len(),
            "discovered connected components"
        );

        self.assign_roots(&input.roots)?;
        self.check_rooted()?;
        self.check_complete()?;

        self.built = true;
        info!(
            segments = self.segments.len(),
            components = self.components.len(),
            buildings = self.attachments.len(),
            vertices = pool.len(),
            "network graph built"
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.segments.clear();
        self.keys.clear();
        self.index = Index::with_kind(self.config.index);
        self.barriers = Index::with_kind(self.config.barrier_index);
        self.components.clear();
        self.owner.clear();
        self.roots.clear();
        self.attachments.clear();
        self.unrooted.clear();
        self.built = false;
    }

    /// Returns the number of zero-length pieces dropped.
    fn decompose(&mut self, polylines: &[Vec<Point>], pool: &mut VertexPool) -> usize {
        let mut dropped = 0;
        for vertices in polylines {
            let snapped: Vec<Point2D> = vertices.iter().map(|&p| pool.snap(p)).collect();
            for pair in snapped.windows(2) {
                if pair[0] == pair[1] {
                    dropped += 1;
                    continue;
                }
                let id = SegmentId::new(self.segments.len());
                self.segments
                    .push(SegmentNode::new(id, pair[0], pair[1], SegmentFlags::empty()));
            }
        }
        dropped
    }

    fn index_segments(&mut self) {
        let entries: Vec<(Line, SegmentId)> =
            self.segments.iter().map(|s| (s.line(), s.id())).collect();
        self.index = Index::with_kind_bulk(self.config.index, &entries);
        // Bulk loading assigns slots in input order.
        self.keys = self.index.iter().map(|(key, _, _)| key).collect();
    }

    /// Add a segment after the initial bulk load.
    pub(crate) fn push_segment(&mut self, node: SegmentNode) -> SegmentId {
        let id = node.id();
        debug_assert_eq!(id.index(), self.segments.len(), "ids are arena positions");
        self.keys.push(self.index.insert(node.line(), id));
        self.segments.push(node);
        id
    }

    /// Overwrite the segment at `node.id()`, keeping the index in step.
    pub(crate) fn replace_segment(&mut self, node: SegmentNode) {
        let i = node.id().index();
        self.index.remove(self.keys[i]);
        self.keys[i] = self.index.insert(node.line(), node.id());
        self.segments[i] = node;
    }

    fn build_adjacency(&mut self) {
        let mut touching: HashMap<Point2D, Vec<SegmentId>> = HashMap::new();
        for s in &self.segments {
            touching.entry(s.start()).or_default().push(s.id());
            touching.entry(s.end()).or_default().push(s.id());
        }
        for s in &mut self.segments {
            s.clear_neighbors();
            for p in [s.start(), s.end()] {
                if let Some(ids) = touching.get(&p) {
                    for &n in ids {
                        s.add_neighbor(n);
                    }
                }
            }
        }
    }

    fn assign_roots(&mut self, roots: &[Point]) -> Result<()> {
        for (i, &p) in roots.iter().enumerate() {
            let seg = self.index.nearest(p).map(|hit| hit.payload);
            let Some((seg, c)) = seg.and_then(|s| Some((s, self.component_of(s)?))) else {
                warn!(root = i, "root point maps to no component");
                return Err(TopologyError::OrphanRootPoint { root: i });
            };
            let component = &mut self.components[c];
            if component.is_rooted() {
                warn!(root = i, component = c, "second root for one component");
                return Err(TopologyError::AmbiguousRootAssignment {
                    root: i,
                    component: c,
                });
            }
            component.set_root(seg);
            self.roots.push(seg);
        }
        debug!(roots = self.roots.len(), "assigned roots");
        Ok(())
    }

    fn check_rooted(&mut self) -> Result<()> {
        let components: Vec<usize> = self
            .components
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_rooted())
            .map(|(i, _)| i)
            .collect();
        if components.is_empty() {
            return Ok(());
        }
        let mut segments: Vec<SegmentId> = components
            .iter()
            .flat_map(|&c| self.components[c].segments().iter().copied())
            .collect();
        segments.sort_unstable();
        warn!(
            components = components.len(),
            segments = segments.len(),
            "network has components without a root point"
        );
        self.unrooted.clone_from(&segments);
        Err(TopologyError::UnrootedNetwork {
            components,
            segments,
        })
    }

    fn check_complete(&self) -> Result<()> {
        let mut covered = vec![false; self.segments.len()];
        for c in self.components.iter().filter(|c| c.is_rooted()) {
            for s in c.segments() {
                covered[s.index()] = true;
            }
        }
        let segments: Vec<SegmentId> = covered
            .iter()
            .enumerate()
            .filter(|(_, c)| !**c)
            .map(|(i, _)| SegmentId::new(i))
            .collect();
        if segments.is_empty() {
            Ok(())
        } else {
            warn!(
                segments = segments.len(),
                "segments outside every rooted component"
            );
            Err(TopologyError::LeftoverSegments { segments })
        }
    }

    /// The configuration this graph builds with.
    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Whether the last build succeeded.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// All segments, indexed by [`SegmentId::index`].
    pub fn segments(&self) -> &[SegmentNode] {
        &self.segments
    }

    /// Look up one segment.
    pub fn segment(&self, id: SegmentId) -> Option<&SegmentNode> {
        self.segments.get(id.index())
    }

    /// Number of segments that are not building connections.
    pub fn network_segment_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| !s.is_building_connection())
            .count()
    }

    /// Connected components in discovery order.
    pub fn components(&self) -> &[ConnectedComponent] {
        &self.components
    }

    /// Root segments, in the order of the root points that chose them.
    pub fn roots(&self) -> &[SegmentId] {
        &self.roots
    }

    /// One attachment per building marker, in input order.
    pub fn attachments(&self) -> &[BuildingAttachment] {
        &self.attachments
    }

    /// Segments of unrooted components after an
    /// [`UnrootedNetwork`](TopologyError::UnrootedNetwork) failure.
    pub fn unrooted_segments(&self) -> &[SegmentId] {
        &self.unrooted
    }

    /// Index of the component containing `id`.
    pub fn component_of(&self, id: SegmentId) -> Option<usize> {
        self.owner.get(id.index()).copied().flatten()
    }

    /// Root of the component containing `id`.
    pub fn root_of(&self, id: SegmentId) -> Option<SegmentId> {
        self.components.get(self.component_of(id)?)?.root()
    }

    /// Segment nearest to `p`, ignoring barriers.
    pub fn find_nearest(&self, p: Point) -> Option<SegmentId> {
        self.index.nearest(p).map(|hit| hit.payload)
    }

    /// Segment nearest to `p` whose connection to `p` crosses no barrier.
    ///
    /// Falls back to [`Graph::find_nearest`] when every segment is blocked.
    pub fn find_nearest_avoiding_barriers(&self, p: Point) -> Option<SegmentId> {
        self.index
            .nearest_avoiding(p, &self.barriers)
            .map(|hit| hit.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::BuildingId;
    use pipenet_index::IndexKind;

    fn l_shape_and_line() -> NetworkInput {
        NetworkInput::new()
            .with_polyline([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)])
            .with_polyline([(30.0, 0.0), (40.0, 0.0)])
            .with_root((0.0, 0.0))
            .with_root((35.0, 1.0))
    }

    #[test]
    fn builds_two_rooted_components() {
        let mut g = Graph::default();
        g.build_graph(&l_shape_and_line()).unwrap();
        assert!(g.is_built());
        assert_eq!(g.segments().len(), 3);
        assert_eq!(g.components().len(), 2);
        assert_eq!(g.roots(), &[SegmentId::new(0), SegmentId::new(2)]);
        assert_eq!(g.root_of(SegmentId::new(1)), Some(SegmentId::new(0)));
        assert_eq!(g.component_of(SegmentId::new(2)), Some(1));
        assert!(g.segments()[0].has_neighbor(SegmentId::new(1)));
        assert!(g.segments()[1].has_neighbor(SegmentId::new(0)));
        assert!(g.segments()[2].neighbors().is_empty());
    }

    #[test]
    fn duplicate_vertices_are_dropped() {
        let mut g = Graph::default();
        let input = NetworkInput::new()
            .with_polyline([(0.0, 0.0), (0.0, 0.0), (5.0, 0.0), (5.0, 1e-9)])
            .with_root((1.0, 0.0));
        g.build_graph(&input).unwrap();
        assert_eq!(g.segments().len(), 1);
    }

    #[test]
    fn near_coincident_endpoints_are_joined() {
        let mut g = Graph::default();
        let input = NetworkInput::new()
            .with_polyline([(0.0, 0.0), (10.0, 0.0)])
            .with_polyline([(10.000_000_4, -0.000_000_3), (10.0, 10.0)])
            .with_root((0.0, 0.0));
        g.build_graph(&input).unwrap();
        assert_eq!(g.components().len(), 1);
    }

    #[test]
    fn second_root_on_one_component_is_ambiguous() {
        let mut g = Graph::default();
        let input = NetworkInput::new()
            .with_polyline([(0.0, 0.0), (10.0, 0.0)])
            .with_root((0.0, 0.0))
            .with_root((10.0, 0.0));
        assert_eq!(
            g.build_graph(&input),
            Err(TopologyError::AmbiguousRootAssignment {
                root: 1,
                component: 0
            })
        );
        assert!(!g.is_built());
    }

    #[test]
    fn root_without_network_is_orphaned() {
        let mut g = Graph::default();
        let input = NetworkInput::new().with_root((0.0, 0.0));
        assert_eq!(
            g.build_graph(&input),
            Err(TopologyError::OrphanRootPoint { root: 0 })
        );
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let mut g = Graph::default();
        g.build_graph(&NetworkInput::new()).unwrap();
        assert!(g.is_built());
        assert!(g.segments().is_empty());
        assert!(g.components().is_empty());
    }

    #[test]
    fn invalid_tolerance_fails_fast() {
        let mut g = Graph::new(TopologyConfig::default().with_tolerance(0.0));
        assert_eq!(
            g.build_graph(&l_shape_and_line()),
            Err(TopologyError::InvalidTolerance(0.0))
        );
    }

    #[test]
    fn rebuild_resets_state() {
        let mut g = Graph::default();
        let bad = NetworkInput::new()
            .with_polyline([(0.0, 0.0), (1.0, 0.0)])
            .with_polyline([(5.0, 0.0), (6.0, 0.0)]);
        assert!(g.build_graph(&bad).is_err());
        assert_eq!(g.unrooted_segments().len(), 2);

        g.build_graph(&l_shape_and_line()).unwrap();
        assert!(g.unrooted_segments().is_empty());
        assert_eq!(g.segments().len(), 3);
        assert!(g.is_built());
    }

    #[test]
    fn every_backend_builds_the_same_graph() {
        let input = l_shape_and_line().with_building((5.0, 4.0), BuildingId(1));
        let mut reference: Option<Vec<(Point2D, Point2D)>> = None;
        for kind in [IndexKind::Linear, IndexKind::RTree, IndexKind::KdTree] {
            let cfg = TopologyConfig::default()
                .with_index(kind)
                .with_barrier_index(kind);
            let mut g = Graph::new(cfg);
            g.build_graph(&input).unwrap();
            let shape: Vec<_> = g.segments().iter().map(|s| (s.start(), s.end())).collect();
            match &reference {
                None => reference = Some(shape),
                Some(r) => assert_eq!(r, &shape, "{kind:?} diverged"),
            }
        }
    }

    #[test]
    fn nearest_queries_respect_barriers() {
        let mut g = Graph::default();
        let input = NetworkInput::new()
            .with_polyline([(0.0, 0.0), (10.0, 0.0)])
            .with_polyline([(0.0, 6.0), (10.0, 6.0)])
            .with_root((0.0, 0.0))
            .with_root((0.0, 6.0))
            .with_barrier((-5.0, 1.0), (15.0, 1.0));
        g.build_graph(&input).unwrap();
        let q = Point::new(5.0, 2.0);
        assert_eq!(g.find_nearest(q), Some(SegmentId::new(0)));
        assert_eq!(g.find_nearest_avoiding_barriers(q), Some(SegmentId::new(1)));
    }
}

// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple, exact oracle).
//! - `rtree`: R-tree with STR bulk loading and SAH-like splits.
//! - `kdtree`: KD-tree with median partitioning of segment midpoints.
//!
//! All three rank candidates identically (distance, then slot), so they are
//! interchangeable behind [`Backend`]. [`AnyBackend`] picks one at runtime.
//!
//! SAH note
//! --------
//! The R-tree uses an SAH-like split heuristic.
//! For a split point `k` along a sorted axis we minimize:
//!
//! `cost(k) = margin(LB_k) * k + margin(RB_k) * (n - k)`
//!
//! where `LB_k` and `RB_k` are the bounding boxes of the first `k` and remaining `n - k` items
//! and `margin` is the half-perimeter. Axis-parallel segments have zero-area boxes, so area
//! alone cannot rank splits. All `k` are evaluated in O(n) per axis using prefix/suffix boxes.

pub mod flatvec;
pub mod kdtree;
pub mod rtree;

use alloc::boxed::Box;

use kurbo::{Line, Point, Rect};

use crate::backend::Backend;
use crate::types::Neighbor;

/// Which backend to use for an index chosen at runtime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexKind {
    /// Linear scan.
    Linear,
    /// R-tree.
    #[default]
    RTree,
    /// KD-tree.
    KdTree,
}

/// A backend chosen at runtime by [`IndexKind`].
#[derive(Clone, Debug)]
pub enum AnyBackend {
    /// Linear scan backend.
    Linear(flatvec::FlatVec),
    /// R-tree backend.
    RTree(rtree::RTree),
    /// KD-tree backend.
    KdTree(kdtree::KdTree),
}

impl AnyBackend {
    /// Create an empty backend of the given kind.
    pub fn new(kind: IndexKind) -> Self {
        match kind {
            IndexKind::Linear => Self::Linear(flatvec::FlatVec::default()),
            IndexKind::RTree => Self::RTree(rtree::RTree::default()),
            IndexKind::KdTree => Self::KdTree(kdtree::KdTree::default()),
        }
    }

    /// The kind of this backend.
    pub fn kind(&self) -> IndexKind {
        match self {
            Self::Linear(_) => IndexKind::Linear,
            Self::RTree(_) => IndexKind::RTree,
            Self::KdTree(_) => IndexKind::KdTree,
        }
    }

    fn inner(&self) -> &dyn Backend {
        match self {
            Self::Linear(b) => b,
            Self::RTree(b) => b,
            Self::KdTree(b) => b,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Backend {
        match self {
            Self::Linear(b) => b,
            Self::RTree(b) => b,
            Self::KdTree(b) => b,
        }
    }
}

impl Default for AnyBackend {
    fn default() -> Self {
        Self::new(IndexKind::default())
    }
}

impl Backend for AnyBackend {
    fn insert(&mut self, slot: usize, line: Line) {
        self.inner_mut().insert(slot, line);
    }

    fn remove(&mut self, slot: usize) {
        self.inner_mut().remove(slot);
    }

    fn clear(&mut self) {
        self.inner_mut().clear();
    }

    fn bulk_load(&mut self, items: &[(usize, Line)]) {
        self.inner_mut().bulk_load(items);
    }

    fn nearest_where(
        &self,
        pt: Point,
        accept: &mut dyn FnMut(usize) -> bool,
    ) -> Option<Neighbor> {
        self.inner().nearest_where(pt, accept)
    }

    fn query_rect<'a>(&'a self, rect: Rect) -> Box<dyn Iterator<Item = usize> + 'a> {
        self.inner().query_rect(rect)
    }
}

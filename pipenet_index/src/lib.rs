// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipenet Index: a nearest-segment index for planar networks.
//!
//! Pipenet Index answers "which segment is closest to this point?" over a set of
//! 2D line segments (road or pipe centerlines, barrier lines).
//!
//! - Insert and remove segments with user payloads; bulk load in one pass.
//! - Query the nearest segment, optionally filtered by a predicate.
//! - Query the nearest segment whose connection to the query point does not cross
//!   any segment of a second "barrier" index, falling back to the plain nearest
//!   segment when everything is blocked.
//! - Query by intersecting rectangle.
//!
//! Geometry is expressed with [`kurbo`] points, lines and rectangles.
//!
//! Backends are pluggable via a simple trait so you can swap the spatial strategy without API churn.
//! The default backend is a flat vector (linear scan).
//! R-tree and KD-tree backends answer the same queries with the same tie-break
//! (smaller distance, then lower slot), so results are identical across backends.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Line, Point};
//! use pipenet_index::Index;
//!
//! // Index two parallel streets.
//! let idx = Index::<u32>::with_rtree_bulk(&[
//!     (Line::new((0.0, 0.0), (100.0, 0.0)), 1),
//!     (Line::new((0.0, 50.0), (100.0, 50.0)), 2),
//! ]);
//!
//! let hit = idx.nearest(Point::new(30.0, 10.0)).unwrap();
//! assert_eq!(hit.payload, 1);
//! assert_eq!(hit.point(), Point::new(30.0, 0.0));
//! ```
//!
//! A barrier index steers the query away from segments it would have to cross:
//!
//! ```rust
//! use kurbo::{Line, Point};
//! use pipenet_index::Index;
//!
//! let streets = Index::<u32>::with_kdtree_bulk(&[
//!     (Line::new((0.0, 0.0), (100.0, 0.0)), 1),
//!     (Line::new((0.0, 50.0), (100.0, 50.0)), 2),
//! ]);
//! let rails = Index::<()>::with_rtree_bulk(&[(Line::new((0.0, 5.0), (100.0, 5.0)), ())]);
//!
//! let hit = streets.nearest_avoiding(Point::new(30.0, 10.0), &rails).unwrap();
//! assert_eq!(hit.payload, 2);
//! ```
//!
//! ## Choosing a backend
//!
//! - `FlatVec` (default): simplest and smallest, linear scans. Good for very small sets
//!   and as an exact oracle in tests.
//! - `RTree`: bounding-box tree with STR bulk loading and SAH-like splits; good
//!   general-purpose index with cheap incremental inserts.
//! - `KdTree`: median partition over segment midpoints; fast to bulk build, inserts
//!   attach at leaves without rebalancing.
//! - `AnyBackend`: one of the above picked at runtime by [`IndexKind`].
//!
//! ### Float semantics
//!
//! This crate assumes finite coordinates. Distances are compared with
//! [`f64::total_cmp`], so results stay deterministic.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::kdtree::KdTree;
pub use backends::rtree::RTree;
pub use backends::{AnyBackend, IndexKind};
pub use index::{DynIndex, Hit, Index, IndexGeneric, Key};
pub use types::{Axis, Neighbor};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use kurbo::{Line, Point, Rect};

    #[test]
    fn insert_and_query_nearest() {
        let mut idx: Index<u32> = Index::new();
        let _k1 = idx.insert(Line::new((0.0, 0.0), (10.0, 0.0)), 1);
        let _k2 = idx.insert(Line::new((0.0, 10.0), (10.0, 10.0)), 2);
        let hit = idx.nearest(Point::new(5.0, 7.0)).unwrap();
        assert_eq!(hit.payload, 2);
        assert_eq!(hit.distance_sq, 9.0);
    }

    #[test]
    fn removed_entries_are_not_returned() {
        let mut idx = Index::<u32>::with_rtree();
        let k = idx.insert(Line::new((0.0, 0.0), (10.0, 0.0)), 1);
        let _ = idx.insert(Line::new((0.0, 10.0), (10.0, 10.0)), 2);
        idx.remove(k);
        assert_eq!(idx.nearest(Point::new(5.0, 1.0)).map(|h| h.payload), Some(2));
        let hits: Vec<_> = idx.query_rect(Rect::new(0.0, -1.0, 10.0, 1.0)).collect();
        assert!(hits.is_empty());
    }

    #[test]
    fn empty_index_has_no_nearest() {
        let idx = Index::<u32>::with_kdtree();
        assert!(idx.nearest(Point::ZERO).is_none());
        assert!(idx.is_empty());
    }
}

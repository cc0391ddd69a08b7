// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for nearest-segment indexing implementations.

use alloc::boxed::Box;

use kurbo::{Line, Point, Rect};

use crate::types::Neighbor;

/// Spatial backend abstraction used by `IndexGeneric`.
///
/// Backends only know slots and segment geometry; payloads and generations live
/// in the index wrapper.
pub trait Backend {
    /// Insert a segment into the spatial structure under `slot`.
    fn insert(&mut self, slot: usize, line: Line);

    /// Remove a slot from the spatial structure.
    fn remove(&mut self, slot: usize);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Load many segments at once.
    ///
    /// Backends with a packed layout override this when they are empty.
    fn bulk_load(&mut self, items: &[(usize, Line)]) {
        for &(slot, line) in items {
            self.insert(slot, line);
        }
    }

    /// Nearest segment to `pt` among slots for which `accept` returns true.
    ///
    /// Ties are broken by lower slot (see [`Neighbor::cmp_rank`]). `accept` is
    /// only consulted for candidates that would improve the current best.
    fn nearest_where(
        &self,
        pt: Point,
        accept: &mut dyn FnMut(usize) -> bool,
    ) -> Option<Neighbor>;

    /// Nearest segment to `pt`.
    fn nearest(&self, pt: Point) -> Option<Neighbor> {
        self.nearest_where(pt, &mut |_| true)
    }

    /// Query slots whose segment bounds intersect the rectangle.
    fn query_rect<'a>(&'a self, rect: Rect) -> Box<dyn Iterator<Item = usize> + 'a>;
}

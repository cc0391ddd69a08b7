// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Line, Point};

use crate::backend::Backend;
use crate::backends::{AnyBackend, IndexKind};
use crate::types::{bounds, segments_intersect};

/// Generational handle for entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Entry<P> {
    line: Line,
    payload: P,
}

// The generation outlives the entry so a reused slot never revives a stale key.
#[derive(Clone, Debug)]
struct Slot<P> {
    generation: u32,
    entry: Option<Entry<P>>,
}

/// Result of a nearest-segment query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit<P> {
    /// Handle of the matched entry.
    pub key: Key,
    /// Payload stored with the entry.
    pub payload: P,
    /// Geometry of the matched entry.
    pub line: Line,
    /// Squared distance from the query point to the segment.
    pub distance_sq: f64,
    /// Clamped projection parameter along `line` (0 at `p0`, 1 at `p1`).
    pub t: f64,
}

impl<P> Hit<P> {
    /// Closest point of the matched segment to the query point.
    pub fn point(&self) -> Point {
        self.line.p0.lerp(self.line.p1, self.t)
    }
}

/// A segment index parameterized by a spatial backend.
#[derive(Clone, Debug)]
pub struct IndexGeneric<P: Copy + Debug, B: Backend> {
    entries: Vec<Slot<P>>,
    free_list: Vec<usize>,
    backend: B,
}

impl<P, B> IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }

    /// Build an index from `(segment, payload)` pairs in one pass.
    ///
    /// Entries receive keys in input order; packed backends bulk load.
    pub fn from_entries(entries: &[(Line, P)]) -> Self {
        Self::from_entries_in(entries, B::default())
    }
}

impl<P, B> IndexGeneric<P, B>
where
    P: Copy + Debug,
    B: Backend,
{
    /// Create an empty index over an explicit backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            backend,
        }
    }

    /// Build an index from `(segment, payload)` pairs over an explicit (empty) backend.
    pub fn from_entries_in(entries: &[(Line, P)], backend: B) -> Self {
        let mut idx = Self::with_backend(backend);
        idx.entries.reserve(entries.len());
        let mut pairs: Vec<(usize, Line)> = Vec::with_capacity(entries.len());
        for (i, (line, payload)) in entries.iter().copied().enumerate() {
            idx.entries.push(Slot {
                generation: 1,
                entry: Some(Entry { line, payload }),
            });
            pairs.push((i, line));
        }
        idx.backend.bulk_load(&pairs);
        idx
    }

    /// Reserve space for at least `n` entries.
    pub fn reserve(&mut self, n: usize) {
        self.entries.reserve(n);
    }

    /// Insert a segment with payload. Returns a stable handle `Key`.
    ///
    /// The segment is queryable immediately.
    pub fn insert(&mut self, line: Line, payload: P) -> Key {
        let entry = Some(Entry { line, payload });
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.entries[idx];
            slot.generation += 1;
            slot.entry = entry;
            (idx, slot.generation)
        } else {
            self.entries.push(Slot {
                generation: 1,
                entry,
            });
            (self.entries.len() - 1, 1)
        };
        self.backend.insert(idx, line);
        Key::new(idx, generation)
    }

    /// Remove an entry, returning its payload. Stale keys are ignored.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        let slot = self.entries.get_mut(key.idx())?;
        if slot.generation != key.1 {
            return None;
        }
        let entry = slot.entry.take()?;
        self.backend.remove(key.idx());
        self.free_list.push(key.idx());
        Some(entry.payload)
    }

    /// Clear the index.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.free_list.clear();
        self.backend.clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_list.len()
    }

    /// Whether the index holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a live entry.
    pub fn get(&self, key: Key) -> Option<(Line, P)> {
        let (generation, e) = self.live(key.idx())?;
        (generation == key.1).then_some((e.line, e.payload))
    }

    /// Iterate live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, Line, P)> + '_ {
        (0..self.entries.len()).filter_map(|i| {
            let (generation, e) = self.live(i)?;
            Some((Key::new(i, generation), e.line, e.payload))
        })
    }

    /// Query for entries whose segment bounds intersect the rectangle.
    pub fn query_rect(&self, rect: kurbo::Rect) -> impl Iterator<Item = (Key, P)> + '_ {
        let slots = self.backend.query_rect(rect);
        let mut out = Vec::new();
        for i in slots {
            if let Some((generation, e)) = self.live(i) {
                out.push((Key::new(i, generation), e.payload));
            }
        }
        out.into_iter()
    }

    /// Whether any indexed segment intersects `line` (touching counts).
    pub fn crosses(&self, line: &Line) -> bool {
        self.backend.query_rect(bounds(line)).any(|i| {
            self.live(i)
                .is_some_and(|(_, e)| segments_intersect(&e.line, line))
        })
    }

    /// Nearest segment to `pt`.
    pub fn nearest(&self, pt: Point) -> Option<Hit<P>> {
        self.nearest_where(pt, |_, _, _| true)
    }

    /// Nearest segment to `pt` among entries accepted by `pred`.
    ///
    /// `pred` is only called for candidates that would improve the current best.
    pub fn nearest_where<F>(&self, pt: Point, mut pred: F) -> Option<Hit<P>>
    where
        F: FnMut(Key, &P, &Line) -> bool,
    {
        let entries = &self.entries;
        let mut accept = |slot: usize| match entries.get(slot) {
            Some(Slot {
                generation,
                entry: Some(e),
            }) => pred(Key::new(slot, *generation), &e.payload, &e.line),
            _ => false,
        };
        let n = self.backend.nearest_where(pt, &mut accept)?;
        let (generation, e) = self.live(n.slot)?;
        Some(Hit {
            key: Key::new(n.slot, generation),
            payload: e.payload,
            line: e.line,
            distance_sq: n.distance_sq,
            t: n.t,
        })
    }

    /// Nearest segment to `pt` whose straight connection from `pt` does not
    /// cross any segment of `barriers`.
    ///
    /// Falls back to the plain nearest segment when every candidate is
    /// blocked, so the query only returns `None` for an empty index.
    pub fn nearest_avoiding<Q, C>(&self, pt: Point, barriers: &IndexGeneric<Q, C>) -> Option<Hit<P>>
    where
        Q: Copy + Debug,
        C: Backend,
    {
        if barriers.is_empty() {
            return self.nearest(pt);
        }
        self.nearest_where(pt, |_, _, line| {
            let n = kurbo::ParamCurveNearest::nearest(line, pt, 0.0);
            let foot = line.p0.lerp(line.p1, n.t);
            !barriers.crosses(&Line::new(pt, foot))
        })
        .or_else(|| self.nearest(pt))
    }

    /// Access the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn live(&self, slot: usize) -> Option<(u32, &Entry<P>)> {
        let s = self.entries.get(slot)?;
        Some((s.generation, s.entry.as_ref()?))
    }
}

/// Default index using a flat vector backend.
pub type Index<P> = IndexGeneric<P, crate::backends::flatvec::FlatVec>;

/// Index whose backend is chosen at runtime.
pub type DynIndex<P> = IndexGeneric<P, AnyBackend>;

impl<P: Copy + Debug> Default for Index<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy + Debug> Index<P> {
    /// Create an R-tree-backed index.
    pub fn with_rtree() -> IndexGeneric<P, crate::backends::rtree::RTree> {
        IndexGeneric::new()
    }

    /// Build an R-tree-backed index in bulk from entries.
    pub fn with_rtree_bulk(entries: &[(Line, P)]) -> IndexGeneric<P, crate::backends::rtree::RTree> {
        IndexGeneric::from_entries(entries)
    }

    /// Create a KD-tree-backed index.
    pub fn with_kdtree() -> IndexGeneric<P, crate::backends::kdtree::KdTree> {
        IndexGeneric::new()
    }

    /// Build a KD-tree-backed index in bulk from entries.
    pub fn with_kdtree_bulk(
        entries: &[(Line, P)],
    ) -> IndexGeneric<P, crate::backends::kdtree::KdTree> {
        IndexGeneric::from_entries(entries)
    }

    /// Create an index whose backend is picked by `kind`.
    pub fn with_kind(kind: IndexKind) -> DynIndex<P> {
        IndexGeneric::with_backend(AnyBackend::new(kind))
    }

    /// Build an index of the given kind in bulk from entries.
    pub fn with_kind_bulk(kind: IndexKind, entries: &[(Line, P)]) -> DynIndex<P> {
        IndexGeneric::from_entries_in(entries, AnyBackend::new(kind))
    }
}

impl<P: Copy + Debug> DynIndex<P> {
    /// The backend kind in use.
    pub fn kind(&self) -> IndexKind {
        self.backend.kind()
    }
}

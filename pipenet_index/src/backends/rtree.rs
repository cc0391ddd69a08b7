// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend over segment bounds with SAH-like splits and best-first nearest search.

use alloc::boxed::Box;
use alloc::collections::BinaryHeap;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::{Ordering, Reverse};
use core::fmt::Debug;

use kurbo::{Line, Point, Rect};

use crate::backend::Backend;
use crate::types::{Neighbor, bounds, margin, overlaps, rect_distance_sq};

/// R-tree backend using STR bulk loading, SAH-like overflow splits and
/// branch-and-bound nearest queries.
#[derive(Clone)]
pub struct RTree {
    max_children: usize,
    min_children: usize,
    root: Option<NodeIdx>,
    arena: Vec<RNode>,
    slots: Vec<Option<Line>>,
}

#[derive(Clone, Debug)]
struct RNode {
    bbox: Rect,
    leaf: bool,
    children: Vec<RChild>,
}

#[derive(Copy, Clone, Debug)]
enum RChild {
    Node(NodeIdx),
    Item { slot: usize, line: Line, bbox: Rect },
}

impl RChild {
    fn item(slot: usize, line: Line) -> Self {
        Self::Item {
            slot,
            line,
            bbox: bounds(&line),
        }
    }

    fn bbox(&self, arena: &[RNode]) -> Rect {
        match self {
            Self::Node(i) => arena[i.get()].bbox,
            Self::Item { bbox, .. } => *bbox,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

impl Default for RTree {
    fn default() -> Self {
        Self {
            max_children: 8,
            min_children: 3,
            root: None,
            arena: Vec::new(),
            slots: Vec::new(),
        }
    }
}

/// Entry of the best-first queue: a subtree keyed by its bounds distance, or a
/// measured segment keyed by its exact distance.
#[derive(Copy, Clone, Debug)]
struct Pending {
    distance_sq: f64,
    kind: PendingKind,
}

#[derive(Copy, Clone, Debug)]
enum PendingKind {
    Node(NodeIdx),
    Item { slot: usize, t: f64 },
}

impl Pending {
    // Nodes pop before items at equal distance so that a subtree which might
    // hold an equally near segment with a lower slot is opened first.
    fn rank(&self) -> (u8, usize) {
        match self.kind {
            PendingKind::Node(i) => (0, i.get()),
            PendingKind::Item { slot, .. } => (1, slot),
        }
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_sq
            .total_cmp(&other.distance_sq)
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

type RChildren = Vec<RChild>;

impl RTree {
    /// Create an empty tree with the given node fan-out.
    ///
    /// `max_children` is clamped to at least 4 and `min_children` to
    /// `1..=max_children / 2`.
    pub fn with_fanout(max_children: usize, min_children: usize) -> Self {
        let max_children = max_children.max(4);
        Self {
            max_children,
            min_children: min_children.clamp(1, max_children / 2),
            ..Self::default()
        }
    }

    /// Build an `RTree` from a set of (slot, segment) pairs using a packed layout.
    pub fn bulk_build_default(pairs: &[(usize, Line)]) -> Self {
        let mut tree = Self::default();
        tree.pack(pairs);
        tree
    }

    /// Number of live segments.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the tree holds no segments.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn ensure_slot(&mut self, slot: usize, line: Line) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(line);
    }

    fn pack(&mut self, pairs: &[(usize, Line)]) {
        self.root = None;
        self.arena.clear();
        self.slots.clear();
        for &(slot, line) in pairs {
            self.ensure_slot(slot, line);
        }
        let items: Vec<RChild> = pairs
            .iter()
            .map(|&(slot, line)| RChild::item(slot, line))
            .collect();
        self.root = Self::bulk_build_nodes(&mut self.arena, &items, self.max_children);
    }

    /// STR-like bulk builder: tiles children by x then y centroid and packs
    /// them bottom-up into `arena`.
    fn bulk_build_nodes(
        arena: &mut Vec<RNode>,
        items: &[RChild],
        max_children: usize,
    ) -> Option<NodeIdx> {
        if items.is_empty() {
            return None;
        }

        let mut level: Vec<RChild> = items.to_vec();
        let mut leaf = true;
        loop {
            let n = level.len();
            let num_groups = n.div_ceil(max_children);
            let mut gx = 1_usize;
            while gx * gx < num_groups {
                gx += 1;
            }
            level.sort_by(|a, b| {
                a.bbox(arena)
                    .center()
                    .x
                    .total_cmp(&b.bbox(arena).center().x)
            });
            let slice_size = n.div_ceil(gx);
            let mut next: Vec<RChild> = Vec::with_capacity(num_groups);
            for slice in level.chunks_mut(slice_size) {
                slice.sort_by(|a, b| {
                    a.bbox(arena)
                        .center()
                        .y
                        .total_cmp(&b.bbox(arena).center().y)
                });
                for chunk in slice.chunks(max_children) {
                    let children = chunk.to_vec();
                    let bbox = Self::node_bbox(arena, &children);
                    let idx = arena.len();
                    arena.push(RNode {
                        bbox,
                        leaf,
                        children,
                    });
                    next.push(RChild::Node(NodeIdx::new(idx)));
                }
            }
            if next.len() == 1 {
                return match next[0] {
                    RChild::Node(idx) => Some(idx),
                    RChild::Item { .. } => None,
                };
            }
            level = next;
            leaf = false;
        }
    }

    fn node_bbox(arena: &[RNode], children: &[RChild]) -> Rect {
        let mut it = children.iter();
        let first = match it.next() {
            Some(c) => c.bbox(arena),
            None => Rect::ZERO,
        };
        it.fold(first, |acc, c| acc.union(c.bbox(arena)))
    }

    fn enlarge_cost(a: &Rect, b: &Rect) -> f64 {
        margin(&a.union(*b)) - margin(a)
    }

    fn choose_child(arena: &[RNode], children: &[RChild], bbox: &Rect) -> usize {
        let mut best_idx = 0_usize;
        let mut best_cost: Option<(f64, f64)> = None;
        for (i, c) in children.iter().enumerate() {
            let cb = c.bbox(arena);
            // Least enlargement, then smallest box.
            let cost = (Self::enlarge_cost(&cb, bbox), margin(&cb));
            if best_cost.is_none_or(|bc| cost < bc) {
                best_cost = Some(cost);
                best_idx = i;
            }
        }
        best_idx
    }

    /// SAH-like split: sort along an axis, precompute prefix/suffix bounds, and
    /// choose `k` that minimizes `margin(LB_k) * k + margin(RB_k) * (n - k)`.
    fn split_children(
        arena: &[RNode],
        children: &[RChild],
        min_children: usize,
    ) -> (RChildren, RChildren) {
        let n = children.len();
        let mut best: Option<(f64, RChildren, RChildren)> = None;
        for axis in 0..2 {
            let mut v = children.to_vec();
            let key = |c: &RChild| {
                let center = c.bbox(arena).center();
                if axis == 0 { center.x } else { center.y }
            };
            v.sort_by(|a, b| key(a).total_cmp(&key(b)));

            // Prefix and suffix bounds make each split cost O(1).
            let mut prefix: Vec<Rect> = Vec::with_capacity(n);
            for c in &v {
                let bb = c.bbox(arena);
                let next = prefix.last().map_or(bb, |prev| prev.union(bb));
                prefix.push(next);
            }
            let mut suffix: Vec<Rect> = Vec::with_capacity(n);
            for c in v.iter().rev() {
                let bb = c.bbox(arena);
                let next = suffix.last().map_or(bb, |prev| bb.union(*prev));
                suffix.push(next);
            }
            suffix.reverse();

            for k in min_children..=(n - min_children) {
                let lb = prefix[k - 1];
                let rb = suffix[k];
                let c = margin(&lb) * k as f64 + margin(&rb) * (n - k) as f64;
                if best.as_ref().is_none_or(|(bc, _, _)| c < *bc) {
                    best = Some((c, v[..k].to_vec(), v[k..].to_vec()));
                }
            }
        }
        match best {
            Some((_, l, r)) => (l, r),
            // Only reachable with fewer than 2 * min_children entries.
            None => {
                let mid = n / 2;
                (children[..mid].to_vec(), children[mid..].to_vec())
            }
        }
    }

    /// Insert below `node_idx`; returns the index of a new right sibling when
    /// the node overflowed and was split.
    fn insert_node(
        arena: &mut Vec<RNode>,
        node_idx: usize,
        item: RChild,
        max_children: usize,
        min_children: usize,
    ) -> Option<usize> {
        let bbox = item.bbox(arena);
        if arena[node_idx].leaf {
            {
                let node = &mut arena[node_idx];
                node.bbox = if node.children.is_empty() {
                    bbox
                } else {
                    node.bbox.union(bbox)
                };
                node.children.push(item);
                if node.children.len() <= max_children {
                    return None;
                }
            }
            let items = core::mem::take(&mut arena[node_idx].children);
            let (left, right) = Self::split_children(arena, &items, min_children);
            let l_bbox = Self::node_bbox(arena, &left);
            let r_bbox = Self::node_bbox(arena, &right);
            {
                let node = &mut arena[node_idx];
                node.children = left;
                node.bbox = l_bbox;
            }
            let r_idx = arena.len();
            arena.push(RNode {
                bbox: r_bbox,
                leaf: true,
                children: right,
            });
            Some(r_idx)
        } else {
            let idx = {
                let children = &arena[node_idx].children;
                Self::choose_child(arena, children, &bbox)
            };
            let split = match arena[node_idx].children[idx] {
                RChild::Node(child_idx) => {
                    Self::insert_node(arena, child_idx.get(), item, max_children, min_children)
                }
                RChild::Item { .. } => None,
            };
            arena[node_idx].bbox = arena[node_idx].bbox.union(bbox);
            if let Some(new_right_idx) = split {
                arena[node_idx]
                    .children
                    .insert(idx + 1, RChild::Node(NodeIdx::new(new_right_idx)));
                if arena[node_idx].children.len() > max_children {
                    let ch = core::mem::take(&mut arena[node_idx].children);
                    let (left, right) = Self::split_children(arena, &ch, min_children);
                    let l_bbox = Self::node_bbox(arena, &left);
                    let r_bbox = Self::node_bbox(arena, &right);
                    arena[node_idx].children = left;
                    arena[node_idx].bbox = l_bbox;
                    let r_idx = arena.len();
                    arena.push(RNode {
                        bbox: r_bbox,
                        leaf: false,
                        children: right,
                    });
                    return Some(r_idx);
                }
            }
            None
        }
    }

    fn search_remove(arena: &mut Vec<RNode>, node_idx: usize, slot: usize, old: &Rect) -> bool {
        if !overlaps(&arena[node_idx].bbox, old) {
            return false;
        }
        if arena[node_idx].leaf {
            let before = arena[node_idx].children.len();
            arena[node_idx].children.retain(|c| match c {
                RChild::Item { slot: s, .. } => *s != slot,
                RChild::Node(_) => true,
            });
            if arena[node_idx].children.len() != before {
                let bb = Self::node_bbox(arena, &arena[node_idx].children);
                arena[node_idx].bbox = bb;
                return true;
            }
            false
        } else {
            let child_indices: Vec<NodeIdx> = arena[node_idx]
                .children
                .iter()
                .filter_map(|c| match c {
                    RChild::Node(i) => Some(*i),
                    RChild::Item { .. } => None,
                })
                .collect();
            let mut removed = false;
            for ci in child_indices {
                if Self::search_remove(arena, ci.get(), slot, old) {
                    removed = true;
                    break;
                }
            }
            if removed {
                let old_children = core::mem::take(&mut arena[node_idx].children);
                let kept: Vec<RChild> = old_children
                    .into_iter()
                    .filter(|c| match c {
                        RChild::Node(i) => !arena[i.get()].children.is_empty(),
                        RChild::Item { .. } => true,
                    })
                    .collect();
                arena[node_idx].children = kept;
                if !arena[node_idx].children.is_empty() {
                    let bb = Self::node_bbox(arena, &arena[node_idx].children);
                    arena[node_idx].bbox = bb;
                }
            }
            removed
        }
    }
}

impl Backend for RTree {
    fn insert(&mut self, slot: usize, line: Line) {
        if self.slots.get(slot).is_some_and(Option::is_some) {
            self.remove(slot);
        }
        self.ensure_slot(slot, line);
        let item = RChild::item(slot, line);
        match self.root {
            None => {
                let idx = self.arena.len();
                self.arena.push(RNode {
                    bbox: item.bbox(&self.arena),
                    leaf: true,
                    children: vec![item],
                });
                self.root = Some(NodeIdx::new(idx));
            }
            Some(root_idx) => {
                let split = Self::insert_node(
                    &mut self.arena,
                    root_idx.get(),
                    item,
                    self.max_children,
                    self.min_children,
                );
                if let Some(right_idx) = split {
                    // Grow a new root over the old root and its new sibling.
                    let left_bb = self.arena[root_idx.get()].bbox;
                    let right_bb = self.arena[right_idx].bbox;
                    let children = vec![
                        RChild::Node(root_idx),
                        RChild::Node(NodeIdx::new(right_idx)),
                    ];
                    let idx = self.arena.len();
                    self.arena.push(RNode {
                        bbox: left_bb.union(right_bb),
                        leaf: false,
                        children,
                    });
                    self.root = Some(NodeIdx::new(idx));
                }
            }
        }
    }

    fn remove(&mut self, slot: usize) {
        let Some(old) = self.slots.get_mut(slot).and_then(Option::take) else {
            return;
        };
        if let Some(root_idx) = self.root {
            let _ = Self::search_remove(&mut self.arena, root_idx.get(), slot, &bounds(&old));
            if self.arena[root_idx.get()].children.is_empty() {
                self.root = None;
                self.arena.clear();
            }
        }
    }

    fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
        self.slots.clear();
    }

    fn bulk_load(&mut self, items: &[(usize, Line)]) {
        if self.root.is_none() {
            self.pack(items);
        } else {
            for &(slot, line) in items {
                self.insert(slot, line);
            }
        }
    }

    fn nearest_where(
        &self,
        pt: Point,
        accept: &mut dyn FnMut(usize) -> bool,
    ) -> Option<Neighbor> {
        let root_idx = self.root?;
        let mut queue = BinaryHeap::new();
        queue.push(Reverse(Pending {
            distance_sq: rect_distance_sq(&self.arena[root_idx.get()].bbox, pt),
            kind: PendingKind::Node(root_idx),
        }));
        while let Some(Reverse(next)) = queue.pop() {
            match next.kind {
                PendingKind::Node(i) => {
                    for c in &self.arena[i.get()].children {
                        let pending = match c {
                            RChild::Node(ci) => Pending {
                                distance_sq: rect_distance_sq(&self.arena[ci.get()].bbox, pt),
                                kind: PendingKind::Node(*ci),
                            },
                            RChild::Item { slot, line, .. } => {
                                let n = Neighbor::measure(*slot, line, pt);
                                Pending {
                                    distance_sq: n.distance_sq,
                                    kind: PendingKind::Item { slot: n.slot, t: n.t },
                                }
                            }
                        };
                        queue.push(Reverse(pending));
                    }
                }
                PendingKind::Item { slot, t } => {
                    if accept(slot) {
                        return Some(Neighbor {
                            slot,
                            distance_sq: next.distance_sq,
                            t,
                        });
                    }
                }
            }
        }
        None
    }

    fn query_rect<'a>(&'a self, rect: Rect) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut out = Vec::new();
        let Some(root_idx) = self.root else {
            return Box::new(out.into_iter());
        };
        let mut stack = vec![root_idx];
        while let Some(i) = stack.pop() {
            let n = &self.arena[i.get()];
            if !overlaps(&n.bbox, &rect) {
                continue;
            }
            for c in &n.children {
                match c {
                    RChild::Item { slot, bbox, .. } => {
                        if overlaps(bbox, &rect) {
                            out.push(*slot);
                        }
                    }
                    RChild::Node(ci) => stack.push(*ci),
                }
            }
        }
        Box::new(out.into_iter())
    }
}

impl Debug for RTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|e| e.is_some()).count();
        let has_root = self.root.is_some();
        f.debug_struct("RTree")
            .field("max_children", &self.max_children)
            .field("min_children", &self.min_children)
            .field("arena_nodes", &self.arena.len())
            .field("total_slots", &total)
            .field("alive", &alive)
            .field("has_root", &has_root)
            .finish_non_exhaustive()
    }
}

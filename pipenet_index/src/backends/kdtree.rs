// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! KD-tree backend partitioning segments by midpoint on alternating axes.
//!
//! Every node stores one segment (the median of its partition at build time)
//! plus the bounds of its whole subtree. Segments straddle splitting planes, so
//! the far side of a split is pruned by that subtree envelope rather than by the
//! plane distance alone; the envelope distance is never smaller than the
//! distance to the nearest segment it contains, which keeps the search exact.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Line, Point, Rect};

use crate::backend::Backend;
use crate::types::{Axis, Neighbor, bounds, midpoint, overlaps, rect_distance_sq};

/// KD-tree backend over segment midpoints.
///
/// Bulk loads are median-balanced. Incremental inserts descend to a leaf and
/// attach there; removal leaves a tombstone that still routes queries.
#[derive(Clone, Default)]
pub struct KdTree {
    root: Option<usize>,
    nodes: Vec<KdNode>,
    // slot -> node holding it
    slots: Vec<Option<usize>>,
}

#[derive(Clone, Debug)]
struct KdNode {
    slot: usize,
    line: Line,
    split: f64,
    axis: Axis,
    alive: bool,
    subtree: Rect,
    left: Option<usize>,
    right: Option<usize>,
}

impl KdTree {
    /// Build a balanced tree from (slot, segment) pairs.
    pub fn bulk_build_default(pairs: &[(usize, Line)]) -> Self {
        let mut tree = Self::default();
        tree.pack(pairs);
        tree
    }

    /// Number of live segments.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the tree holds no live segments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth of the deepest node (0 for an empty tree).
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1_usize)];
        while let Some((i, d)) = stack.pop() {
            deepest = deepest.max(d);
            let n = &self.nodes[i];
            stack.extend(n.left.map(|c| (c, d + 1)));
            stack.extend(n.right.map(|c| (c, d + 1)));
        }
        deepest
    }

    fn pack(&mut self, pairs: &[(usize, Line)]) {
        self.clear();
        for &(slot, _) in pairs {
            self.reserve_slot(slot);
        }
        let mut items = pairs.to_vec();
        self.root = self.build_recursive(&mut items, 0);
    }

    fn reserve_slot(&mut self, slot: usize) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
    }

    fn new_node(&mut self, slot: usize, line: Line, axis: Axis) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(KdNode {
            slot,
            line,
            split: axis.coord(midpoint(&line)),
            axis,
            alive: true,
            subtree: bounds(&line),
            left: None,
            right: None,
        });
        self.reserve_slot(slot);
        self.slots[slot] = Some(idx);
        idx
    }

    fn build_recursive(&mut self, items: &mut [(usize, Line)], depth: usize) -> Option<usize> {
        if items.is_empty() {
            return None;
        }
        let axis = Axis::for_depth(depth);
        let m = items.len() / 2;
        items.select_nth_unstable_by(m, |a, b| {
            axis.coord(midpoint(&a.1))
                .total_cmp(&axis.coord(midpoint(&b.1)))
        });
        let (slot, line) = items[m];
        let idx = self.new_node(slot, line, axis);

        let (lower, rest) = items.split_at_mut(m);
        let upper = &mut rest[1..];
        let left = self.build_recursive(lower, depth + 1);
        let right = self.build_recursive(upper, depth + 1);

        let mut subtree = self.nodes[idx].subtree;
        for child in [left, right].into_iter().flatten() {
            subtree = subtree.union(self.nodes[child].subtree);
        }
        let node = &mut self.nodes[idx];
        node.left = left;
        node.right = right;
        node.subtree = subtree;
        Some(idx)
    }

    fn search(
        &self,
        idx: usize,
        pt: Point,
        accept: &mut dyn FnMut(usize) -> bool,
        best: &mut Option<Neighbor>,
    ) {
        let node = &self.nodes[idx];
        if best.is_some_and(|b| rect_distance_sq(&node.subtree, pt) > b.distance_sq) {
            return;
        }
        if node.alive {
            let cand = Neighbor::measure(node.slot, &node.line, pt);
            if best.is_none_or(|b| cand.beats(&b)) && accept(node.slot) {
                *best = Some(cand);
            }
        }
        // Visit the side holding the query point first so the far side is
        // usually pruned by the tightened bound.
        let (near, far) = if node.axis.coord(pt) < node.split {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        if let Some(n) = near {
            self.search(n, pt, accept, best);
        }
        if let Some(f) = far {
            self.search(f, pt, accept, best);
        }
    }
}

impl Backend for KdTree {
    fn insert(&mut self, slot: usize, line: Line) {
        if self.slots.get(slot).is_some_and(Option::is_some) {
            self.remove(slot);
        }
        let Some(mut cur) = self.root else {
            self.root = Some(self.new_node(slot, line, Axis::X));
            return;
        };
        let mid = midpoint(&line);
        let bb = bounds(&line);
        loop {
            let node = &mut self.nodes[cur];
            node.subtree = node.subtree.union(bb);
            let go_left = node.axis.coord(mid) < node.split;
            let next = if go_left { node.left } else { node.right };
            match next {
                Some(child) => cur = child,
                None => {
                    let axis = node.axis.flip();
                    let child = self.new_node(slot, line, axis);
                    let node = &mut self.nodes[cur];
                    if go_left {
                        node.left = Some(child);
                    } else {
                        node.right = Some(child);
                    }
                    return;
                }
            }
        }
    }

    fn remove(&mut self, slot: usize) {
        if let Some(idx) = self.slots.get_mut(slot).and_then(Option::take) {
            self.nodes[idx].alive = false;
        }
    }

    fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
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
        let root = self.root?;
        let mut best = None;
        self.search(root, pt, accept, &mut best);
        best
    }

    fn query_rect<'a>(&'a self, rect: Rect) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return Box::new(out.into_iter());
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let n = &self.nodes[i];
            if !overlaps(&n.subtree, &rect) {
                continue;
            }
            if n.alive && overlaps(&bounds(&n.line), &rect) {
                out.push(n.slot);
            }
            stack.extend(n.left);
            stack.extend(n.right);
        }
        Box::new(out.into_iter())
    }
}

impl Debug for KdTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.nodes.iter().filter(|n| n.alive).count();
        f.debug_struct("KdTree")
            .field("nodes", &self.nodes.len())
            .field("alive", &alive)
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

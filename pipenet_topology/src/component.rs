// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connected components and their discovery.

use crate::segment::{SegmentId, SegmentNode};

/// A maximal set of segments reachable from one another through shared
/// endpoints, plus its root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectedComponent {
    segments: Vec<SegmentId>,
    root: Option<SegmentId>,
}

impl ConnectedComponent {
    /// Member segments in ascending id order.
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    /// The root segment, once assigned.
    pub fn root(&self) -> Option<SegmentId> {
        self.root
    }

    /// Whether a root has been assigned.
    pub fn is_rooted(&self) -> bool {
        self.root.is_some()
    }

    /// Number of member segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the component has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `id` belongs to this component.
    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.binary_search(&id).is_ok()
    }

    pub(crate) fn set_root(&mut self, root: SegmentId) {
        self.root = Some(root);
    }
}

/// Partition `segments` into connected components.
///
/// Components are numbered in order of their lowest segment id. Returns the
/// components and, per segment, the index of its component.
pub(crate) fn discover(segments: &[SegmentNode]) -> (Vec<ConnectedComponent>, Vec<Option<usize>>) {
    let mut owner: Vec<Option<usize>> = vec![None; segments.len()];
    let mut components = Vec::new();
    let mut stack = Vec::new();
    for seed in 0..segments.len() {
        if owner[seed].is_some() {
            continue;
        }
        let which = components.len();
        let mut members = Vec::new();
        owner[seed] = Some(which);
        stack.push(seed);
        while let Some(i) = stack.pop() {
            members.push(SegmentId::new(i));
            for n in segments[i].neighbors() {
                let slot = &mut owner[n.index()];
                if slot.is_none() {
                    *slot = Some(which);
                    stack.push(n.index());
                }
            }
        }
        members.sort_unstable();
        components.push(ConnectedComponent {
            segments: members,
            root: None,
        });
    }
    (components, owner)
}

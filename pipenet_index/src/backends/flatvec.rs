// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; also the brute-force oracle.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Line, Point, Rect};

use crate::backend::Backend;
use crate::types::{Neighbor, bounds, overlaps};

/// Flat vector backend with linear scans.
#[derive(Clone, Default)]
pub struct FlatVec {
    entries: Vec<Option<Line>>,
}

impl Debug for FlatVec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &total)
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl Backend for FlatVec {
    fn insert(&mut self, slot: usize, line: Line) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(line);
    }

    fn remove(&mut self, slot: usize) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = None;
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn nearest_where(
        &self,
        pt: Point,
        accept: &mut dyn FnMut(usize) -> bool,
    ) -> Option<Neighbor> {
        let mut best: Option<Neighbor> = None;
        for (i, slot) in self.entries.iter().enumerate() {
            let Some(line) = slot.as_ref() else {
                continue;
            };
            let cand = Neighbor::measure(i, line, pt);
            if best.is_none_or(|b| cand.beats(&b)) && accept(i) {
                best = Some(cand);
            }
        }
        best
    }

    fn query_rect<'a>(&'a self, rect: Rect) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut out = Vec::new();
        for (i, slot) in self.entries.iter().enumerate() {
            if let Some(line) = slot.as_ref()
                && overlaps(&bounds(line), &rect)
            {
                out.push(i);
            }
        }
        Box::new(out.into_iter())
    }
}

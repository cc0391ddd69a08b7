// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Pipenet Index: bulk load, nearest queries, barriers and removal.

use kurbo::{Line, Point};
use pipenet_index::{Index, IndexKind};

fn main() {
    let streets = [
        (Line::new((0.0, 0.0), (100.0, 0.0)), "Main St"),
        (Line::new((100.0, 0.0), (100.0, 80.0)), "Oak Ave"),
        (Line::new((0.0, 40.0), (60.0, 40.0)), "Elm St"),
    ];
    let mut idx = Index::with_kind_bulk(IndexKind::KdTree, &streets);

    let house = Point::new(30.0, 15.0);
    if let Some(hit) = idx.nearest(house) {
        println!(
            "nearest to {house:?}: {} at {:?} (distance {:.2})",
            hit.payload,
            hit.point(),
            hit.distance_sq.sqrt()
        );
    }

    // A rail line between the house and Main St.
    let rails = Index::<()>::with_rtree_bulk(&[(Line::new((-10.0, 10.0), (90.0, 10.0)), ())]);
    if let Some(hit) = idx.nearest_avoiding(house, &rails) {
        println!("nearest without crossing the rails: {}", hit.payload);
    }

    // Remove Elm St and ask again.
    let elm = idx.iter().find(|(_, _, name)| *name == "Elm St").map(|(k, _, _)| k);
    if let Some(key) = elm {
        idx.remove(key);
    }
    if let Some(hit) = idx.nearest_avoiding(house, &rails) {
        println!("after removing Elm St: {}", hit.payload);
    }
}

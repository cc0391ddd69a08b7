// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Network basics.
//!
//! Build a two-street network with a few buildings, one of them behind a
//! barrier, then print components, attachments and dead ends.
//!
//! Run:
//! - `cargo run -p pipenet_demos --example network_basics`

use kurbo::Point;
use pipenet_topology::{BuildingId, Graph, IndexKind, NetworkInput, TopologyConfig};

fn main() {
    let input = NetworkInput::new()
        // Main street with a side street branching north.
        .with_polyline([(0.0, 0.0), (60.0, 0.0), (120.0, 0.0)])
        .with_polyline([(60.0, 0.0), (60.0, 50.0)])
        // A separate lane across the river.
        .with_polyline([(0.0, 110.0), (120.0, 110.0)])
        .with_root((0.0, 0.0))
        .with_root((120.0, 110.0))
        .with_building((25.0, 8.0), BuildingId(101))
        .with_building((70.0, 30.0), BuildingId(102))
        // Closer to the side street, but the river is in the way.
        .with_building((62.0, 72.0), BuildingId(103))
        .with_barrier((-10.0, 70.0), (130.0, 70.0));

    let config = TopologyConfig::default().with_index(IndexKind::KdTree);
    let mut graph = Graph::new(config);
    graph.build_graph(&input).expect("demo network is fully rooted");

    for (i, component) in graph.components().iter().enumerate() {
        println!(
            "component {}: {} segments, root {:?}",
            i + 1,
            component.len(),
            component.root()
        );
    }

    for a in graph.attachments() {
        println!(
            "building {} -> ({:.1}, {:.1}) on {:?}, connection {:?}",
            a.building,
            a.point.x(),
            a.point.y(),
            a.target,
            a.connection
        );
    }
    let across = graph.attachments()[2];
    assert!(across.point.y() > 100.0, "building 103 attaches across the river");

    let dead_ends: Vec<Point> = graph
        .leaf_node_points()
        .into_iter()
        .map(Into::into)
        .collect();
    println!("dead ends: {dead_ends:?}");

    let q = Point::new(90.0, 60.0);
    println!(
        "nearest to {q:?}: {:?}, without crossing barriers: {:?}",
        graph.find_nearest(q),
        graph.find_nearest_avoiding_barriers(q)
    );
}

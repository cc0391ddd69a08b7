// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Segment numbering.
//!
//! Label every segment `"<component>.<order>"` by walking each component
//! depth-first from its root, the way a reviewer would annotate a plan.
//!
//! Run:
//! - `cargo run -p pipenet_demos --example segment_numbering`

use pipenet_topology::{Graph, NetworkInput};

fn main() {
    let input = NetworkInput::new()
        .with_polyline([(0.0, 0.0), (30.0, 0.0), (60.0, 0.0)])
        .with_polyline([(30.0, 0.0), (30.0, 25.0)])
        .with_polyline([(100.0, 0.0), (100.0, 40.0)])
        .with_root((0.0, 0.0))
        .with_root((100.0, 0.0));

    let mut graph = Graph::default();
    graph.build_graph(&input).expect("both networks have a root");

    for label in graph.segments_numbering() {
        println!(
            "{:>5} at ({:.1}, {:.1})",
            label.label, label.position.x, label.position.y
        );
    }

    let first = graph.segments_numbering().next().map(|l| l.label);
    assert_eq!(first.as_deref(), Some("1.1"));
}

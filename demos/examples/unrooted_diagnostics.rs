// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unrooted network diagnostics.
//!
//! A gap in the digitized line work splits one street in two. The build
//! refuses the graph and reports which segments lost their root, then a
//! second build with the gap closed succeeds.
//!
//! Run:
//! - `cargo run -p pipenet_demos --example unrooted_diagnostics`

use pipenet_topology::{Graph, NetworkInput, TopologyError};

fn main() {
    let root = (0.0, 0.0);
    let broken = NetworkInput::new()
        .with_polyline([(0.0, 0.0), (40.0, 0.0)])
        // Starts 0.5 units short of the first street's end.
        .with_polyline([(40.5, 0.0), (80.0, 0.0), (80.0, 30.0)])
        .with_root(root);

    let mut graph = Graph::default();
    match graph.build_graph(&broken) {
        Err(TopologyError::UnrootedNetwork {
            components,
            segments,
        }) => {
            println!("unrooted components: {components:?}");
            for id in &segments {
                let s = &graph.segments()[id.index()];
                println!("  highlight {:?}: {:?} -> {:?}", id, s.start(), s.end());
            }
        }
        other => panic!("expected an unrooted network, got {other:?}"),
    }
    assert!(!graph.is_built());

    let fixed = NetworkInput::new()
        .with_polyline([(0.0, 0.0), (40.0, 0.0)])
        .with_polyline([(40.0, 0.0), (80.0, 0.0), (80.0, 30.0)])
        .with_root(root);
    graph.build_graph(&fixed).expect("gap is closed");
    println!(
        "rebuilt: {} component(s), {} segment(s)",
        graph.components().len(),
        graph.segments().len()
    );
}

// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use pipenet_topology::{BuildingId, Graph, IndexKind, NetworkInput, TopologyConfig};

/// One connected street grid with a building in the middle of every block.
fn gen_town(n: usize, block: f64) -> NetworkInput {
    let side = n as f64 * block;
    let mut input = NetworkInput::new().with_root((0.0, 0.0));
    for i in 0..=n {
        let a = i as f64 * block;
        let row: Vec<(f64, f64)> = (0..=n).map(|j| (j as f64 * block, a)).collect();
        let col: Vec<(f64, f64)> = (0..=n).map(|j| (a, j as f64 * block)).collect();
        input = input.with_polyline(row).with_polyline(col);
    }
    let mut id = 0;
    for i in 0..n {
        for j in 0..n {
            let x = (i as f64 + 0.3) * block;
            let y = (j as f64 + 0.45) * block;
            input = input.with_building((x, y), BuildingId(id));
            id += 1;
        }
    }
    input.with_barrier((side * 0.5 + 1.0, -1.0), (side * 0.5 + 1.0, side + 1.0))
}

fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");
    for &n in &[16usize, 32] {
        let input = gen_town(n, 40.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        for (kind, name) in [
            (IndexKind::Linear, "linear"),
            (IndexKind::RTree, "rtree"),
            (IndexKind::KdTree, "kdtree"),
        ] {
            let config = TopologyConfig::default()
                .with_index(kind)
                .with_barrier_index(kind);
            group.bench_function(format!("{name}_town_n{n}"), |b| {
                b.iter(|| {
                    let mut graph = Graph::new(config);
                    let ok = graph.build_graph(&input).is_ok();
                    black_box((ok, graph.segments().len()));
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_build_graph);
criterion_main!(benches);

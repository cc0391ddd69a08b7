// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Line, Point};
use pipenet_index::Index;

use rstar::RTree;
use rstar::primitives::Line as RLine;

fn gen_street_grid(n: usize, block: f64) -> Vec<Line> {
    let mut out = Vec::with_capacity(2 * n * n);
    for i in 0..=n {
        for j in 0..n {
            let a = i as f64 * block;
            let b0 = j as f64 * block;
            out.push(Line::new((b0, a), (b0 + block, a)));
            out.push(Line::new((a, b0), (a, b0 + block)));
        }
    }
    out
}

fn to_rstar_lines(v: &[Line]) -> Vec<RLine<[f64; 2]>> {
    v.iter()
        .map(|l| RLine::new([l.p0.x, l.p0.y], [l.p1.x, l.p1.y]))
        .collect()
}

fn gen_queries(n: usize, extent: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let f = i as f64;
            Point::new((f * 37.31) % extent, (f * 91.73) % extent)
        })
        .collect()
}

fn bench_rtree_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_external_compare");
    for &n in &[32usize, 64] {
        let lines = gen_street_grid(n, 50.0);
        let queries = gen_queries(256, n as f64 * 50.0);
        group.throughput(Throughput::Elements(queries.len() as u64));

        group.bench_function(format!("pipenet_build_nearest_bulk_n{n}"), |b| {
            b.iter_batched(
                || lines.iter().copied().zip(0_u32..).collect::<Vec<_>>(),
                |entries| {
                    let idx = Index::<u32>::with_rtree_bulk(&entries);
                    let mut acc = 0_u32;
                    for &q in &queries {
                        acc ^= idx.nearest(q).map_or(0, |h| h.payload);
                    }
                    black_box(acc);
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("rstar_build_nearest_bulk_n{n}"), |b| {
            b.iter_batched(
                || to_rstar_lines(&lines),
                |rlines| {
                    let tree = RTree::bulk_load(rlines);
                    let mut acc = 0.0_f64;
                    for q in &queries {
                        if let Some(hit) = tree.nearest_neighbor(&[q.x, q.y]) {
                            acc += hit.from[0];
                        }
                    }
                    black_box(acc);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rtree_external_compare);
criterion_main!(benches);

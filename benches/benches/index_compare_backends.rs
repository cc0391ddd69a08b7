// Copyright 2025 the Pipenet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Line, Point};
use pipenet_index::{Index, IndexKind};

const KINDS: [(IndexKind, &str); 3] = [
    (IndexKind::Linear, "linear"),
    (IndexKind::RTree, "rtree"),
    (IndexKind::KdTree, "kdtree"),
];

/// Street grid: `n` horizontal and `n` vertical streets split at every crossing.
fn gen_street_grid(n: usize, block: f64) -> Vec<Line> {
    let mut out = Vec::with_capacity(2 * n * n);
    for i in 0..=n {
        for j in 0..n {
            let a = i as f64 * block;
            let b0 = j as f64 * block;
            let b1 = b0 + block;
            out.push(Line::new((b0, a), (b1, a)));
            out.push(Line::new((a, b0), (a, b1)));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_segments(count: usize, extent: f64, max_len: f64) -> Vec<Line> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x = rng.next_f64() * extent;
        let y = rng.next_f64() * extent;
        let dx = (rng.next_f64() - 0.5) * max_len;
        let dy = (rng.next_f64() - 0.5) * max_len;
        out.push(Line::new((x, y), (x + dx, y + dy)));
    }
    out
}

fn gen_queries(count: usize, extent: f64) -> Vec<Point> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    (0..count)
        .map(|_| Point::new(rng.next_f64() * extent, rng.next_f64() * extent))
        .collect()
}

fn entries(lines: &[Line]) -> Vec<(Line, u32)> {
    lines.iter().copied().zip(0_u32..).collect()
}

fn bench_bulk_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_build");
    for &n in &[32usize, 64] {
        let items = entries(&gen_street_grid(n, 50.0));
        group.throughput(Throughput::Elements(items.len() as u64));
        for (kind, name) in KINDS {
            group.bench_function(format!("{name}_grid_n{n}"), |b| {
                b.iter(|| {
                    let idx = Index::with_kind_bulk(kind, &items);
                    black_box(idx.len());
                });
            });
        }
    }
    group.finish();
}

fn bench_incremental_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental_insert");
    let items = entries(&gen_random_segments(4096, 2000.0, 40.0));
    group.throughput(Throughput::Elements(items.len() as u64));
    for (kind, name) in KINDS {
        group.bench_function(format!("{name}_random"), |b| {
            b.iter_batched(
                || Index::<u32>::with_kind(kind),
                |mut idx| {
                    for &(line, id) in &items {
                        let _ = idx.insert(line, id);
                    }
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");
    let queries = gen_queries(256, 2000.0);
    group.throughput(Throughput::Elements(queries.len() as u64));
    let datasets = [
        ("grid", entries(&gen_street_grid(40, 50.0))),
        ("random", entries(&gen_random_segments(4096, 2000.0, 40.0))),
    ];
    for (label, items) in &datasets {
        for (kind, name) in KINDS {
            let idx = Index::with_kind_bulk(kind, items);
            group.bench_function(format!("{name}_{label}"), |b| {
                b.iter(|| {
                    let mut acc = 0_u32;
                    for &q in &queries {
                        acc ^= idx.nearest(q).map_or(0, |h| h.payload);
                    }
                    black_box(acc);
                });
            });
        }
    }
    group.finish();
}

fn bench_nearest_avoiding(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_avoiding");
    let queries = gen_queries(256, 2000.0);
    group.throughput(Throughput::Elements(queries.len() as u64));
    let streets = entries(&gen_street_grid(40, 50.0));
    // Rail lines cutting across the grid diagonally.
    let rails: Vec<(Line, ())> = (0..8)
        .map(|i| {
            let o = f64::from(i) * 250.0;
            (Line::new((o, 0.0), (o + 400.0, 2000.0)), ())
        })
        .collect();
    for (kind, name) in KINDS {
        let idx = Index::with_kind_bulk(kind, &streets);
        let barriers = Index::with_kind_bulk(kind, &rails);
        group.bench_function(format!("{name}_grid_rails"), |b| {
            b.iter(|| {
                let mut acc = 0_u32;
                for &q in &queries {
                    acc ^= idx.nearest_avoiding(q, &barriers).map_or(0, |h| h.payload);
                }
                black_box(acc);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_bulk_build,
    bench_incremental_insert,
    bench_nearest,
    bench_nearest_avoiding,
);
criterion_main!(benches);

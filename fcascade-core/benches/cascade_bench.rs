//! Query benchmarks: one cascade vs k independent binary searches.
//!
//! # Benchmark Goals
//!
//! 1. Show the O(log n + k) cascade beating O(k log n) repeated search
//! 2. Measure how the promotion stride trades list size for walk length
//! 3. Compare exact `locate` with insertion-point `successors`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fcascade_core::search::lower_bound;
use fcascade_core::{Attribute, CascadeIndex, CascadeOptions, Element};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

const SENTINEL: i64 = 1_000_003;

/// `k` sorted lists of `n` random keys, each containing `SENTINEL`
fn build_lists(k: usize, n: usize, seed: u64) -> Vec<Vec<Element>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..k)
        .map(|_| {
            let mut keys: Vec<i64> = (0..n - 1).map(|_| rng.random_range(0..2_000_000)).collect();
            keys.push(SENTINEL);
            keys.sort_unstable();
            keys.into_iter().map(|key| Element::new(key, 0)).collect()
        })
        .collect()
}

/// Benchmark: cascade vs repeated binary search as k grows
fn bench_cascade_vs_repeated_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade_vs_repeated");
    let n = 10_000;

    for k in [4, 16, 64] {
        let lists = build_lists(k, n, 7);
        let index = CascadeIndex::new(lists.clone()).expect("Failed to build index");
        let queries: Vec<i64> = (0..256).map(|i| i * 7_919).collect();

        group.throughput(Throughput::Elements(k as u64));

        group.bench_with_input(BenchmarkId::new("cascade", k), &k, |bench, _| {
            bench.iter(|| {
                for &q in &queries {
                    black_box(index.successors(black_box(q)));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("repeated", k), &k, |bench, _| {
            bench.iter(|| {
                for &q in &queries {
                    let positions: Vec<usize> = lists
                        .iter()
                        .map(|list| lower_bound(list, black_box(q), Attribute::Key))
                        .collect();
                    black_box(positions);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark: effect of the promotion stride on query time
fn bench_unit_fraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit_fraction");
    let lists = build_lists(32, 4_096, 11);

    for d in [2, 3, 4, 8] {
        let index = CascadeIndex::build(lists.clone(), CascadeOptions { unit_frac_den: d })
            .expect("Failed to build index");

        group.bench_with_input(BenchmarkId::new("successors", d), &d, |bench, _| {
            bench.iter(|| black_box(index.successors(black_box(123_457))));
        });
    }

    group.finish();
}

/// Benchmark: exact lookup of a key present in every list
fn bench_locate_sentinel(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate_sentinel");
    let index = CascadeIndex::new(build_lists(32, 4_096, 13)).expect("Failed to build index");

    group.bench_function("locate", |bench| {
        bench.iter(|| black_box(index.locate(black_box(SENTINEL)).expect("sentinel present")));
    });

    group.bench_function("successors", |bench| {
        bench.iter(|| black_box(index.successors(black_box(SENTINEL))));
    });

    group.finish();
}

criterion_group!(benches, bench_cascade_vs_repeated_search, bench_unit_fraction, bench_locate_sentinel);
criterion_main!(benches);

//! Benchmarks for chain queries.
//!
//! Run with: cargo bench --bench chain_benchmarks
//!
//! To compare against baseline:
//! 1. First run: cargo bench -- --save-baseline main
//! 2. After changes: cargo bench -- --baseline main

#![allow(missing_docs, clippy::unwrap_used, clippy::cast_precision_loss)]

use catrom::{ArcStrategy, Chain, ControlPoint, Point3, Precompute};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

// =============================================================================
// Test Curve Generation
// =============================================================================

/// A rising spiral through `count` control points.
fn spiral(count: usize) -> Chain {
    let points: Vec<ControlPoint> = (0..count)
        .map(|i| {
            let angle = i as f64 * 0.6;
            let radius = 1.0 + 0.1 * i as f64;
            Point3::new(radius * angle.cos(), radius * angle.sin(), 0.2 * i as f64).into()
        })
        .collect();
    Chain::new(&points).unwrap()
}

// =============================================================================
// Benchmarks: Sampling
// =============================================================================

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sampling");
    let chain = spiral(64);

    for samples in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(samples as u64));

        group.bench_with_input(BenchmarkId::new("bulk", samples), &samples, |b, &samples| {
            b.iter(|| black_box(chain.sample_positions(samples, false)));
        });

        group.bench_with_input(
            BenchmarkId::new("per_sample", samples),
            &samples,
            |b, &samples| {
                b.iter(|| {
                    let last = (samples - 1) as f64;
                    let positions: Vec<_> = (0..samples)
                        .map(|k| chain.solve_position(k as f64 / last, false))
                        .collect();
                    black_box(positions)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Benchmarks: Reparametrization
// =============================================================================

fn bench_reparametrization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reparametrization");
    let queries: Vec<f64> = (0..=256).map(|i| f64::from(i) / 256.0).collect();
    group.throughput(Throughput::Elements(queries.len() as u64));

    let accurate = spiral(16);
    group.bench_function("accurate", |b| {
        b.iter(|| {
            for &t in &queries {
                black_box(accurate.solve_position(t, true));
            }
        });
    });

    for (name, strategy) in [
        ("polynomial", ArcStrategy::Polynomial),
        ("lookup_table", ArcStrategy::LookupTable),
    ] {
        let mut chain = spiral(16);
        chain
            .precompute_unit_speed_data(Precompute::Now, strategy, 8)
            .unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                for &t in &queries {
                    black_box(chain.solve_position(t, true));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Benchmarks: Frames
// =============================================================================

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("Frames");

    group.bench_function("construct_and_rmf", |b| {
        b.iter(|| {
            let chain = spiral(32);
            black_box(chain.solve_rmf(1.0, None, false))
        });
    });

    let chain = spiral(32);
    let _ = chain.solve_rmf(1.0, None, false);
    group.bench_function("rmf_lookup", |b| {
        b.iter(|| black_box(chain.solve_rmf(black_box(0.618), None, false)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sampling,
    bench_reparametrization,
    bench_frames
);
criterion_main!(benches);

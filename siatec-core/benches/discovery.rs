//! Benchmarks comparing the vector-table and hashed discovery pipelines.
//!
//! Run with: cargo bench -p siatec-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siatec_core::{cosiatec, sia, siah, siatec, siatech, DiscoveryStrategy, Point, PointSet};

/// Random onset/pitch points on an integer grid, seeded for repeatability.
fn random_dataset(size: usize) -> PointSet {
    let mut rng = StdRng::seed_from_u64(size as u64);
    let points = (0..size)
        .map(|_| {
            Point::from([
                rng.gen_range(0..size as i64 * 2) as f64,
                rng.gen_range(40..80) as f64,
            ])
        })
        .collect();
    PointSet::new(points).expect("points share one dimensionality")
}

fn bench_mtps(c: &mut Criterion) {
    let mut group = c.benchmark_group("mtps");

    for size in [50, 200, 800] {
        let points = random_dataset(size);
        group.bench_with_input(BenchmarkId::new("sia", size), &points, |b, points| {
            b.iter(|| black_box(sia(black_box(points)).len()));
        });
        group.bench_with_input(BenchmarkId::new("siah", size), &points, |b, points| {
            b.iter(|| black_box(siah(black_box(points)).len()));
        });
    }

    group.finish();
}

fn bench_tecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("tecs");
    group.sample_size(10);

    for size in [50, 200] {
        let points = random_dataset(size);
        group.bench_with_input(BenchmarkId::new("siatec", size), &points, |b, points| {
            b.iter(|| black_box(siatec(black_box(points)).len()));
        });
        group.bench_with_input(BenchmarkId::new("siatech", size), &points, |b, points| {
            b.iter(|| black_box(siatech(black_box(points)).len()));
        });
    }

    group.finish();
}

fn bench_cosiatec(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosiatec");
    group.sample_size(10);

    let points = random_dataset(60);
    for strategy in [DiscoveryStrategy::VectorTable, DiscoveryStrategy::Hashed] {
        group.bench_with_input(
            BenchmarkId::new(format!("{:?}", strategy), points.len()),
            &points,
            |b, points| b.iter(|| black_box(cosiatec(black_box(points), strategy).len())),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_mtps, bench_tecs, bench_cosiatec);
criterion_main!(benches);

//! Benchmarks for rake coverage optimization.
//!
//! Datasets mirror the size of a typical CFD sweep (19 speeds x 15 pressure
//! ratios) and a denser sweep for scaling.
//!
//! Run with: `cargo bench -p turbine_calc`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use turbine_calc::{CoverageOptimizer, OperatingPoint, Regime, TestConfig, classify, plan};

/// Generate a speed/pressure-ratio sweep with a noisy swirl trend
fn generate_sweep(n_rpm: usize, n_pr: usize, seed: u64) -> Vec<OperatingPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(n_rpm * n_pr);
    for i in 0..n_rpm {
        let rpm = 50.0 + 5.0 * i as f64;
        for j in 0..n_pr {
            let pr = 1.2 + 1.3 * j as f64 / (n_pr.max(2) - 1) as f64;
            let swirl = -60.0 + (rpm - 50.0) * 1.2 + (pr - 1.2) * 25.0 + rng.gen_range(-8.0..8.0);
            points.push(OperatingPoint::new(rpm, pr, swirl.clamp(-89.0, 89.0)));
        }
    }
    points
}

/// Benchmark the full pipeline on the standard sweep
fn bench_plan(c: &mut Criterion) {
    let config = TestConfig::default();
    let points = generate_sweep(19, 15, 42);

    let mut group = c.benchmark_group("Plan");
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("standard_sweep", |bencher| {
        bencher.iter(|| plan(&points, &config));
    });
    group.finish();
}

/// Benchmark a single-regime optimization at increasing point counts
fn bench_optimizer_scaling(c: &mut Criterion) {
    let config = TestConfig::default();
    let optimizer = match CoverageOptimizer::new(&config) {
        Ok(optimizer) => optimizer,
        Err(err) => panic!("default config rejected: {err}"),
    };

    let mut group = c.benchmark_group("CoverageOptimizer");
    for n_pr in [5, 15, 45] {
        let points = generate_sweep(19, n_pr, 7);
        let indices: Vec<usize> = (0..points.len()).collect();
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(points.len()), &points, |bencher, points| {
            bencher.iter(|| optimizer.optimize(points, &indices, Regime::VacuumOff));
        });
    }
    group.finish();
}

/// Benchmark regime classification alone
fn bench_classify(c: &mut Criterion) {
    let config = TestConfig::default();
    let points = generate_sweep(19, 45, 3);

    c.bench_function("classify_855", |bencher| {
        bencher.iter(|| classify(&points, &config));
    });
}

criterion_group!(benches, bench_plan, bench_optimizer_scaling, bench_classify);

criterion_main!(benches);

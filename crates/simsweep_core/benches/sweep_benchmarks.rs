//! Criterion benchmarks for simsweep_core aggregation
//!
//! Run with: cargo bench -p simsweep_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::Rng;

use simsweep_core::analysis::TrialAccumulator;
use simsweep_core::config::SweepSpec;
use simsweep_core::simulator::SimulationResult;
use simsweep_core::stats;

fn random_samples(n: usize) -> Vec<f64> {
    let mut rng = rand::rng();
    (0..n).map(|_| rng.random_range(0.5..5.0)).collect()
}

fn random_results(n: usize) -> Vec<SimulationResult> {
    let mut rng = rand::rng();
    (0..n)
        .map(|_| SimulationResult {
            throughput: rng.random_range(50.0..150.0),
            goodput: rng.random_range(40.0..140.0),
            cpu_util: rng.random_range(0.0..1.0),
            resp_time: rng.random_range(0.5..5.0),
            timedout_frac: rng.random_range(0.0..0.2),
            dropped_frac: rng.random_range(0.0..0.2),
            drop_rate: rng.random_range(0.0..2.0),
        })
        .collect()
}

fn bench_confidence_interval(c: &mut Criterion) {
    let mut group = c.benchmark_group("confidence_interval");
    for n in [8, 64, 1024] {
        let samples = random_samples(n);
        group.bench_with_input(BenchmarkId::new("samples", n), &samples, |b, samples| {
            b.iter(|| stats::confidence_interval(black_box(samples), 0.05).unwrap());
        });
    }
    group.finish();
}

fn bench_point_aggregation(c: &mut Criterion) {
    let trials = random_results(64);
    c.bench_function("aggregate_point_64_trials", |b| {
        b.iter(|| {
            let mut acc = TrialAccumulator::new();
            for trial in &trials {
                acc.record(black_box(trial));
            }
            acc.finish(1.0, 0.05).unwrap()
        });
    });
}

fn bench_sweep_enumeration(c: &mut Criterion) {
    let spec = SweepSpec {
        variable: "n_users".to_string(),
        label: "Number of Users".to_string(),
        start: 0.0,
        end: 10_000.0,
        step: 0.5,
        runs_per_point: 3,
    };
    c.bench_function("enumerate_20k_values", |b| {
        b.iter(|| black_box(&spec).values());
    });
}

criterion_group!(
    benches,
    bench_confidence_interval,
    bench_point_aggregation,
    bench_sweep_enumeration
);
criterion_main!(benches);

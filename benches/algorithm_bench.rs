//! Benchmarks for the VRPTW hyper-heuristics.

#[cfg(feature = "bench")]
extern crate criterion;

#[cfg(feature = "bench")]
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;
use vrptw_hyper::config::{Config, Variant};
use vrptw_hyper::local_search::LocalSearch;
use vrptw_hyper::problem::{DistancePrecision, Node, Problem};
use vrptw_hyper::savings::savings_method;
use vrptw_hyper::utils::seeded;

/// Grid instance with staggered time windows.
fn create_benchmark_problem(size: usize) -> Problem {
    let mut nodes = Vec::new();

    // Depot
    nodes.push(Node::new(0, 0.0, 0.0, 0.0, 0.0, 1000.0, 0.0));

    let grid_size = (size as f64).sqrt().ceil() as usize;
    for i in 1..=size {
        let row = (i - 1) / grid_size;
        let col = (i - 1) % grid_size;
        let x = col as f64 * 10.0;
        let y = row as f64 * 10.0;
        let ready = ((i * 37) % 400) as f64;
        nodes.push(Node::new(i, x, y, 1.0, ready, ready + 300.0, 5.0));
    }

    Problem::new(
        format!("BenchProblem_{}", size),
        nodes,
        0,
        size,
        10.0,
        DistancePrecision::OneDecimal,
    )
}

#[cfg(feature = "bench")]
fn benchmark_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("savings");

    for size in [50, 100, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);

            b.iter(|| {
                let mut rng = seeded(0);
                savings_method(&problem, &mut rng)
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_local_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_search");

    for size in [50, 100, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let problem = create_benchmark_problem(size);
            let mut rng = seeded(0);
            let solution = savings_method(&problem, &mut rng);
            let search = LocalSearch::new(&problem);

            b.iter(|| {
                let mut solution_clone = solution.clone();
                search.educate(&mut solution_clone, &mut rng);
            });
        });
    }

    group.finish();
}

#[cfg(feature = "bench")]
fn benchmark_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("variants");
    group.measurement_time(Duration::from_secs(30));

    let problem = create_benchmark_problem(50);
    for variant in [Variant::ExpoHyper, Variant::KheiriHyper, Variant::Alns] {
        group.bench_with_input(
            BenchmarkId::from_parameter(variant),
            &variant,
            |b, &variant| {
                let config = Config::new()
                    .with_variant(variant)
                    .without_time_limit()
                    .with_iteration_limit(50);

                b.iter(|| vrptw_hyper::solve(&problem, config.clone()));
            },
        );
    }

    group.finish();
}

#[cfg(feature = "bench")]
criterion_group!(
    benches,
    benchmark_construction,
    benchmark_local_search,
    benchmark_variants
);

#[cfg(feature = "bench")]
criterion_main!(benches);

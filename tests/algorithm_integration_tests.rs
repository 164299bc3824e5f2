//! Integration tests for the full hyper-heuristic runs.

use std::time::Duration;
use vrptw_hyper::alns::AdaptiveSearch;
use vrptw_hyper::catalog::Catalog;
use vrptw_hyper::config::{Config, Variant};
use vrptw_hyper::error::ConfigError;
use vrptw_hyper::hyper::{budget_progress, MultiArmedHyper};
use vrptw_hyper::problem::{DistancePrecision, Node, Problem};
use vrptw_hyper::report::RunReport;
use vrptw_hyper::solve;

/// Creates a moderate size test problem with a depot and customers.
fn create_moderate_problem() -> Problem {
    let mut nodes = vec![Node::new(0, 50.0, 50.0, 0.0, 0.0, 1000.0, 0.0)];

    // 20 customers in a grid pattern
    let mut id = 1;
    for i in 0..4 {
        for j in 0..5 {
            let x = i as f64 * 20.0 + 10.0;
            let y = j as f64 * 20.0 + 10.0;
            let demand = 1.0 + 0.1 * (id as f64 % 3.0);
            let ready = ((id * 53) % 300) as f64;
            nodes.push(Node::new(id, x, y, demand, ready, ready + 250.0, 10.0));
            id += 1;
        }
    }

    Problem::new(
        "ModerateTestProblem".to_string(),
        nodes,
        0,
        20,
        10.0,
        DistancePrecision::OneDecimal,
    )
}

fn bounded_config(variant: Variant, iterations: u64) -> Config {
    Config::new()
        .with_variant(variant)
        .without_time_limit()
        .with_iteration_limit(iterations)
        .with_seed(7)
}

fn assert_valid_report(report: &RunReport, problem: &Problem) {
    assert!(report.feasible);
    assert!(report.total_cost < f64::MAX);
    assert_eq!(report.routes.len(), report.arrival_times.len());

    let mut visited = Vec::new();
    for (route, arrivals) in report.routes.iter().zip(&report.arrival_times) {
        assert_eq!(route.len(), arrivals.len());
        assert_eq!(route.first(), Some(&problem.depot_index));
        assert_eq!(route.last(), Some(&problem.depot_index));
        assert!(route.len() >= 3);
        for (&node, &arrival) in route.iter().zip(arrivals).skip(1) {
            assert!(arrival <= problem.nodes[node].due_time + 1e-9);
        }
        visited.extend_from_slice(&route[1..route.len() - 1]);
    }
    visited.sort();
    assert_eq!(visited, problem.customers().collect::<Vec<_>>());
}

#[test]
fn test_every_variant_finds_feasible_solution() {
    let problem = create_moderate_problem();

    for variant in Variant::ALL {
        let report = solve(&problem, bounded_config(variant, 15)).unwrap();

        assert_valid_report(&report, &problem);
        assert_eq!(report.iterations, 15, "{}", variant);
        assert!(!report.transitions.is_empty());
    }
}

#[test]
fn test_sequence_run_is_reproducible() {
    let problem = create_moderate_problem();

    for variant in [Variant::ExpoHyper, Variant::ThompsonHyperRecord] {
        let first = solve(&problem, bounded_config(variant, 25)).unwrap();
        let second = solve(&problem, bounded_config(variant, 25)).unwrap();

        assert_eq!(first.routes, second.routes);
        assert_eq!(first.total_cost, second.total_cost);
        assert_eq!(first.iterations, second.iterations);
        assert_eq!(first.transitions, second.transitions);
        assert_eq!(first.apply, second.apply);
    }
}

#[test]
fn test_alns_run_is_reproducible() {
    let problem = create_moderate_problem();

    // Long enough for one weight refresh
    let first = solve(&problem, bounded_config(Variant::AlnsImproved, 120)).unwrap();
    let second = solve(&problem, bounded_config(Variant::AlnsImproved, 120)).unwrap();

    assert_eq!(first.routes, second.routes);
    assert_eq!(first.total_cost, second.total_cost);
    assert_eq!(first.transitions, second.transitions);
}

#[test]
fn test_report_tables() {
    let problem = create_moderate_problem();

    let sequence = MultiArmedHyper::new(&problem, bounded_config(Variant::KheiriHyper, 10))
        .unwrap()
        .run();
    assert_eq!(sequence.algorithm, "KheiriHyper[0.01]");
    assert_eq!(sequence.transitions.len(), 27);
    assert_eq!(sequence.apply.len(), 27);
    for row in &sequence.transitions {
        let total: f64 = row.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    let alns = AdaptiveSearch::new(&problem, bounded_config(Variant::Alns, 10), false)
        .unwrap()
        .run();
    assert_eq!(alns.algorithm, "ALNS");
    assert_eq!(alns.transitions.len(), 2);
    assert_eq!(alns.transitions[0].len(), 9);
    assert_eq!(alns.transitions[1].len(), 10);
    assert!(alns.apply.is_empty());

    let improved = solve(&problem, bounded_config(Variant::AlnsImproved, 10)).unwrap();
    assert_eq!(improved.algorithm, "AdaptiveImproved");
    assert_eq!(improved.transitions.len(), 3);
    assert_eq!(improved.transitions[2].len(), 7);
}

#[test]
fn test_diagnostic_catalog_run() {
    let problem = create_moderate_problem();
    let config = bounded_config(Variant::ExpoHyperRecord, 20).with_diagnostic_operators(true);

    let hyper = MultiArmedHyper::new(&problem, config.clone()).unwrap();
    assert_eq!(hyper.catalog().len(), 31);

    let report = hyper.run();
    assert_valid_report(&report, &problem);
    assert_eq!(report.transitions.len(), 31);
}

#[test]
fn test_transcript_layout() {
    let problem = create_moderate_problem();
    let report = solve(&problem, bounded_config(Variant::ExpoHyper, 5)).unwrap();

    assert!(report.transcript.contains("ModerateTestProblem"));
    assert!(report.transcript.contains("running ExpoHyper[0.5,0.01]"));
    assert!(report.transcript.contains("number of low-level heuristics: 27"));
    assert!(report.transcript.contains(&"-".repeat(92)));
    assert!(report.transcript.contains("feasible solution: true"));

    // Header, rule and one row per applied sequence
    let rows = report
        .transcript
        .lines()
        .filter(|line| line.matches('|').count() == 5)
        .count();
    assert_eq!(rows, 1 + 5);
}

#[test]
fn test_time_limited_run_stops() {
    let problem = create_moderate_problem();
    let config = Config::new()
        .with_variant(Variant::KheiriHyperAll)
        .with_time_limit(Duration::from_millis(300));

    let report = solve(&problem, config).unwrap();
    assert_valid_report(&report, &problem);
    assert!(report.run_time < 30.0);
    assert!(report.iterations > 0);
}

#[test]
fn test_report_json_export() {
    let problem = create_moderate_problem();
    let report = solve(&problem, bounded_config(Variant::ThompsonHyper, 5)).unwrap();

    let path = std::env::temp_dir().join("vrptw_hyper_report_test.json");
    report.save_json(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["iterations"], 5);
    assert_eq!(value["feasible"], true);
    assert_eq!(value["algorithm"], "ThompsonHyper[0.01]");

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_unbounded_config_is_rejected() {
    let problem = create_moderate_problem();

    for variant in Variant::ALL {
        let config = Config::new().with_variant(variant).without_time_limit();
        assert_eq!(
            solve(&problem, config).err(),
            Some(ConfigError::Unbounded),
            "{}",
            variant
        );
    }

    let config = bounded_config(Variant::ExpoHyper, 5).with_beta(0.5);
    assert_eq!(solve(&problem, config).err(), Some(ConfigError::Beta(0.5)));

    let config = bounded_config(Variant::Alns, 5).with_delta(-0.1);
    assert_eq!(solve(&problem, config).err(), Some(ConfigError::Negative));
}

#[test]
fn test_sequence_driver_rejects_alns_variants() {
    let problem = create_moderate_problem();

    for variant in [Variant::Alns, Variant::AlnsImproved] {
        let result = MultiArmedHyper::new(&problem, bounded_config(variant, 5));
        assert_eq!(result.err(), Some(ConfigError::NotSequenceBased(variant)));
    }

    let empty = Catalog::from_operators(Vec::new());
    let result =
        MultiArmedHyper::with_catalog(&problem, bounded_config(Variant::ExpoHyper, 5), empty);
    assert!(matches!(result, Err(ConfigError::EmptyCatalog)));
}

#[test]
fn test_iteration_limit_drives_progress() {
    // The default time limit stays set, yet iterations measure progress
    let config = Config::new().with_iteration_limit(100);
    assert!(config.time_limit.is_some());
    assert_eq!(budget_progress(&config, Duration::from_secs(80), 25), 0.25);
    assert_eq!(budget_progress(&config, Duration::from_millis(1), 25), 0.25);
    assert_eq!(budget_progress(&config, Duration::ZERO, 500), 1.0);

    let timed = Config::new().with_time_limit(Duration::from_secs(10));
    assert_eq!(budget_progress(&timed, Duration::from_secs(5), 1000), 0.5);
    assert_eq!(budget_progress(&timed, Duration::from_secs(50), 0), 1.0);
}

//! Tests for the savings construction.

use vrptw_hyper::local_search::LocalSearch;
use vrptw_hyper::problem::{DistancePrecision, Node, Problem};
use vrptw_hyper::savings::savings_method;
use vrptw_hyper::utils::seeded;

/// Depot at the origin with four unit-demand customers on the axes.
fn create_square_problem() -> Problem {
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0, 0.0, 1000.0, 0.0),
        Node::new(1, 10.0, 0.0, 1.0, 0.0, 1000.0, 0.0),
        Node::new(2, 0.0, 10.0, 1.0, 0.0, 1000.0, 0.0),
        Node::new(3, -10.0, 0.0, 1.0, 0.0, 1000.0, 0.0),
        Node::new(4, 0.0, -10.0, 1.0, 0.0, 1000.0, 0.0),
    ];

    Problem::new(
        "Square".to_string(),
        nodes,
        0,
        4,
        4.0,
        DistancePrecision::OneDecimal,
    )
}

/// Customers on a ring around the depot whose windows forbid a single tour.
fn create_window_problem() -> Problem {
    let mut nodes = vec![Node::new(0, 50.0, 50.0, 0.0, 0.0, 500.0, 0.0)];
    for i in 1..=12 {
        let angle = i as f64 * std::f64::consts::PI / 6.0;
        let x = 50.0 + 30.0 * angle.cos();
        let y = 50.0 + 30.0 * angle.sin();
        let ready = if i % 2 == 0 { 0.0 } else { 150.0 };
        nodes.push(Node::new(i, x, y, 2.0, ready, ready + 60.0, 10.0));
    }

    Problem::new(
        "Ring".to_string(),
        nodes,
        0,
        12,
        10.0,
        DistancePrecision::OneDecimal,
    )
}

#[test]
fn test_savings_merges_square_into_one_route() {
    let problem = create_square_problem();

    for seed in 0..10 {
        let mut rng = seeded(seed);
        let mut solution = savings_method(&problem, &mut rng);

        assert!(solution.feasible);
        let routes = solution.non_empty_routes();
        assert_eq!(routes.len(), 1);
        let mut customers = routes[0][1..routes[0].len() - 1].to_vec();
        customers.sort();
        assert_eq!(customers, vec![1, 2, 3, 4]);

        // Either the perimeter tour or one crossing diagonal
        assert!(solution.total_cost <= 68.2 + 1e-6);

        let search = LocalSearch::new(&problem);
        search.two_opt(&mut solution);
        // 10 + 3 * 14.1 + 10
        assert!((solution.total_cost - 62.3).abs() < 1e-6);
    }
}

#[test]
fn test_savings_respects_windows_and_capacity() {
    let problem = create_window_problem();
    let mut rng = seeded(3);
    let solution = savings_method(&problem, &mut rng);

    assert!(solution.feasible);
    for route in &solution.routes {
        assert!(route.feasible);
        assert!(route.load <= problem.vehicle_capacity);
    }

    let mut visited: Vec<usize> = solution
        .non_empty_routes()
        .iter()
        .flat_map(|route| route[1..route.len() - 1].to_vec())
        .collect();
    visited.sort();
    assert_eq!(visited, (1..=12).collect::<Vec<_>>());

    // Cheaper than serving everyone separately
    let separate: f64 = problem
        .customers()
        .map(|c| 2.0 * problem.get_time(0, c))
        .sum();
    assert!(solution.total_cost < separate);
}

#[test]
fn test_savings_is_reproducible() {
    let problem = create_window_problem();

    let first = savings_method(&problem, &mut seeded(11));
    let second = savings_method(&problem, &mut seeded(11));

    assert_eq!(first.non_empty_routes(), second.non_empty_routes());
    assert_eq!(first.total_cost, second.total_cost);
}

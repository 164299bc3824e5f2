//! Unit tests for the Solution and Route structures.

use vrptw_hyper::problem::{DistancePrecision, Node, Problem};
use vrptw_hyper::solution::{is_feasible_route, travel_time, Route, Solution};

/// Depot at the origin with four unit-demand customers on the axes.
fn create_test_problem(capacity: f64) -> Problem {
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0, 0.0, 1000.0, 0.0),
        Node::new(1, 10.0, 0.0, 1.0, 0.0, 1000.0, 0.0),
        Node::new(2, 0.0, 10.0, 1.0, 0.0, 1000.0, 0.0),
        Node::new(3, -10.0, 0.0, 1.0, 0.0, 1000.0, 0.0),
        Node::new(4, 0.0, -10.0, 1.0, 0.0, 1000.0, 0.0),
    ];

    Problem::new(
        "TestProblem".to_string(),
        nodes,
        0,        // depot index
        4,        // vehicles
        capacity, // vehicle capacity
        DistancePrecision::OneDecimal,
    )
}

/// Two customers on a line, the second one with a tight window and service time.
fn create_window_problem() -> Problem {
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0, 0.0, 200.0, 0.0),
        Node::new(1, 10.0, 0.0, 1.0, 30.0, 100.0, 5.0),
        Node::new(2, 20.0, 0.0, 1.0, 0.0, 25.0, 5.0),
    ];

    Problem::new(
        "WindowProblem".to_string(),
        nodes,
        0,
        2,
        10.0,
        DistancePrecision::OneDecimal,
    )
}

#[test]
fn test_route_evaluate() {
    let problem = create_test_problem(4.0);

    let mut route = Route::from_nodes(vec![0, 1, 2, 0]);
    route.evaluate(&problem);

    // 10 + 14.1 + 10
    assert!((route.cost - 34.1).abs() < 1e-9);
    assert_eq!(route.load, 2.0);
    assert!(route.feasible);
    assert_eq!(route.customers(), &[1, 2]);

    let arrivals: Vec<f64> = route.times.iter().map(|stop| stop.arrival).collect();
    assert_eq!(arrivals.len(), 4);
    assert!((arrivals[1] - 10.0).abs() < 1e-9);
    assert!((arrivals[2] - 24.1).abs() < 1e-9);
    assert!((arrivals[3] - 34.1).abs() < 1e-9);
}

#[test]
fn test_empty_route() {
    let problem = create_test_problem(4.0);

    let mut route = Route::empty(problem.depot_index);
    route.evaluate(&problem);

    assert!(route.is_empty());
    assert!(route.customers().is_empty());
    assert_eq!(route.cost, 0.0);
    assert!(route.feasible);

    let mut single = Route::out_and_back(problem.depot_index, 3);
    single.evaluate(&problem);
    assert!(!single.is_empty());
    assert!((single.cost - 20.0).abs() < 1e-9);
}

#[test]
fn test_waiting_and_late_arrival() {
    let problem = create_window_problem();

    // Wait at 1 until 30, leave at 35, reach 2 at 45 > 25
    let mut route = Route::from_nodes(vec![0, 1, 2, 0]);
    route.evaluate(&problem);

    assert!(!route.feasible);
    assert_eq!(route.times[1].arrival, 10.0);
    assert_eq!(route.times[1].start, 30.0);
    assert_eq!(route.times[1].departure, 35.0);
    assert!((route.cost - (40.0 + problem.penalty())).abs() < 1e-9);
    assert!(!is_feasible_route(&route.nodes, &problem));

    // The reverse order reaches 2 at 20 and 1 at 35
    assert!(is_feasible_route(&[0, 2, 1, 0], &problem));
}

#[test]
fn test_capacity_violation() {
    let problem = create_test_problem(2.0);

    let mut route = Route::from_nodes(vec![0, 1, 2, 3, 0]);
    route.evaluate(&problem);

    assert!(!route.feasible);
    assert_eq!(route.load, 3.0);
    let travel = travel_time(&route.nodes, &problem);
    assert!(route.cost >= travel + problem.penalty());
}

#[test]
fn test_evaluate_is_idempotent() {
    let problem = create_test_problem(4.0);
    let mut solution = Solution::from_routes(&problem, vec![vec![0, 1, 2, 0], vec![0, 3, 4, 0]]);

    let cost = solution.total_cost;
    let feasible = solution.feasible;
    solution.evaluate(&problem);
    assert_eq!(solution.total_cost, cost);
    assert_eq!(solution.feasible, feasible);

    solution.evaluate(&problem);
    assert_eq!(solution.total_cost, cost);
    assert!(solution.is_feasible());
    assert!((solution.total_cost() - 68.2).abs() < 1e-9);
}

#[test]
fn test_missing_customers_are_penalised() {
    let problem = create_test_problem(4.0);
    let solution = Solution::from_routes(&problem, vec![vec![0, 1, 2, 0]]);

    assert!(!solution.feasible);
    let expected = 34.1 + 2.0 * problem.penalty();
    assert!((solution.total_cost - expected).abs() < 1e-6);

    let blank = Solution::new(&problem);
    assert_eq!(blank.get_route_count(), 4);
    assert!((blank.total_cost - 4.0 * problem.penalty()).abs() < 1e-6);
}

#[test]
fn test_duplicate_customers_are_penalised() {
    let problem = create_test_problem(4.0);
    let solution = Solution::from_routes(&problem, vec![vec![0, 1, 2, 0], vec![0, 1, 3, 4, 0]]);

    assert!(!solution.feasible);
    let travel = travel_time(&[0, 1, 2, 0], &problem) + travel_time(&[0, 1, 3, 4, 0], &problem);
    assert!((solution.total_cost - (travel + problem.penalty())).abs() < 1e-6);
}

#[test]
fn test_excess_vehicles_are_penalised() {
    let problem = create_test_problem(4.0);
    let mut routes: Vec<Vec<usize>> = (1..=4).map(|c| vec![0, c, 0]).collect();
    routes.push(vec![0, 0]);
    let solution = Solution::from_routes(&problem, routes);

    assert!(!solution.feasible);
    assert!((solution.total_cost - (80.0 + problem.penalty())).abs() < 1e-6);
}

#[test]
fn test_penalty_dominance() {
    let problem = create_test_problem(2.0);

    // Worst feasible plan: every customer on its own route
    let feasible = Solution::from_routes(&problem, (1..=4).map(|c| vec![0, c, 0]).collect());
    assert!(feasible.feasible);

    // Shortest tour, but over capacity
    let overloaded = Solution::from_routes(&problem, vec![vec![0, 1, 2, 3, 4, 0]]);
    assert!(!overloaded.feasible);
    assert!(feasible.total_cost < overloaded.total_cost);

    // Missing one customer
    let partial = Solution::from_routes(&problem, vec![vec![0, 1, 2, 0], vec![0, 3, 0]]);
    assert!(!partial.feasible);
    assert!(feasible.total_cost < partial.total_cost);
}

#[test]
fn test_update_keeps_one_spare_route() {
    let problem = create_test_problem(4.0);
    let mut solution = Solution::from_routes(
        &problem,
        vec![vec![0, 0], vec![0, 1, 2, 3, 4, 0], vec![0, 0], vec![0, 0]],
    );

    solution.update(&problem);

    assert_eq!(solution.get_route_count(), 2);
    assert!(solution.routes[0].customers().len() == 4);
    assert!(solution.routes[1].is_empty());
    assert_eq!(solution.non_empty_routes(), vec![vec![0, 1, 2, 3, 4, 0]]);
    assert_eq!(solution.arrival_times().len(), 1);
}

#[test]
fn test_remove_and_lookup() {
    let problem = create_test_problem(4.0);
    let mut solution = Solution::from_routes(&problem, vec![vec![0, 1, 2, 0], vec![0, 3, 4, 0]]);

    assert_eq!(solution.route_of(3), Some(1));
    assert_eq!(solution.route_of(0), None);
    assert!((solution.start_time_of(2).unwrap() - 24.1).abs() < 1e-9);

    assert!(solution.remove_node(2, &problem));
    assert!(!solution.remove_node(2, &problem));
    assert_eq!(solution.routes[0].nodes, vec![0, 1, 0]);
    assert!((solution.routes[0].cost - 20.0).abs() < 1e-9);

    solution.set_route(1, vec![0, 4, 3, 2, 0], &problem);
    assert_eq!(solution.route_of(2), Some(1));
}

#[test]
fn test_fingerprint() {
    let problem = create_test_problem(4.0);
    let solution = Solution::from_routes(&problem, vec![vec![0, 1, 2, 0], vec![0, 3, 4, 0]]);
    let clone = solution.clone();
    assert_eq!(solution.fingerprint(), clone.fingerprint());

    let other = Solution::from_routes(&problem, vec![vec![0, 2, 1, 0], vec![0, 3, 4, 0]]);
    assert_ne!(solution.fingerprint(), other.fingerprint());
}

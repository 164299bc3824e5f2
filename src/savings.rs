//! Clarke-Wright savings construction.

use crate::problem::Problem;
use crate::solution::{Route, Solution};
use crate::utils::Random;
use log::debug;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// Build a starting solution by merging out-and-back routes.
///
/// Route tails are visited in random order each pass; every tail tries the
/// heads with the largest savings first and each candidate is consumed once,
/// whether the merge succeeds or not.
pub fn savings_method(problem: &Problem, rng: &mut Random) -> Solution {
    let mut solution = Solution {
        routes: problem
            .customers()
            .map(|customer| Route::out_and_back(problem.depot_index, customer))
            .collect(),
        total_cost: 0.0,
        feasible: false,
    };
    solution.update(problem);

    let mut candidates = compute_savings(problem);
    let mut passes = 0;

    let mut merged = true;
    while merged {
        merged = false;
        passes += 1;

        // Head node -> route index
        let mut heads: Vec<Option<usize>> = vec![None; problem.nodes.len()];
        for (index, route) in solution.routes.iter().enumerate() {
            if !route.is_empty() {
                heads[route.nodes[1]] = Some(index);
            }
        }

        let mut order: Vec<usize> = (0..solution.routes.len()).collect();
        order.shuffle(rng);

        for index1 in order {
            if solution.routes[index1].is_empty() {
                continue;
            }

            let route1 = &solution.routes[index1].nodes;
            let tail = route1[route1.len() - 2];

            while let Some(head) = candidates[tail].pop_front() {
                let Some(index2) = heads[head] else {
                    continue;
                };
                if index2 == index1 || !can_merge(problem, &solution, index1, index2) {
                    continue;
                }

                let route1 = &solution.routes[index1].nodes;
                let route2 = &solution.routes[index2].nodes;
                let mut joined = route1[..route1.len() - 1].to_vec();
                joined.extend_from_slice(&route2[1..]);

                solution.set_route(index1, joined, problem);
                solution.set_route(index2, Vec::new(), problem);

                heads[head] = None;
                candidates[head].retain(|&node| node != tail);
                merged = true;
                break;
            }
        }

        solution.update(problem);
    }

    debug!(
        "savings method: {} routes after {} passes, cost {:.2}",
        solution.non_empty_routes().len(),
        passes,
        solution.total_cost
    );

    solution
}

/// For every customer `a`, the customers `b` ordered by the saving of
/// visiting `b` right after `a` instead of returning to the depot in between.
fn compute_savings(problem: &Problem) -> Vec<VecDeque<usize>> {
    let depot = problem.depot_index;
    let mut candidates = vec![VecDeque::new(); problem.nodes.len()];

    for a in problem.customers() {
        let mut options: Vec<(usize, f64)> = problem
            .customers()
            .filter(|&b| b != a)
            .map(|b| {
                let saving =
                    problem.get_time(a, depot) + problem.get_time(depot, b) - problem.get_time(a, b);
                (b, saving)
            })
            .collect();
        options.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
        candidates[a] = options.into_iter().map(|(b, _)| b).collect();
    }

    candidates
}

/// Capacity and forward time-window check of `route1` followed by `route2`.
fn can_merge(problem: &Problem, solution: &Solution, index1: usize, index2: usize) -> bool {
    let route1 = &solution.routes[index1];
    let route2 = &solution.routes[index2];

    if route1.load + route2.load > problem.vehicle_capacity {
        return false;
    }

    let tail_pos = route1.nodes.len() - 2;
    let mut time = route1.times[tail_pos].departure;
    let mut last = route1.nodes[tail_pos];

    for &node in &route2.nodes[1..] {
        let info = &problem.nodes[node];
        time += problem.get_time(last, node);
        if info.due_time < time {
            return false;
        }
        time = time.max(info.ready_time) + info.service_time;
        last = node;
    }

    true
}

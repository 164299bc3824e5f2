//! Removal operators for ruin-and-recreate moves.
//!
//! Each operator takes customers out of their routes, re-evaluates the routes
//! it touched and returns the removed ids for a repair operator to reinsert.

use crate::problem::Problem;
use crate::solution::{Route, Solution};
use crate::utils::{random_indexes, rank_biased_position, removal_size, Random};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Weight of the travel time term of the relatedness measure.
const RELATED_DISTANCE: f64 = 9.0;
/// Weight of the service start gap term of the relatedness measure.
const RELATED_TIME: f64 = 3.0;
/// Weight of the demand difference term of the relatedness measure.
const RELATED_DEMAND: f64 = 2.0;
/// Chance of picking each candidate route, in centrality order.
const ROUTE_PICK: f64 = 0.25;

fn customer_list(problem: &Problem) -> Vec<usize> {
    problem.customers().collect()
}

fn remove_all(solution: &mut Solution, problem: &Problem, nodes: &BTreeSet<usize>) {
    for &node in nodes {
        solution.remove_node(node, problem);
    }
}

/// Remove `q` customers drawn uniformly at random.
pub fn random_removal(
    solution: &mut Solution,
    problem: &Problem,
    rng: &mut Random,
) -> BTreeSet<usize> {
    let customers = customer_list(problem);
    let q = removal_size(customers.len(), rng).min(customers.len());

    let mut removed = BTreeSet::new();
    while removed.len() < q {
        removed.insert(customers[rng.gen_range(0..customers.len())]);
    }

    remove_all(solution, problem, &removed);
    removed
}

/// Remove a seed customer and then customers related to those already removed.
///
/// Relatedness combines normalised travel time, service start gap and demand
/// difference; smaller means more related.
pub fn shaw_removal(
    solution: &mut Solution,
    problem: &Problem,
    rng: &mut Random,
) -> BTreeSet<usize> {
    let customers = customer_list(problem);
    let q = removal_size(customers.len(), rng).min(customers.len());
    if customers.is_empty() {
        return BTreeSet::new();
    }

    let seed = customers[rng.gen_range(0..customers.len())];
    let mut removed = vec![seed];
    let mut related: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    while removed.len() < q {
        let anchor = removed[rng.gen_range(0..removed.len())];
        let list = related
            .entry(anchor)
            .or_insert_with(|| relatedness(solution, problem, anchor));
        list.retain(|node| !removed.contains(node));
        if list.is_empty() {
            break;
        }

        let pos = rank_biased_position(list.len(), rng);
        removed.push(list[pos]);
    }

    let removed: BTreeSet<usize> = removed.into_iter().collect();
    remove_all(solution, problem, &removed);
    removed
}

/// Routed customers ordered from most to least related to `anchor`.
///
/// A term whose normaliser is zero contributes nothing.
pub fn relatedness(solution: &Solution, problem: &Problem, anchor: usize) -> Vec<usize> {
    let anchor_start = solution.start_time_of(anchor);
    let anchor_demand = problem.nodes[anchor].demand;

    let mut entries: Vec<(usize, f64, f64)> = Vec::new();
    for route in &solution.routes {
        for (j, &node) in route.nodes.iter().enumerate() {
            if j == 0 || j + 1 == route.nodes.len() {
                continue;
            }
            let gap = match (anchor_start, route.times.get(j)) {
                (Some(start), Some(stop)) => (stop.start - start).abs(),
                _ => 0.0,
            };
            entries.push((node, problem.get_time(anchor, node), gap));
        }
    }

    let max_distance = problem.time_matrix[anchor].iter().copied().fold(0.0, f64::max);
    let max_gap = entries.iter().map(|entry| entry.2).fold(0.0, f64::max);

    let mut scored: Vec<(usize, f64)> = entries
        .into_iter()
        .map(|(node, distance, gap)| {
            let mut value = RELATED_DEMAND * (problem.nodes[node].demand - anchor_demand).abs();
            if max_distance > 0.0 {
                value += RELATED_DISTANCE * distance / max_distance;
            }
            if max_gap > 0.0 {
                value += RELATED_TIME * gap / max_gap;
            }
            (node, value)
        })
        .collect();
    scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(node, _)| node).collect()
}

fn detours(route: &Route, problem: &Problem) -> Vec<(usize, f64)> {
    route
        .nodes
        .windows(3)
        .map(|w| {
            let value = problem.get_time(w[0], w[1]) + problem.get_time(w[1], w[2])
                - problem.get_time(w[0], w[2]);
            (w[1], value)
        })
        .collect()
}

fn sort_descending(values: &mut [(usize, f64)]) {
    values.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
}

/// Repeatedly remove customers with large detour cost, re-ranking after each removal.
pub fn worst_removal(
    solution: &mut Solution,
    problem: &Problem,
    rng: &mut Random,
) -> BTreeSet<usize> {
    let customers = customer_list(problem);
    let q = removal_size(customers.len(), rng).min(customers.len());

    let mut values: Vec<(usize, f64)> = solution
        .routes
        .iter()
        .flat_map(|route| detours(route, problem))
        .collect();
    sort_descending(&mut values);

    let mut removed = BTreeSet::new();
    while removed.len() < q && !values.is_empty() {
        let pos = rank_biased_position(values.len(), rng);
        let (node, _) = values.remove(pos);
        let Some(index) = solution.route_of(node) else {
            continue;
        };
        solution.remove_node(node, problem);
        removed.insert(node);

        // Neighbours of the removed customer changed their detour
        let route = &solution.routes[index];
        values.retain(|(n, _)| !route.customers().contains(n));
        values.extend(detours(route, problem));
        sort_descending(&mut values);
    }

    removed
}

/// Mean travel time from each customer of a route to the closest customer of
/// any other route.
fn centrality(solution: &Solution, problem: &Problem, index: usize) -> f64 {
    let route = &solution.routes[index];
    let others: Vec<usize> = solution
        .routes
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .flat_map(|(_, other)| other.customers().iter().copied())
        .collect();

    if others.is_empty() || route.customers().is_empty() {
        return 0.0;
    }

    let total: f64 = route
        .customers()
        .iter()
        .map(|&node| {
            others
                .iter()
                .map(|&other| problem.get_time(node, other))
                .fold(f64::MAX, f64::min)
        })
        .sum();
    total / route.customers().len() as f64
}

/// Empty one whole route, favouring routes lying close to the others.
pub fn route_removal(
    solution: &mut Solution,
    problem: &Problem,
    rng: &mut Random,
) -> BTreeSet<usize> {
    let mut candidates: Vec<(usize, f64)> = (0..solution.routes.len())
        .filter(|&i| !solution.routes[i].is_empty())
        .map(|i| (i, centrality(solution, problem, i)))
        .collect();
    if candidates.is_empty() {
        return BTreeSet::new();
    }
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut chosen = candidates[0].0;
    for &(index, _) in &candidates {
        if rng.gen::<f64>() < ROUTE_PICK {
            chosen = index;
            break;
        }
    }

    let removed: BTreeSet<usize> = solution.routes[chosen].customers().iter().copied().collect();
    solution.set_route(chosen, vec![problem.depot_index, problem.depot_index], problem);
    removed
}

/// Remove customers where the vehicle waits longest for the window to open.
pub fn window_removal(
    solution: &mut Solution,
    problem: &Problem,
    rng: &mut Random,
) -> BTreeSet<usize> {
    let customers = customer_list(problem);
    let q = removal_size(customers.len(), rng).min(customers.len());

    let mut slack: Vec<(usize, f64)> = Vec::new();
    for route in &solution.routes {
        for (j, &node) in route.nodes.iter().enumerate() {
            if j == 0 || j + 1 == route.nodes.len() {
                continue;
            }
            if let Some(stop) = route.times.get(j) {
                let wait = stop.start - stop.arrival;
                if wait > 0.0 {
                    slack.push((node, wait));
                }
            }
        }
    }
    sort_descending(&mut slack);

    let mut removed = BTreeSet::new();
    while removed.len() < q && !slack.is_empty() {
        let pos = rank_biased_position(slack.len(), rng);
        removed.insert(slack.remove(pos).0);
    }

    remove_all(solution, problem, &removed);
    removed
}

/// Remove every customer whose service starts within `depot due time / div`
/// of a random seed customer's start.
pub fn time_radial_removal(
    solution: &mut Solution,
    problem: &Problem,
    div: f64,
    rng: &mut Random,
) -> BTreeSet<usize> {
    let customers = customer_list(problem);
    if customers.is_empty() {
        return BTreeSet::new();
    }
    let seed = customers[rng.gen_range(0..customers.len())];
    let Some(seed_start) = solution.start_time_of(seed) else {
        return BTreeSet::new();
    };

    let limit = problem.get_depot().due_time / div;
    let (lower, upper) = (seed_start - limit, seed_start + limit);

    let mut removed = BTreeSet::new();
    for route in &solution.routes {
        for (j, &node) in route.nodes.iter().enumerate() {
            if j == 0 || j + 1 == route.nodes.len() {
                continue;
            }
            let start = route.times[j].start;
            if lower <= start && start <= upper {
                removed.insert(node);
            }
            if start > upper {
                break;
            }
        }
    }
    removed.insert(seed);

    remove_all(solution, problem, &removed);
    removed
}

/// Remove every customer closer than `max travel time / div` to a random seed customer.
pub fn distance_radial_removal(
    solution: &mut Solution,
    problem: &Problem,
    div: f64,
    rng: &mut Random,
) -> BTreeSet<usize> {
    let customers = customer_list(problem);
    if customers.is_empty() {
        return BTreeSet::new();
    }
    let seed = customers[rng.gen_range(0..customers.len())];
    if solution.route_of(seed).is_none() {
        return BTreeSet::new();
    }

    let limit = problem.max_time() / div;
    let mut removed: BTreeSet<usize> = solution
        .routes
        .iter()
        .flat_map(|route| route.customers().iter().copied())
        .filter(|&node| problem.get_time(seed, node) < limit)
        .collect();
    removed.insert(seed);

    remove_all(solution, problem, &removed);
    removed
}

fn dissolve_route(solution: &mut Solution, problem: &Problem, index: usize) {
    let depot = problem.depot_index;
    let customers = solution.routes[index].customers().to_vec();
    for customer in customers {
        solution.routes.push(Route::out_and_back(depot, customer));
    }
    solution.routes[index] = Route::empty(depot);
}

/// Split the first sampled non-empty route into out-and-back routes.
pub fn dissolve_one_route(solution: &mut Solution, problem: &Problem, rng: &mut Random) {
    let indexes = random_indexes(solution.routes.len(), rng);
    if let Some(index) = indexes
        .into_iter()
        .find(|&index| !solution.routes[index].is_empty())
    {
        dissolve_route(solution, problem, index);
        solution.update(problem);
    }
}

/// Split every route serving two or more customers into out-and-back routes.
pub fn dissolve_all_routes(solution: &mut Solution, problem: &Problem) {
    let count = solution.routes.len();
    for index in 0..count {
        if solution.routes[index].customers().len() > 1 {
            dissolve_route(solution, problem, index);
        }
    }
    solution.update(problem);
}

//! Insertion operators that put removed customers back into a solution.

use crate::problem::Problem;
use crate::solution::{is_feasible_route, Route, Solution};
use crate::utils::Random;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Half-width of the insertion noise, relative to the largest travel time.
const NOISE_SHARE: f64 = 0.025;

/// Best known insertion of one customer into one route.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Feasible { cost: f64, position: usize },
    Infeasible,
}

/// Cached best insertions keyed by (customer, route index).
///
/// Only routes marked dirty are re-scanned; an insertion found infeasible
/// stays infeasible until the customer is placed.
struct InsertionCache {
    slots: BTreeMap<(usize, usize), Slot>,
    dirty: BTreeSet<usize>,
    noise: Option<f64>,
}

impl InsertionCache {
    fn new(solution: &Solution, problem: &Problem, noise: bool) -> Self {
        InsertionCache {
            slots: BTreeMap::new(),
            dirty: (0..solution.routes.len())
                .filter(|&i| solution.routes[i].feasible)
                .collect(),
            noise: noise.then(|| problem.max_time() * NOISE_SHARE),
        }
    }

    /// Re-scan dirty routes for every pending customer.
    fn refresh(
        &mut self,
        solution: &Solution,
        problem: &Problem,
        pending: &BTreeSet<usize>,
        rng: &mut Random,
    ) {
        let dirty = std::mem::take(&mut self.dirty);
        for index in dirty {
            let route = &solution.routes[index].nodes;
            for &node in pending {
                if let Some(Slot::Infeasible) = self.slots.get(&(node, index)) {
                    continue;
                }
                let slot = self.best_slot(route, node, problem, rng);
                self.slots.insert((node, index), slot);
            }
        }
    }

    fn best_slot(&self, route: &[usize], node: usize, problem: &Problem, rng: &mut Random) -> Slot {
        let mut best = Slot::Infeasible;
        let mut best_cost = f64::MAX;

        for j in 0..route.len().saturating_sub(1) {
            let mut value = problem.get_time(route[j], node) + problem.get_time(node, route[j + 1]);
            if let Some(plus) = self.noise {
                let unif = plus - rng.gen::<f64>() * 2.0 * plus;
                value = (value + unif).max(0.0);
            }

            if value < best_cost {
                let mut candidate = route.to_vec();
                candidate.insert(j + 1, node);
                if is_feasible_route(&candidate, problem) {
                    best_cost = value;
                    best = Slot::Feasible {
                        cost: value,
                        position: j + 1,
                    };
                }
            }
        }

        best
    }

    /// Insertion costs of `node` over every scanned route, infeasible ones at `penalty`.
    fn options(&self, node: usize, penalty: f64) -> Vec<(usize, f64)> {
        self.slots
            .range((node, 0)..=(node, usize::MAX))
            .map(|(&(_, route), slot)| match slot {
                Slot::Feasible { cost, .. } => (route, *cost),
                Slot::Infeasible => (route, penalty),
            })
            .collect()
    }

    fn position(&self, node: usize, route: usize) -> Option<usize> {
        match self.slots.get(&(node, route)) {
            Some(Slot::Feasible { position, .. }) => Some(*position),
            _ => None,
        }
    }

    /// Forget a placed customer and re-scan the route it went into.
    fn placed(&mut self, node: usize, route: usize) {
        self.slots.retain(|&(n, r), slot| {
            n != node && !(r == route && matches!(slot, Slot::Feasible { .. }))
        });
        self.dirty.insert(route);
    }
}

fn insert_at(solution: &mut Solution, problem: &Problem, route: usize, position: usize, node: usize) {
    let mut nodes = solution.routes[route].nodes.clone();
    nodes.insert(position, node);
    solution.set_route(route, nodes, problem);
}

/// Open an out-and-back route for the smallest pending customer.
fn open_route(
    solution: &mut Solution,
    problem: &Problem,
    pending: &mut BTreeSet<usize>,
    cache: &mut InsertionCache,
) {
    let Some(node) = pending.pop_first() else {
        return;
    };
    let mut route = Route::out_and_back(problem.depot_index, node);
    route.evaluate(problem);
    solution.routes.push(route);

    cache.placed(node, solution.routes.len() - 1);
}

/// Insert customers one at a time at the globally cheapest feasible position.
pub fn greedy_insertion(
    solution: &mut Solution,
    problem: &Problem,
    nodes: BTreeSet<usize>,
    noise: bool,
    rng: &mut Random,
) {
    let mut pending = nodes;
    let mut cache = InsertionCache::new(solution, problem, noise);

    while !pending.is_empty() {
        cache.refresh(solution, problem, &pending, rng);

        let mut best: Option<(usize, usize, f64)> = None;
        for &node in &pending {
            for (route, cost) in cache.options(node, f64::MAX) {
                if cost < problem.penalty() && best.map_or(true, |(_, _, min)| cost < min) {
                    best = Some((node, route, cost));
                }
            }
        }

        match best.and_then(|(node, route, _)| Some((node, route, cache.position(node, route)?))) {
            Some((node, route, position)) => {
                insert_at(solution, problem, route, position, node);
                pending.remove(&node);
                cache.placed(node, route);
            }
            None => open_route(solution, problem, &mut pending, &mut cache),
        }
    }

    solution.update(problem);
}

/// Insert first the customer whose `k` best route options differ most from its best one.
///
/// With fewer than two routes there is nothing to regret and greedy insertion is used.
pub fn regret_insertion(
    solution: &mut Solution,
    problem: &Problem,
    k: usize,
    nodes: BTreeSet<usize>,
    noise: bool,
    rng: &mut Random,
) {
    if solution.routes.len() < 2 {
        greedy_insertion(solution, problem, nodes, noise, rng);
        return;
    }
    if k < 2 {
        solution.update(problem);
        return;
    }

    let penalty = problem.penalty();
    let mut pending = nodes;
    let mut cache = InsertionCache::new(solution, problem, noise);

    while !pending.is_empty() {
        cache.refresh(solution, problem, &pending, rng);

        let mut chosen: Option<(usize, usize)> = None;
        let mut max_regret = f64::MIN;

        for &node in &pending {
            let mut options = cache.options(node, penalty);
            if options.is_empty() {
                continue;
            }
            options.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

            let (route, best) = options[0];
            let regret: f64 = options
                .iter()
                .take(k)
                .skip(1)
                .map(|&(_, cost)| cost - best)
                .sum();

            if max_regret < regret && best < penalty {
                max_regret = regret;
                chosen = Some((node, route));
            }
        }

        match chosen.and_then(|(node, route)| Some((node, route, cache.position(node, route)?))) {
            Some((node, route, position)) => {
                insert_at(solution, problem, route, position, node);
                pending.remove(&node);
                cache.placed(node, route);
            }
            None => open_route(solution, problem, &mut pending, &mut cache),
        }
    }

    solution.update(problem);
}

/// Regret insertion looking at every route.
pub fn regret_all_insertion(
    solution: &mut Solution,
    problem: &Problem,
    nodes: BTreeSet<usize>,
    noise: bool,
    rng: &mut Random,
) {
    let k = solution.routes.len();
    regret_insertion(solution, problem, k, nodes, noise, rng);
}

//! Solution representation and penalized evaluation for the VRPTW.

use crate::problem::Problem;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Timing of a single stop: arrival, service start after waiting, departure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopTimes {
    pub arrival: f64,
    pub start: f64,
    pub departure: f64,
}

impl StopTimes {
    fn at(time: f64) -> Self {
        StopTimes {
            arrival: time,
            start: time,
            departure: time,
        }
    }
}

/// Represents a route in a VRPTW solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Visited node ids; the depot is the first and the last element
    pub nodes: Vec<usize>,
    /// Travel time plus one penalty per late arrival and per capacity breach
    pub cost: f64,
    /// The total load of the route
    pub load: f64,
    /// No penalty fired while walking the route
    pub feasible: bool,
    /// Timing of every stop, aligned with `nodes`
    pub times: Vec<StopTimes>,
}

impl Route {
    /// Create a route that leaves the depot and comes straight back.
    pub fn empty(depot: usize) -> Self {
        Route::from_nodes(vec![depot, depot])
    }

    /// Create a route serving a single customer.
    pub fn out_and_back(depot: usize, customer: usize) -> Self {
        Route::from_nodes(vec![depot, customer, depot])
    }

    /// Wrap a node sequence; the caller evaluates it before reading costs.
    pub fn from_nodes(nodes: Vec<usize>) -> Self {
        Route {
            nodes,
            cost: 0.0,
            load: 0.0,
            feasible: true,
            times: Vec::new(),
        }
    }

    /// Check if the route serves no customer.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() < 3
    }

    /// The customers of the route, depot excluded.
    pub fn customers(&self) -> &[usize] {
        if self.nodes.len() < 2 {
            return &[];
        }
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// Position of `node` in the route, if present.
    pub fn position(&self, node: usize) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    /// Walk the route once, recomputing times, load, cost and feasibility.
    pub fn evaluate(&mut self, problem: &Problem) {
        let penalty = problem.penalty();
        let capacity = problem.vehicle_capacity;

        self.times.clear();
        self.cost = 0.0;
        self.load = 0.0;
        self.feasible = true;

        let Some(&first) = self.nodes.first() else {
            return;
        };

        let mut last = first;
        let mut time = problem.nodes[last].service_time;
        self.times.push(StopTimes::at(time));

        for &node in &self.nodes[1..] {
            let info = &problem.nodes[node];
            let travel = problem.get_time(last, node);
            self.cost += travel;

            time += travel;
            let arrival = time;
            if info.due_time < time {
                self.cost += penalty;
                self.feasible = false;
            }

            // Wait if too early
            if info.ready_time > time {
                time = info.ready_time;
            }
            let start = time;

            self.load += info.demand;
            if self.load > capacity {
                self.cost += penalty;
                self.feasible = false;
            }

            time += info.service_time;
            self.times.push(StopTimes {
                arrival,
                start,
                departure: time,
            });
            last = node;
        }
    }
}

/// Check whether a node sequence respects every time window and the capacity.
pub fn is_feasible_route(nodes: &[usize], problem: &Problem) -> bool {
    let Some(&first) = nodes.first() else {
        return true;
    };

    let mut last = first;
    let mut time = problem.nodes[last].service_time;
    let mut load = 0.0;

    for &node in &nodes[1..] {
        let info = &problem.nodes[node];
        time += problem.get_time(last, node);
        if info.due_time < time {
            return false;
        }
        if info.ready_time > time {
            time = info.ready_time;
        }

        load += info.demand;
        if load > problem.vehicle_capacity {
            return false;
        }

        time += info.service_time;
        last = node;
    }

    true
}

/// Travel time of a node sequence, without penalties.
pub fn travel_time(nodes: &[usize], problem: &Problem) -> f64 {
    nodes
        .windows(2)
        .map(|pair| problem.get_time(pair[0], pair[1]))
        .sum()
}

/// Represents a complete solution to a VRPTW instance.
///
/// Constraint violations are tolerated and priced with the instance penalty,
/// so the route list is always well formed even when the plan is not.
#[derive(Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The list of routes
    pub routes: Vec<Route>,
    /// Sum of route costs plus penalties for vehicles and unserved or repeated customers
    pub total_cost: f64,
    /// No penalty term fired anywhere
    pub feasible: bool,
}

impl Solution {
    /// Create a solution with one empty route per available vehicle.
    pub fn new(problem: &Problem) -> Self {
        let routes = (0..problem.vehicle_count)
            .map(|_| Route::empty(problem.depot_index))
            .collect();
        let mut solution = Solution {
            routes,
            total_cost: 0.0,
            feasible: false,
        };
        solution.evaluate(problem);
        solution
    }

    /// Create a solution from explicit node sequences, evaluated as given.
    pub fn from_routes(problem: &Problem, routes: Vec<Vec<usize>>) -> Self {
        let mut solution = Solution {
            routes: routes.into_iter().map(Route::from_nodes).collect(),
            total_cost: 0.0,
            feasible: false,
        };
        solution.evaluate(problem);
        solution
    }

    /// Drop empty routes, keep one spare empty route while vehicles remain, and evaluate.
    pub fn update(&mut self, problem: &Problem) {
        self.routes.retain(|route| !route.is_empty());

        if problem.vehicle_count > self.routes.len() {
            self.routes.push(Route::empty(problem.depot_index));
        }

        self.evaluate(problem);
    }

    /// Recompute every route and the aggregate cost and feasibility.
    ///
    /// This is the only place costs are produced; operators rely on it rather
    /// than on their own bookkeeping.
    pub fn evaluate(&mut self, problem: &Problem) {
        let penalty = problem.penalty();
        self.total_cost = 0.0;
        self.feasible = true;

        for route in &mut self.routes {
            route.evaluate(problem);
        }

        if self.routes.len() > problem.vehicle_count {
            self.feasible = false;
            self.total_cost += penalty * (self.routes.len() - problem.vehicle_count) as f64;
        }

        for route in &self.routes {
            self.total_cost += route.cost;
            if !route.feasible {
                self.feasible = false;
                self.total_cost += penalty;
            }
        }

        // Customers must be visited exactly once
        let mut seen = vec![false; problem.nodes.len()];
        for route in &self.routes {
            for &node in route.customers() {
                if node == problem.depot_index || seen[node] {
                    self.feasible = false;
                    self.total_cost += penalty;
                } else {
                    seen[node] = true;
                }
            }
        }

        let missing = problem.customers().filter(|&node| !seen[node]).count();
        if missing > 0 {
            self.feasible = false;
            self.total_cost += penalty * missing as f64;
        }
    }

    /// Get the total penalized cost.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Check if the solution is feasible.
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// Get the number of routes.
    pub fn get_route_count(&self) -> usize {
        self.routes.len()
    }

    /// Node sequences of the routes that serve at least one customer.
    pub fn non_empty_routes(&self) -> Vec<Vec<usize>> {
        self.routes
            .iter()
            .filter(|route| !route.is_empty())
            .map(|route| route.nodes.clone())
            .collect()
    }

    /// Arrival time at every stop of the non-empty routes.
    pub fn arrival_times(&self) -> Vec<Vec<f64>> {
        self.routes
            .iter()
            .filter(|route| !route.is_empty())
            .map(|route| route.times.iter().map(|stop| stop.arrival).collect())
            .collect()
    }

    /// Index of the route serving `node`.
    pub fn route_of(&self, node: usize) -> Option<usize> {
        self.routes
            .iter()
            .position(|route| route.customers().contains(&node))
    }

    /// Service start time of `node` in its current route.
    pub fn start_time_of(&self, node: usize) -> Option<f64> {
        let index = self.route_of(node)?;
        let route = &self.routes[index];
        let pos = route.position(node)?;
        route.times.get(pos).map(|stop| stop.start)
    }

    /// Remove `node` from the route serving it and re-evaluate that route.
    pub fn remove_node(&mut self, node: usize, problem: &Problem) -> bool {
        let Some(index) = self.route_of(node) else {
            return false;
        };
        let route = &mut self.routes[index];
        if let Some(pos) = route.customers().iter().position(|&n| n == node) {
            route.nodes.remove(pos + 1);
        }
        route.evaluate(problem);
        true
    }

    /// Replace the node sequence of route `index` and re-evaluate it.
    pub fn set_route(&mut self, index: usize, nodes: Vec<usize>, problem: &Problem) {
        let route = &mut self.routes[index];
        route.nodes = nodes;
        route.evaluate(problem);
    }

    /// Hash of the route sequences, used to recognise revisited solutions.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for route in &self.routes {
            route.nodes.hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        writeln!(f, "  Cost: {:.2}", self.total_cost)?;
        writeln!(f, "  Feasible: {}", self.feasible)?;
        writeln!(f, "  Routes: {}", self.routes.len())?;

        for (i, route) in self.routes.iter().enumerate() {
            writeln!(
                f,
                "  Route {}: {:?} (Load: {:.2}, Cost: {:.2})",
                i, route.nodes, route.load, route.cost
            )?;
        }

        Ok(())
    }
}

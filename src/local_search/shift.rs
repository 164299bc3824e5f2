//! Shift neighborhood: relocate one customer.

use crate::solution::{is_feasible_route, Solution};
use crate::utils::{random_indexes, Random};

use super::{LocalSearch, IMPROVEMENT_EPS};

impl<'a> LocalSearch<'a> {
    /// Move single customers to cheaper positions, first into other routes and
    /// then within their own route. Routes are visited in random order.
    pub fn shift(&self, solution: &mut Solution, rng: &mut Random) -> bool {
        let mut improved = false;

        for index in random_indexes(solution.routes.len(), rng) {
            improved |= self.shift_other(solution, index, rng);
            improved |= self.shift_same(solution, index);
        }

        solution.update(self.problem);
        improved
    }

    fn shift_other(&self, solution: &mut Solution, index: usize, rng: &mut Random) -> bool {
        let capacity = self.problem.vehicle_capacity;
        let mut improved = false;

        let mut k = 1;
        while k + 1 < solution.routes[index].nodes.len() {
            let route = &solution.routes[index];
            let node = route.nodes[k];
            let n1 = route.nodes[k - 1];
            let n2 = route.nodes[k + 1];
            let removal_gain = self.time(n1, node) + self.time(node, n2) - self.time(n1, n2);

            let mut inserted = false;
            for other in random_indexes(solution.routes.len(), rng) {
                let target = &solution.routes[other];
                if other == index || target.load + self.demand(node) > capacity {
                    continue;
                }

                let mut found = None;
                for j in 1..target.nodes.len() {
                    let m1 = target.nodes[j - 1];
                    let m2 = target.nodes[j];
                    let gain = removal_gain + self.time(m1, m2)
                        - self.time(m1, node)
                        - self.time(node, m2);
                    if gain <= IMPROVEMENT_EPS {
                        continue;
                    }

                    // Later positions only arrive later
                    if target.times[j - 1].departure + self.time(m1, node) > self.due(node) {
                        break;
                    }

                    let mut candidate = target.nodes.clone();
                    candidate.insert(j, node);
                    if is_feasible_route(&candidate, self.problem) {
                        found = Some(candidate);
                        break;
                    }
                }

                if let Some(candidate) = found {
                    solution.set_route(other, candidate, self.problem);
                    let mut source = solution.routes[index].nodes.clone();
                    source.remove(k);
                    solution.set_route(index, source, self.problem);
                    inserted = true;
                    improved = true;
                    break;
                }
            }

            if !inserted {
                k += 1;
            }
        }

        improved
    }

    fn shift_same(&self, solution: &mut Solution, index: usize) -> bool {
        if solution.routes[index].nodes.len() < 4 {
            return false;
        }
        let mut improved = false;

        let mut k = 1;
        while k + 1 < solution.routes[index].nodes.len() {
            let route = &solution.routes[index];
            let node = route.nodes[k];
            let n1 = route.nodes[k - 1];
            let n2 = route.nodes[k + 1];
            let removal_gain = self.time(n1, node) + self.time(node, n2) - self.time(n1, n2);

            let mut review = route.nodes.clone();
            review.remove(k);

            let mut moved = None;
            for j in 1..review.len() {
                let m1 = review[j - 1];
                let m2 = review[j];
                let gain =
                    removal_gain + self.time(m1, m2) - self.time(m1, node) - self.time(node, m2);
                if gain <= IMPROVEMENT_EPS {
                    continue;
                }

                let departure = if j - 1 < k {
                    route.times[j - 1].departure
                } else {
                    route.times[j].departure
                };
                if departure + self.time(m1, node) > self.due(node) {
                    break;
                }

                let mut candidate = review.clone();
                candidate.insert(j, node);
                if is_feasible_route(&candidate, self.problem) {
                    moved = Some((j, candidate));
                    break;
                }
            }

            match moved {
                Some((j, candidate)) => {
                    solution.set_route(index, candidate, self.problem);
                    improved = true;
                    // Moving forward leaves the next untried node at k
                    if j <= k {
                        k += 1;
                    }
                }
                None => k += 1,
            }
        }

        improved
    }
}

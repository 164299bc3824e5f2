//! Interchange neighborhood: swap one customer between two routes.

use crate::solution::{is_feasible_route, Solution};
use crate::utils::{random_indexes, Random};

use super::{LocalSearch, IMPROVEMENT_EPS};

impl<'a> LocalSearch<'a> {
    /// Swap customers between every pair of sampled routes while it shortens them.
    pub fn interchange(&self, solution: &mut Solution, rng: &mut Random) -> bool {
        let indexes = random_indexes(solution.routes.len(), rng);
        let mut improved = false;

        for (a, &first) in indexes.iter().enumerate() {
            for &second in &indexes[a + 1..] {
                while self.interchange_pair(solution, first, second) {
                    improved = true;
                }
            }
        }

        solution.update(self.problem);
        improved
    }

    fn interchange_pair(&self, solution: &mut Solution, index1: usize, index2: usize) -> bool {
        let capacity = self.problem.vehicle_capacity;
        let route1 = &solution.routes[index1];
        let route2 = &solution.routes[index2];
        let len1 = route1.nodes.len();
        let len2 = route2.nodes.len();

        if len1 < 3 || len2 < 3 {
            return false;
        }

        for i in 1..len1 - 1 {
            let a = route1.nodes[i];
            let (a_prev, a_next) = (route1.nodes[i - 1], route1.nodes[i + 1]);

            for j in 1..len2 - 1 {
                let b = route2.nodes[j];
                let (b_prev, b_next) = (route2.nodes[j - 1], route2.nodes[j + 1]);

                let load1 = route1.load - self.demand(a) + self.demand(b);
                let load2 = route2.load - self.demand(b) + self.demand(a);
                if load1 > capacity || load2 > capacity {
                    continue;
                }

                let time1 = route1.times[i - 1].departure + self.time(a_prev, b);
                let time2 = route2.times[j - 1].departure + self.time(b_prev, a);
                if time1 > self.due(b) || time2 > self.due(a) {
                    continue;
                }

                let org = self.time(a_prev, a)
                    + self.time(a, a_next)
                    + self.time(b_prev, b)
                    + self.time(b, b_next);
                let change = self.time(a_prev, b)
                    + self.time(b, a_next)
                    + self.time(b_prev, a)
                    + self.time(a, b_next);
                if org - change <= IMPROVEMENT_EPS {
                    continue;
                }

                let mut tmp1 = route1.nodes.clone();
                tmp1[i] = b;
                let mut tmp2 = route2.nodes.clone();
                tmp2[j] = a;

                if (!route1.feasible || is_feasible_route(&tmp1, self.problem))
                    && (!route2.feasible || is_feasible_route(&tmp2, self.problem))
                {
                    solution.set_route(index1, tmp1, self.problem);
                    solution.set_route(index2, tmp2, self.problem);
                    return true;
                }
            }
        }

        false
    }
}

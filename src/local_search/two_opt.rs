//! Intra-route 2-opt: reverse a segment of one route.

use crate::solution::{is_feasible_route, Solution};

use super::{splice, LocalSearch, IMPROVEMENT_EPS};

impl<'a> LocalSearch<'a> {
    /// Reverse segments of every route while doing so shortens it.
    pub fn two_opt(&self, solution: &mut Solution) -> bool {
        let mut improved = false;

        for index in 0..solution.routes.len() {
            while self.two_opt_route(solution, index) {
                improved = true;
            }
        }

        solution.update(self.problem);
        improved
    }

    fn two_opt_route(&self, solution: &mut Solution, index: usize) -> bool {
        let route = &solution.routes[index];
        let nodes = &route.nodes;
        let len = nodes.len();

        if len < 4 {
            return false;
        }

        for i in 1..len - 2 {
            for j in i + 1..len - 1 {
                // Prune on the first late arrival in the reversed segment
                if !self.reversal_in_time(nodes, route.times[i - 1].departure, i, j) {
                    break;
                }

                let org = self.time(nodes[i - 1], nodes[i]) + self.time(nodes[j], nodes[j + 1]);
                let change =
                    self.time(nodes[i - 1], nodes[j]) + self.time(nodes[i], nodes[j + 1]);
                if org - change <= IMPROVEMENT_EPS {
                    continue;
                }

                let mut reversed = nodes[i..=j].to_vec();
                reversed.reverse();
                let candidate = splice(&[&nodes[..i], &reversed, &nodes[j + 1..]]);

                if !route.feasible || is_feasible_route(&candidate, self.problem) {
                    solution.set_route(index, candidate, self.problem);
                    return true;
                }
            }
        }

        false
    }

    fn reversal_in_time(&self, nodes: &[usize], departure: f64, i: usize, j: usize) -> bool {
        let mut time = departure;
        let mut last = nodes[i - 1];

        for k in (i..=j).rev() {
            let node = &self.problem.nodes[nodes[k]];
            time += self.time(last, nodes[k]);
            if time > node.due_time {
                return false;
            }
            time = time.max(node.ready_time) + node.service_time;
            last = nodes[k];
        }

        true
    }
}

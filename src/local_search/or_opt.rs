//! Or-opt: move a short segment to a later position of the same route.

use crate::solution::{is_feasible_route, Solution};

use super::{splice, LocalSearch, IMPROVEMENT_EPS, OR_OPT_SEGMENT};

impl<'a> LocalSearch<'a> {
    /// Relocate a segment of one to three customers within each route, once per route.
    pub fn or_opt(&self, solution: &mut Solution) -> bool {
        let mut improved = false;

        for index in 0..solution.routes.len() {
            if let Some(candidate) = self.find_or_opt(&solution.routes[index].nodes) {
                solution.set_route(index, candidate, self.problem);
                improved = true;
            }
        }

        solution.update(self.problem);
        improved
    }

    fn find_or_opt(&self, route: &[usize]) -> Option<Vec<usize>> {
        let len = route.len();
        if len < 4 {
            return None;
        }

        // Segment route[i + 1..=j] is moved behind route[k]
        for i in 0..len - 3 {
            for j in i + 1..=(i + OR_OPT_SEGMENT).min(len - 3) {
                for k in j + 1..=len - 2 {
                    let (n1, n2, n3, n4) = (route[i], route[i + 1], route[j], route[j + 1]);
                    let (n5, n6) = (route[k], route[k + 1]);

                    let org = self.time(n1, n2) + self.time(n3, n4) + self.time(n5, n6);
                    let change = self.time(n1, n4) + self.time(n5, n2) + self.time(n3, n6);
                    if org - change <= IMPROVEMENT_EPS {
                        continue;
                    }

                    let candidate = splice(&[
                        &route[..=i],
                        &route[j + 1..=k],
                        &route[i + 1..=j],
                        &route[k + 1..],
                    ]);
                    if is_feasible_route(&candidate, self.problem) {
                        return Some(candidate);
                    }
                }
            }
        }

        None
    }
}

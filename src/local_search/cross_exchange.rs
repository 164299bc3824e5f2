//! Cross exchange: swap bounded segments between two routes.

use crate::solution::{is_feasible_route, Solution};
use crate::utils::{random_indexes, Random};

use super::{splice, LocalSearch, IMPROVEMENT_EPS};

impl<'a> LocalSearch<'a> {
    /// Swap segments of up to `len` customers between sampled routes.
    ///
    /// Each sampled route takes at most one exchange per call.
    pub fn cross_exchange(&self, solution: &mut Solution, len: usize, rng: &mut Random) -> bool {
        let mut improved = false;

        for index in random_indexes(solution.routes.len(), rng) {
            improved |= self.cross_exchange_route(solution, index, len, rng);
        }

        solution.update(self.problem);
        improved
    }

    fn cross_exchange_route(
        &self,
        solution: &mut Solution,
        index: usize,
        len: usize,
        rng: &mut Random,
    ) -> bool {
        if solution.routes[index].is_empty() || len == 0 {
            return false;
        }

        for other in random_indexes(solution.routes.len(), rng) {
            if other == index || solution.routes[other].is_empty() {
                continue;
            }
            if let Some((tmp1, tmp2)) = self.find_cross(solution, index, other, len) {
                solution.set_route(index, tmp1, self.problem);
                solution.set_route(other, tmp2, self.problem);
                return true;
            }
        }

        false
    }

    fn find_cross(
        &self,
        solution: &Solution,
        index1: usize,
        index2: usize,
        len: usize,
    ) -> Option<(Vec<usize>, Vec<usize>)> {
        let route1 = &solution.routes[index1];
        let route2 = &solution.routes[index2];
        let (r1, r2) = (&route1.nodes, &route2.nodes);

        // Segments r1[i1 + 1..=j1] and r2[i2 + 1..=j2], never touching the final depot
        for i1 in 0..r1.len() - 2 {
            for i2 in 0..r2.len() - 2 {
                for j1 in i1 + 1..(r1.len() - 1).min(i1 + 1 + len) {
                    for j2 in i2 + 1..(r2.len() - 1).min(i2 + 1 + len) {
                        let (w1, x1, y1, z1) = (r1[i1], r1[i1 + 1], r1[j1], r1[j1 + 1]);
                        let (w2, x2, y2, z2) = (r2[i2], r2[i2 + 1], r2[j2], r2[j2 + 1]);

                        let org = self.time(w1, x1)
                            + self.time(w2, x2)
                            + self.time(y1, z1)
                            + self.time(y2, z2);
                        let change = self.time(w1, x2)
                            + self.time(w2, x1)
                            + self.time(y1, z2)
                            + self.time(y2, z1);
                        if org - change <= IMPROVEMENT_EPS {
                            continue;
                        }

                        let tmp1 = splice(&[&r1[..=i1], &r2[i2 + 1..=j2], &r1[j1 + 1..]]);
                        let tmp2 = splice(&[&r2[..=i2], &r1[i1 + 1..=j1], &r2[j2 + 1..]]);

                        if (!route1.feasible || is_feasible_route(&tmp1, self.problem))
                            && (!route2.feasible || is_feasible_route(&tmp2, self.problem))
                        {
                            return Some((tmp1, tmp2));
                        }
                    }
                }
            }
        }

        None
    }
}

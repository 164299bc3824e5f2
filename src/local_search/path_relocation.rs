//! Path relocation: move a contiguous segment into another route.

use crate::solution::{is_feasible_route, Solution};
use crate::utils::{random_indexes, Random};

use super::{splice, LocalSearch, IMPROVEMENT_EPS};

impl<'a> LocalSearch<'a> {
    /// Move one segment from the first to the second route of each sampled pair.
    pub fn path_relocation(&self, solution: &mut Solution, rng: &mut Random) -> bool {
        let indexes = random_indexes(solution.routes.len(), rng);
        let mut improved = false;

        for (a, &first) in indexes.iter().enumerate() {
            for &second in &indexes[a + 1..] {
                if let Some((tmp1, tmp2)) = self.find_relocation(solution, first, second) {
                    solution.set_route(first, tmp1, self.problem);
                    solution.set_route(second, tmp2, self.problem);
                    improved = true;
                }
            }
        }

        solution.update(self.problem);
        improved
    }

    fn find_relocation(
        &self,
        solution: &Solution,
        index1: usize,
        index2: usize,
    ) -> Option<(Vec<usize>, Vec<usize>)> {
        let capacity = self.problem.vehicle_capacity;
        let route1 = &solution.routes[index1];
        let route2 = &solution.routes[index2];
        let (r1, r2) = (&route1.nodes, &route2.nodes);

        if r1.len() < 3 || r2.len() < 3 {
            return None;
        }

        // Segment r1[i + 1..=j] goes between r2[k] and r2[k + 1]
        for i in 0..r1.len() - 2 {
            let mut segment_load = 0.0;
            for j in i + 1..r1.len() - 1 {
                segment_load += self.demand(r1[j]);
                if segment_load + route2.load > capacity {
                    break;
                }

                let (n1, n2, n3, n4) = (r1[i], r1[i + 1], r1[j], r1[j + 1]);
                for k in 0..r2.len() - 1 {
                    let (n5, n6) = (r2[k], r2[k + 1]);

                    let org = self.time(n1, n2) + self.time(n3, n4) + self.time(n5, n6);
                    let change = self.time(n1, n4) + self.time(n5, n2) + self.time(n3, n6);
                    if org - change <= IMPROVEMENT_EPS {
                        continue;
                    }

                    let tmp2 = splice(&[&r2[..=k], &r1[i + 1..=j], &r2[k + 1..]]);
                    if !is_feasible_route(&tmp2, self.problem) {
                        continue;
                    }
                    let tmp1 = splice(&[&r1[..=i], &r1[j + 1..]]);
                    if route1.feasible && !is_feasible_route(&tmp1, self.problem) {
                        continue;
                    }

                    return Some((tmp1, tmp2));
                }
            }
        }

        None
    }
}

//! Inter-route 2-opt: exchange the tails of two routes.

use crate::solution::{is_feasible_route, Solution};
use crate::utils::{random_indexes, Random};

use super::{splice, LocalSearch, IMPROVEMENT_EPS};

impl<'a> LocalSearch<'a> {
    /// Exchange route tails between every pair of sampled routes while it pays off.
    pub fn two_opt_inter(&self, solution: &mut Solution, rng: &mut Random) -> bool {
        let indexes = random_indexes(solution.routes.len(), rng);
        let mut improved = false;

        for (a, &first) in indexes.iter().enumerate() {
            for &second in &indexes[a + 1..] {
                while self.two_opt_inter_pair(solution, first, second) {
                    improved = true;
                }
            }
        }

        solution.update(self.problem);
        improved
    }

    fn two_opt_inter_pair(&self, solution: &mut Solution, index1: usize, index2: usize) -> bool {
        let capacity = self.problem.vehicle_capacity;
        let route1 = &solution.routes[index1];
        let route2 = &solution.routes[index2];
        let (r1, r2) = (&route1.nodes, &route2.nodes);

        if r1.len() < 3 || r2.len() < 3 {
            return false;
        }

        let mut head1 = 0.0;
        for i in 0..r1.len() - 1 {
            head1 += self.demand(r1[i]);

            let mut head2 = 0.0;
            for j in 0..r2.len() - 1 {
                head2 += self.demand(r2[j]);

                let load1 = head1 + route2.load - head2;
                let load2 = head2 + route1.load - head1;
                if load1 > capacity || load2 > capacity {
                    continue;
                }

                let time1 = route1.times[i].departure + self.time(r1[i], r2[j + 1]);
                let time2 = route2.times[j].departure + self.time(r2[j], r1[i + 1]);
                if time1 > self.due(r2[j + 1]) || time2 > self.due(r1[i + 1]) {
                    continue;
                }

                let org = self.time(r1[i], r1[i + 1]) + self.time(r2[j], r2[j + 1]);
                let change = self.time(r1[i], r2[j + 1]) + self.time(r2[j], r1[i + 1]);
                if org - change <= IMPROVEMENT_EPS {
                    continue;
                }

                let tmp1 = splice(&[&r1[..=i], &r2[j + 1..]]);
                let tmp2 = splice(&[&r2[..=j], &r1[i + 1..]]);

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

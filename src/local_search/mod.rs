//! Route improvement operators.
//!
//! Every operator scans a solution for moves that strictly reduce travel time,
//! applies them in place, and finishes with [`Solution::update`] so that the
//! cached costs come from a full recomputation.

pub mod cross_exchange;
pub mod interchange;
pub mod or_opt;
pub mod path_relocation;
pub mod shift;
pub mod two_opt;
pub mod two_opt_inter;

use crate::problem::Problem;
use crate::solution::Solution;
use crate::utils::Random;

/// Minimum travel-time gain for a move to count as an improvement.
pub const IMPROVEMENT_EPS: f64 = 1e-6;

/// Default maximum segment length exchanged by [`LocalSearch::cross_exchange`].
pub const CROSS_EXCHANGE_LENGTH: usize = 7;

/// Longest segment moved by [`LocalSearch::or_opt`].
pub const OR_OPT_SEGMENT: usize = 3;

/// Applies improvement operators to solutions of one problem instance.
pub struct LocalSearch<'a> {
    problem: &'a Problem,
}

impl<'a> LocalSearch<'a> {
    /// Create a local search bound to a problem instance.
    pub fn new(problem: &'a Problem) -> Self {
        LocalSearch { problem }
    }

    /// The instance the operators work on.
    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Apply every operator once, in catalog order.
    pub fn educate(&self, solution: &mut Solution, rng: &mut Random) {
        self.shift(solution, rng);
        self.interchange(solution, rng);
        self.two_opt(solution);
        self.cross_exchange(solution, CROSS_EXCHANGE_LENGTH, rng);
        self.two_opt_inter(solution, rng);
        self.path_relocation(solution, rng);
        self.or_opt(solution);
    }

    #[inline]
    pub(crate) fn time(&self, from: usize, to: usize) -> f64 {
        self.problem.get_time(from, to)
    }

    #[inline]
    pub(crate) fn due(&self, node: usize) -> f64 {
        self.problem.nodes[node].due_time
    }

    #[inline]
    pub(crate) fn demand(&self, node: usize) -> f64 {
        self.problem.nodes[node].demand
    }
}

/// Concatenate slices into a new route.
pub(crate) fn splice(parts: &[&[usize]]) -> Vec<usize> {
    let mut route = Vec::with_capacity(parts.iter().map(|part| part.len()).sum());
    for part in parts {
        route.extend_from_slice(part);
    }
    route
}

//! Bayesian counting of successful transitions.

use super::{cumulative_pick, Outcome, SelectionStrategy};
use crate::utils::Random;
use itertools::Itertools;
use rand::Rng;

/// Laplace-initialised success counts, sampled proportionally.
///
/// With `all` set, every improvement over the current solution is rewarded;
/// otherwise only new global bests are.
#[derive(Debug, Clone)]
pub struct KheiriCounts {
    arms: usize,
    all: bool,
    counts: Vec<Vec<f64>>,
    apply_counts: Vec<[f64; 2]>,
}

impl KheiriCounts {
    pub fn new(arms: usize, all: bool) -> Self {
        let arms = arms.max(1);
        KheiriCounts {
            arms,
            all,
            counts: vec![vec![1.0; arms]; arms],
            apply_counts: vec![[1.0; 2]; arms],
        }
    }

    /// Count of successful moves from `from` to `to`.
    pub fn count(&self, from: usize, to: usize) -> f64 {
        self.counts[from][to]
    }
}

impl SelectionStrategy for KheiriCounts {
    fn name(&self, delta: f64) -> String {
        let base = if self.all {
            "KheiriHyperAll"
        } else {
            "KheiriHyper"
        };
        format!("{}[{}]", base, delta)
    }

    fn select_next(&self, last: usize, rng: &mut Random) -> usize {
        let unif: f64 = rng.gen();
        let row = &self.counts[last];
        cumulative_pick(row, row.iter().sum(), unif)
    }

    fn decide_apply(&self, next: usize, rng: &mut Random) -> bool {
        let unif: f64 = rng.gen();
        let row = &self.apply_counts[next];
        cumulative_pick(row, row.iter().sum(), unif) == 1
    }

    fn on_outcome(&mut self, sequence: &[usize], outcome: Outcome) {
        let rewarded = if self.all {
            outcome.improved_current
        } else {
            outcome.new_best
        };
        if !rewarded {
            return;
        }

        for (a, b) in sequence.iter().copied().tuple_windows() {
            self.counts[a][b] += 1.0;
            self.apply_counts[a][0] += 1.0;
        }
        if let Some(&last) = sequence.last() {
            self.apply_counts[last][1] += 1.0;
        }
    }

    fn transitions(&self, _rng: &mut Random) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|row| {
                let total: f64 = row.iter().sum();
                row.iter().map(|&c| c / total).collect()
            })
            .collect()
    }

    fn apply_probabilities(&self, _rng: &mut Random) -> Vec<f64> {
        self.apply_counts
            .iter()
            .take(self.arms)
            .map(|[keep, apply]| apply / (keep + apply))
            .collect()
    }
}

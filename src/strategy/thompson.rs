//! Thompson sampling over Beta-Bernoulli arms.

use super::{Outcome, SelectionStrategy, SIMULATION_DRAWS};
use crate::utils::Random;
use itertools::Itertools;
use rand_distr::{Beta, Distribution};

/// Every transition and every apply decision is an independent Beta-Bernoulli arm.
///
/// Trials count every executed use; successes count uses in sequences that
/// improved on the current solution.
#[derive(Debug, Clone)]
pub struct ThompsonSampling {
    arms: usize,
    record: bool,
    trials: Vec<Vec<f64>>,
    successes: Vec<Vec<f64>>,
    apply_trials: Vec<f64>,
    apply_successes: Vec<f64>,
}

/// Sample `Beta(successes, max(trials - successes, 1))`; degenerate shapes give 0.5.
fn sample_beta(successes: f64, trials: f64, rng: &mut Random) -> f64 {
    let failures = (trials - successes).max(1.0);
    Beta::new(successes.max(f64::MIN_POSITIVE), failures)
        .map(|beta| beta.sample(rng))
        .unwrap_or(0.5)
}

impl ThompsonSampling {
    pub fn new(arms: usize, record: bool) -> Self {
        let arms = arms.max(1);
        ThompsonSampling {
            arms,
            record,
            trials: vec![vec![2.0; arms]; arms],
            successes: vec![vec![1.0; arms]; arms],
            apply_trials: vec![2.0; arms],
            apply_successes: vec![1.0; arms],
        }
    }

    fn sample_row(&self, last: usize, rng: &mut Random) -> usize {
        let mut next = 0;
        let mut max = f64::MIN;
        for j in 0..self.arms {
            let theta = sample_beta(self.successes[last][j], self.trials[last][j], rng);
            if theta > max {
                max = theta;
                next = j;
            }
        }
        next
    }

    fn sample_apply(&self, next: usize, rng: &mut Random) -> bool {
        let trials = self.apply_trials[next];
        let successes = self.apply_successes[next];
        let keep = sample_beta(trials - successes, trials, rng);
        let apply = sample_beta(successes, trials, rng);
        keep < apply
    }
}

impl SelectionStrategy for ThompsonSampling {
    fn name(&self, delta: f64) -> String {
        let base = if self.record {
            "ThompsonHyperRecord"
        } else {
            "ThompsonHyper"
        };
        format!("{}[{}]", base, delta)
    }

    fn select_next(&self, last: usize, rng: &mut Random) -> usize {
        self.sample_row(last, rng)
    }

    fn decide_apply(&self, next: usize, rng: &mut Random) -> bool {
        self.sample_apply(next, rng)
    }

    fn on_outcome(&mut self, sequence: &[usize], outcome: Outcome) {
        for (a, b) in sequence.iter().copied().tuple_windows() {
            self.trials[a][b] += 1.0;
            if outcome.improved_current {
                self.successes[a][b] += 1.0;
            }
        }
        for &index in sequence {
            self.apply_trials[index] += 1.0;
        }
        if outcome.improved_current {
            if let Some(&last) = sequence.last() {
                self.apply_successes[last] += 1.0;
            }
        }
    }

    /// Monte Carlo estimate of the argmax frequencies of every row.
    fn transitions(&self, rng: &mut Random) -> Vec<Vec<f64>> {
        (0..self.arms)
            .map(|i| {
                let mut hits = vec![0usize; self.arms];
                for _ in 0..SIMULATION_DRAWS {
                    hits[self.sample_row(i, rng)] += 1;
                }
                hits.into_iter()
                    .map(|h| h as f64 / SIMULATION_DRAWS as f64)
                    .collect()
            })
            .collect()
    }

    fn apply_probabilities(&self, rng: &mut Random) -> Vec<f64> {
        (0..self.arms)
            .map(|i| {
                let hits = (0..SIMULATION_DRAWS)
                    .filter(|_| self.sample_apply(i, rng))
                    .count();
                hits as f64 / SIMULATION_DRAWS as f64
            })
            .collect()
    }
}

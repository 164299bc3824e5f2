//! Exponential weights over arm transitions and apply decisions.

use super::{cumulative_pick, Outcome, SelectionStrategy};
use crate::utils::Random;
use itertools::Itertools;
use rand::Rng;

/// Hedge-style learner with probability floors.
///
/// `losses[i][j]` is the accumulated loss of moving from arm `i` to arm `j`;
/// `apply_losses[i]` holds the losses of continuing (`0`) and executing (`1`)
/// after arm `i`. Losses only ever decrease, by the importance weight of the
/// traversed choice, when a sequence improves on the current solution.
#[derive(Debug, Clone)]
pub struct ExpoWeights {
    arms: usize,
    eta: f64,
    alpha: f64,
    beta: f64,
    record: bool,
    losses: Vec<Vec<f64>>,
    apply_losses: Vec<[f64; 2]>,
}

impl ExpoWeights {
    /// `alpha` is capped at `1 / arms` so the floors can always be met.
    pub fn new(arms: usize, eta: f64, alpha: f64, beta: f64, record: bool) -> Self {
        let arms = arms.max(1);
        ExpoWeights {
            arms,
            eta,
            alpha: alpha.clamp(0.0, 1.0 / arms as f64),
            beta,
            record,
            losses: vec![vec![0.0; arms]; arms],
            apply_losses: vec![[0.0; 2]; arms],
        }
    }

    fn weight(&self, loss: f64) -> f64 {
        (-self.eta * loss).exp().min(f64::MAX / self.arms as f64)
    }

    /// Selection distribution of the arm following `index`.
    ///
    /// Arms whose share would fall below `alpha` are pinned to `alpha` and the
    /// remaining mass is spread over the others in proportion to their weights,
    /// repeating until no further arm drops below the floor.
    pub fn probability(&self, index: usize) -> Vec<f64> {
        let weights: Vec<f64> = self.losses[index].iter().map(|&l| self.weight(l)).collect();
        let mut floored = vec![false; self.arms];
        let mut count = 0;

        loop {
            let total: f64 = (0..self.arms).filter(|&i| !floored[i]).map(|i| weights[i]).sum();
            let mass = 1.0 - self.alpha * count as f64;

            let mut changed = false;
            for i in 0..self.arms {
                if !floored[i] && weights[i] / total * mass < self.alpha {
                    floored[i] = true;
                    count += 1;
                    changed = true;
                }
            }

            if !changed {
                break;
            }
            if count == self.arms {
                return vec![1.0 / self.arms as f64; self.arms];
            }
        }

        let total: f64 = (0..self.arms).filter(|&i| !floored[i]).map(|i| weights[i]).sum();
        let mass = 1.0 - self.alpha * count as f64;
        (0..self.arms)
            .map(|i| {
                if floored[i] {
                    self.alpha
                } else {
                    weights[i] / total * mass
                }
            })
            .collect()
    }

    /// Probability of executing the sequence right after `index`, within `[beta, 1 - beta]`.
    pub fn accept(&self, index: usize) -> f64 {
        let [continue_loss, apply_loss] = self.apply_losses[index];
        let keep = self.weight(continue_loss);
        let apply = self.weight(apply_loss);
        (apply / (keep + apply)).clamp(self.beta, 1.0 - self.beta)
    }
}

impl SelectionStrategy for ExpoWeights {
    fn name(&self, delta: f64) -> String {
        let base = if self.record {
            "ExpoHyperRecord"
        } else {
            "ExpoHyper"
        };
        format!("{}[{},{}]", base, self.eta, delta)
    }

    fn select_next(&self, last: usize, rng: &mut Random) -> usize {
        let unif: f64 = rng.gen();
        cumulative_pick(&self.probability(last), 1.0, unif)
    }

    fn decide_apply(&self, next: usize, rng: &mut Random) -> bool {
        let unif: f64 = rng.gen();
        unif < self.accept(next)
    }

    fn on_outcome(&mut self, sequence: &[usize], outcome: Outcome) {
        if !outcome.improved_current {
            return;
        }

        // Probabilities are read after each preceding update
        for (a, b) in sequence.iter().copied().tuple_windows() {
            let probability = self.probability(a)[b];
            self.losses[a][b] -= 1.0 / probability;
            let keep = 1.0 - self.accept(a);
            self.apply_losses[a][0] -= 1.0 / keep;
        }

        if let Some(&last) = sequence.last() {
            let apply = self.accept(last);
            self.apply_losses[last][1] -= 1.0 / apply;
        }
    }

    fn transitions(&self, _rng: &mut Random) -> Vec<Vec<f64>> {
        (0..self.arms).map(|i| self.probability(i)).collect()
    }

    fn apply_probabilities(&self, _rng: &mut Random) -> Vec<f64> {
        (0..self.arms).map(|i| self.accept(i)).collect()
    }
}

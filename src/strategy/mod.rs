//! Sequence-based operator selection strategies.
//!
//! A strategy picks the next arm given the previous one, decides after each
//! pick whether the pending sequence is executed, and learns from the outcome
//! of executed sequences.

pub mod expo;
pub mod kheiri;
pub mod thompson;

pub use self::expo::ExpoWeights;
pub use self::kheiri::KheiriCounts;
pub use self::thompson::ThompsonSampling;

use crate::config::{Config, Variant};
use crate::utils::Random;

/// Number of simulated draws used to estimate sampled probabilities.
pub const SIMULATION_DRAWS: usize = 1000;

/// What happened to an executed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    /// The candidate was strictly cheaper than the current solution
    pub improved_current: bool,
    /// The candidate was strictly cheaper than the best solution
    pub new_best: bool,
}

/// Interface shared by the learning strategies.
pub trait SelectionStrategy {
    /// Name with parameters, as shown in transcripts.
    fn name(&self, delta: f64) -> String;

    /// Choose the arm following `last`.
    fn select_next(&self, last: usize, rng: &mut Random) -> usize;

    /// Whether the sequence ending with `next` is executed now.
    fn decide_apply(&self, next: usize, rng: &mut Random) -> bool;

    /// Learn from an executed, non-empty sequence.
    fn on_outcome(&mut self, sequence: &[usize], outcome: Outcome);

    /// Row-stochastic matrix of arm-to-arm selection probabilities.
    fn transitions(&self, rng: &mut Random) -> Vec<Vec<f64>>;

    /// Probability of executing the sequence after each arm.
    fn apply_probabilities(&self, rng: &mut Random) -> Vec<f64>;
}

/// The strategy of a sequence-based run.
#[derive(Debug, Clone)]
pub enum Strategy {
    Expo(ExpoWeights),
    Kheiri(KheiriCounts),
    Thompson(ThompsonSampling),
}

impl Strategy {
    /// Build the strategy a variant asks for over `arms` arms.
    ///
    /// Returns `None` for the adaptive large neighbourhood variants, which do
    /// not select sequences.
    pub fn for_variant(config: &Config, arms: usize) -> Option<Self> {
        let strategy = match config.variant {
            Variant::ExpoHyper | Variant::ExpoHyperRecord => Strategy::Expo(ExpoWeights::new(
                arms,
                config.eta,
                config.alpha,
                config.beta,
                config.variant == Variant::ExpoHyperRecord,
            )),
            Variant::KheiriHyper => Strategy::Kheiri(KheiriCounts::new(arms, false)),
            Variant::KheiriHyperAll => Strategy::Kheiri(KheiriCounts::new(arms, true)),
            Variant::ThompsonHyper => Strategy::Thompson(ThompsonSampling::new(arms, false)),
            Variant::ThompsonHyperRecord => Strategy::Thompson(ThompsonSampling::new(arms, true)),
            Variant::Alns | Variant::AlnsImproved => return None,
        };
        Some(strategy)
    }
}

impl SelectionStrategy for Strategy {
    fn name(&self, delta: f64) -> String {
        match self {
            Strategy::Expo(s) => s.name(delta),
            Strategy::Kheiri(s) => s.name(delta),
            Strategy::Thompson(s) => s.name(delta),
        }
    }

    fn select_next(&self, last: usize, rng: &mut Random) -> usize {
        match self {
            Strategy::Expo(s) => s.select_next(last, rng),
            Strategy::Kheiri(s) => s.select_next(last, rng),
            Strategy::Thompson(s) => s.select_next(last, rng),
        }
    }

    fn decide_apply(&self, next: usize, rng: &mut Random) -> bool {
        match self {
            Strategy::Expo(s) => s.decide_apply(next, rng),
            Strategy::Kheiri(s) => s.decide_apply(next, rng),
            Strategy::Thompson(s) => s.decide_apply(next, rng),
        }
    }

    fn on_outcome(&mut self, sequence: &[usize], outcome: Outcome) {
        match self {
            Strategy::Expo(s) => s.on_outcome(sequence, outcome),
            Strategy::Kheiri(s) => s.on_outcome(sequence, outcome),
            Strategy::Thompson(s) => s.on_outcome(sequence, outcome),
        }
    }

    fn transitions(&self, rng: &mut Random) -> Vec<Vec<f64>> {
        match self {
            Strategy::Expo(s) => s.transitions(rng),
            Strategy::Kheiri(s) => s.transitions(rng),
            Strategy::Thompson(s) => s.transitions(rng),
        }
    }

    fn apply_probabilities(&self, rng: &mut Random) -> Vec<f64> {
        match self {
            Strategy::Expo(s) => s.apply_probabilities(rng),
            Strategy::Kheiri(s) => s.apply_probabilities(rng),
            Strategy::Thompson(s) => s.apply_probabilities(rng),
        }
    }
}

/// Draw an index from `weights` by cumulative sum against `unif`, falling back to the last index.
pub(crate) fn cumulative_pick(weights: &[f64], total: f64, unif: f64) -> usize {
    let mut acum = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        acum += weight;
        if acum / total > unif {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

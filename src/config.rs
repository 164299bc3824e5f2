//! Configuration parameters for the hyper-heuristic solvers.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Selects the operator-selection strategy and acceptance rule of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Exponential weights with the decaying record-to-record criterion.
    #[default]
    ExpoHyper,
    /// Exponential weights with a constant record threshold.
    ExpoHyperRecord,
    /// Bayesian counting, reinforced on new global bests.
    KheiriHyper,
    /// Bayesian counting, reinforced on every improvement over current.
    KheiriHyperAll,
    /// Beta-Bernoulli Thompson sampling.
    ThompsonHyper,
    /// Thompson sampling with a constant record threshold.
    ThompsonHyperRecord,
    /// Adaptive large neighbourhood search (destroy + repair).
    Alns,
    /// ALNS followed by an adaptively chosen improvement operator.
    AlnsImproved,
}

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::ExpoHyper,
        Variant::ExpoHyperRecord,
        Variant::KheiriHyper,
        Variant::KheiriHyperAll,
        Variant::ThompsonHyper,
        Variant::ThompsonHyperRecord,
        Variant::Alns,
        Variant::AlnsImproved,
    ];

    /// Name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::ExpoHyper => "expo",
            Variant::ExpoHyperRecord => "expo-record",
            Variant::KheiriHyper => "kheiri",
            Variant::KheiriHyperAll => "kheiri-all",
            Variant::ThompsonHyper => "thompson",
            Variant::ThompsonHyperRecord => "thompson-record",
            Variant::Alns => "alns",
            Variant::AlnsImproved => "alns-improved",
        }
    }

    /// Whether the variant runs the adaptive large neighbourhood search loop.
    pub fn is_alns(&self) -> bool {
        matches!(self, Variant::Alns | Variant::AlnsImproved)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .iter()
            .copied()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Variant::ALL.iter().map(|v| v.as_str()).collect();
                format!("unknown variant '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Configuration settings for a single solver run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Strategy and acceptance rule
    pub variant: Variant,
    /// Acceptance tolerance (δ)
    pub delta: f64,
    /// Learning rate of the exponential weights (η)
    pub eta: f64,
    /// Lower bound of every transition probability (α)
    pub alpha: f64,
    /// Bounds [β, 1 − β] of the apply probability
    pub beta: f64,
    /// Wall-clock budget
    pub time_limit: Option<Duration>,
    /// Maximum number of applied sequences
    pub iteration_limit: Option<u64>,
    /// Longest sequence accumulated before it is forcibly applied
    pub max_sequence_length: usize,
    /// Seed of the pseudo-random stream
    pub seed: u64,
    /// Echo the run transcript through the logger
    pub verbose: bool,
    /// Append the probing operators (no-op, route dissolvers, bare shift)
    pub diagnostic_operators: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            variant: Variant::ExpoHyper,
            delta: 0.01,
            eta: 0.5,
            alpha: 0.01,
            beta: 0.1,
            time_limit: Some(Duration::from_secs(90)),
            iteration_limit: None,
            max_sequence_length: 25,
            seed: 0,
            verbose: false,
            diagnostic_operators: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the strategy variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the acceptance tolerance.
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Set the learning rate of the exponential weights.
    pub fn with_eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    /// Set the transition probability floor.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the apply probability floor.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Remove the time limit; the iteration limit alone ends the run.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit = None;
        self
    }

    /// Set the maximum number of applied sequences.
    pub fn with_iteration_limit(mut self, iterations: u64) -> Self {
        self.iteration_limit = Some(iterations);
        self
    }

    /// Set the hard cap on sequence length.
    pub fn with_max_sequence_length(mut self, length: usize) -> Self {
        self.max_sequence_length = length.max(1);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Toggle transcript echoing.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Toggle the diagnostic operator catalog.
    pub fn with_diagnostic_operators(mut self, diagnostic: bool) -> Self {
        self.diagnostic_operators = diagnostic;
        self
    }

    /// Check that the run is bounded and the numeric parameters are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit.is_none() && self.iteration_limit.is_none() {
            return Err(ConfigError::Unbounded);
        }
        if self.time_limit.is_some_and(|limit| limit.is_zero()) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if !(0.0..0.5).contains(&self.beta) {
            return Err(ConfigError::Beta(self.beta));
        }
        if self.alpha < 0.0 || self.eta < 0.0 || self.delta < 0.0 {
            return Err(ConfigError::Negative);
        }
        Ok(())
    }
}

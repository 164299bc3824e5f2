//! Acceptance criteria deciding whether a candidate replaces the current solution.

use crate::utils::Random;
use rand::Rng;

/// Tolerance while the best solution is still infeasible.
const INFEASIBLE_TOLERANCE: f64 = 1e-3;
/// Tolerance left once the budget is used up.
const FINAL_TOLERANCE: f64 = 1e-5;
/// Probability of accepting a 0.05% worse candidate at the start temperature.
const START_ACCEPTANCE: f64 = 0.5;
const START_WORSENING: f64 = 0.0005;
/// Geometric cooling factor applied after every iteration.
pub const COOLING_RATE: f64 = 0.99975;

/// Acceptance rule of a run.
#[derive(Debug, Clone)]
pub enum Acceptor {
    /// Accept within `(1 + rho) * best`, with `rho` shrinking linearly over the budget.
    RecordToRecord { delta: f64 },
    /// Accept within `(1 + delta) * best`.
    Record { delta: f64 },
    /// Metropolis acceptance against the best cost with geometric cooling.
    SimulatedAnnealing { temperature: f64, cooling: f64 },
}

impl Acceptor {
    /// Annealing whose start temperature accepts a 0.05% worsening of `best_cost` half of the time.
    pub fn annealing(best_cost: f64) -> Self {
        Acceptor::SimulatedAnnealing {
            temperature: -best_cost * START_WORSENING / START_ACCEPTANCE.ln(),
            cooling: COOLING_RATE,
        }
    }

    /// Decide whether `candidate` is accepted.
    ///
    /// `progress` is the consumed share of the budget in `[0, 1]`.
    pub fn accept(
        &self,
        candidate: f64,
        best: f64,
        best_feasible: bool,
        progress: f64,
        rng: &mut Random,
    ) -> bool {
        match *self {
            Acceptor::RecordToRecord { delta } => {
                let rho = if best_feasible {
                    FINAL_TOLERANCE + delta * (1.0 - progress.clamp(0.0, 1.0))
                } else {
                    INFEASIBLE_TOLERANCE
                };
                candidate < (1.0 + rho) * best
            }
            Acceptor::Record { delta } => candidate < (1.0 + delta) * best,
            Acceptor::SimulatedAnnealing { temperature, .. } => {
                if temperature <= 0.0 {
                    return candidate < best;
                }
                let probability = (-(candidate - best) / temperature).exp();
                rng.gen::<f64>() < probability
            }
        }
    }

    /// Advance the temperature schedule; other rules are static.
    pub fn cool(&mut self) {
        if let Acceptor::SimulatedAnnealing {
            temperature,
            cooling,
        } = self
        {
            *temperature *= *cooling;
        }
    }

    /// Current temperature, if annealing.
    pub fn temperature(&self) -> Option<f64> {
        match self {
            Acceptor::SimulatedAnnealing { temperature, .. } => Some(*temperature),
            _ => None,
        }
    }
}

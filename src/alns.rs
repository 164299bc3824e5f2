//! Adaptive large neighbourhood search baseline.
//!
//! Every iteration draws one removal and one insertion operator (and, in the
//! improved variant, one local search) by roulette over adaptive weights, and
//! judges the result with simulated annealing against the best cost.

use crate::acceptor::Acceptor;
use crate::catalog::{improvements, insertions, removals, Improvement, Insertion, Removal};
use crate::config::Config;
use crate::error::ConfigError;
use crate::problem::Problem;
use crate::report::{RunReport, Transcript};
use crate::savings::savings_method;
use crate::utils::{format_duration, roulette, seeded, Random};
use log::{debug, info};
use std::collections::HashSet;
use std::time::Instant;

/// Score of a new global best, a novel improvement over current and a novel accepted worsening.
pub const SIGMA: [f64; 3] = [33.0, 9.0, 13.0];
/// Reaction factor of the weight refresh.
pub const REACTION: f64 = 0.1;
/// Iterations between two weight refreshes.
pub const SEGMENT: u64 = 100;

/// Adaptive weights of one operator family.
#[derive(Debug, Clone)]
pub struct OperatorWeights {
    weights: Vec<f64>,
    usage: Vec<u32>,
    scores: Vec<f64>,
}

impl OperatorWeights {
    /// Uniform weights over `count` operators.
    pub fn uniform(count: usize) -> Self {
        OperatorWeights {
            weights: vec![1.0 / count as f64; count],
            usage: vec![0; count],
            scores: vec![0.0; count],
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn draw(&self, rng: &mut Random) -> usize {
        roulette(&self.weights, rng)
    }

    /// Count one use of `index`, crediting `score` if any.
    pub fn record(&mut self, index: usize, score: Option<f64>) {
        self.usage[index] += 1;
        if let Some(score) = score {
            self.scores[index] += score;
        }
    }

    /// Blend the segment's mean scores into the weights, normalise and start a new segment.
    ///
    /// Unused operators keep their weight before normalisation.
    pub fn refresh(&mut self) {
        for i in 0..self.weights.len() {
            let value = if self.usage[i] > 0 {
                self.scores[i] / self.usage[i] as f64
            } else {
                self.weights[i]
            };
            self.weights[i] = (1.0 - REACTION) * self.weights[i] + REACTION * value;
        }
        let total: f64 = self.weights.iter().sum();
        if total > 0.0 {
            self.weights.iter_mut().for_each(|w| *w /= total);
        }
        self.usage.iter_mut().for_each(|u| *u = 0);
        self.scores.iter_mut().for_each(|s| *s = 0.0);
    }
}

/// Operators drawn in one iteration.
#[derive(Debug, Clone, Copy)]
struct Draw {
    removal: usize,
    insertion: usize,
    improvement: Option<usize>,
}

impl Draw {
    fn indexes(&self) -> Vec<usize> {
        let mut indexes = vec![self.removal, self.insertion];
        indexes.extend(self.improvement);
        indexes
    }
}

/// The adaptive large neighbourhood search driver.
pub struct AdaptiveSearch<'a> {
    problem: &'a Problem,
    config: Config,
    improved: bool,
    removals: Vec<Removal>,
    insertions: Vec<Insertion>,
    improvements: Vec<Improvement>,
    removal_weights: OperatorWeights,
    insertion_weights: OperatorWeights,
    improvement_weights: OperatorWeights,
    rng: Random,
    transcript: Transcript,
}

impl<'a> AdaptiveSearch<'a> {
    /// `improved` appends an adaptively chosen local search to every destroy and repair step.
    pub fn new(problem: &'a Problem, config: Config, improved: bool) -> Result<Self, ConfigError> {
        config.validate()?;
        let removals = removals();
        let insertions = insertions();
        let improvements = if improved { improvements() } else { Vec::new() };
        Ok(AdaptiveSearch {
            problem,
            improved,
            removal_weights: OperatorWeights::uniform(removals.len()),
            insertion_weights: OperatorWeights::uniform(insertions.len()),
            improvement_weights: OperatorWeights::uniform(improvements.len().max(1)),
            removals,
            insertions,
            improvements,
            rng: seeded(config.seed),
            transcript: Transcript::new(config.verbose),
            config,
        })
    }

    pub fn name(&self) -> &'static str {
        if self.improved {
            "AdaptiveImproved"
        } else {
            "ALNS"
        }
    }

    /// Run until the time or iteration budget is spent and report the best solution.
    pub fn run(mut self) -> RunReport {
        let start = Instant::now();
        let problem = self.problem;
        let name = self.name().to_string();
        info!("{}: {} customers", name, problem.get_customer_count());
        self.transcript.header(problem, &name, None);

        let mut best = savings_method(problem, &mut self.rng);
        let mut current = best.clone();
        let mut acceptor = Acceptor::annealing(best.total_cost);
        let mut visited: HashSet<u64> = HashSet::new();
        visited.insert(current.fingerprint());
        let mut iterations: u64 = 0;

        while !self.should_terminate(start, iterations) {
            iterations += 1;

            let mut candidate = current.clone();
            let draw = Draw {
                removal: self.removal_weights.draw(&mut self.rng),
                insertion: self.insertion_weights.draw(&mut self.rng),
                improvement: if self.improved {
                    Some(self.improvement_weights.draw(&mut self.rng))
                } else {
                    None
                },
            };

            let removed = self.removals[draw.removal].apply(&mut candidate, problem, &mut self.rng);
            self.insertions[draw.insertion].apply(&mut candidate, problem, removed, &mut self.rng);
            if let Some(index) = draw.improvement {
                self.improvements[index].apply(&mut candidate, problem, &mut self.rng);
            }

            let candidate_cost = candidate.total_cost;
            let fingerprint = candidate.fingerprint();
            let novel = !visited.contains(&fingerprint);
            let mut score = None;

            if candidate.total_cost < best.total_cost {
                debug!(
                    "new best {:.2} after {} iterations",
                    candidate.total_cost, iterations
                );
                best = candidate.clone();
                score = Some(SIGMA[0]);
                visited.insert(fingerprint);
                current = candidate;
            } else if candidate.total_cost < current.total_cost {
                if novel {
                    score = Some(SIGMA[1]);
                }
                visited.insert(fingerprint);
                current = candidate;
            } else if acceptor.accept(
                candidate.total_cost,
                best.total_cost,
                best.feasible,
                0.0,
                &mut self.rng,
            ) {
                if novel {
                    score = Some(SIGMA[2]);
                }
                visited.insert(fingerprint);
                current = candidate;
            }

            self.removal_weights.record(draw.removal, score);
            self.insertion_weights.record(draw.insertion, score);
            if let Some(index) = draw.improvement {
                self.improvement_weights.record(index, score);
            }

            self.transcript.row(
                start.elapsed().as_secs_f64(),
                iterations,
                best.total_cost,
                current.total_cost,
                candidate_cost,
                &draw.indexes(),
            );

            acceptor.cool();

            if iterations % SEGMENT == 0 {
                self.removal_weights.refresh();
                self.insertion_weights.refresh();
                if self.improved {
                    self.improvement_weights.refresh();
                }
            }
        }

        let elapsed = start.elapsed();
        self.transcript.footer(&best, elapsed.as_secs_f64());
        info!(
            "{} finished in {}: cost {:.2}, feasible {}, {} iterations",
            name,
            format_duration(elapsed),
            best.total_cost,
            best.feasible,
            iterations
        );

        let transitions = self.transitions();
        RunReport::new(
            name,
            &best,
            elapsed.as_secs_f64(),
            iterations,
            self.transcript.into_text(),
            transitions,
            Vec::new(),
        )
    }

    /// Current weights: removal row, insertion row and, when improved, the local search row.
    pub fn transitions(&self) -> Vec<Vec<f64>> {
        let round = |w: &f64| (w * 1e10).round() / 1e10;
        let mut rows = vec![
            self.removal_weights.weights().iter().map(round).collect(),
            self.insertion_weights.weights().iter().map(round).collect(),
        ];
        if self.improved {
            rows.push(self.improvement_weights.weights().iter().map(round).collect());
        }
        rows
    }

    fn should_terminate(&self, start: Instant, iterations: u64) -> bool {
        if let Some(limit) = self.config.iteration_limit {
            if iterations >= limit {
                return true;
            }
        }
        if let Some(limit) = self.config.time_limit {
            if start.elapsed() >= limit {
                return true;
            }
        }
        false
    }
}

//! Sequence-based multi-armed hyper-heuristic.
//!
//! Arms are chained into a sequence one at a time. After every pick the
//! strategy decides whether the sequence is executed; an executed sequence is
//! applied to a copy of the current solution, judged by the acceptance rule
//! and fed back to the strategy.

use crate::acceptor::Acceptor;
use crate::catalog::Catalog;
use crate::config::{Config, Variant};
use crate::error::ConfigError;
use crate::problem::Problem;
use crate::report::{RunReport, Transcript};
use crate::savings::savings_method;
use crate::solution::Solution;
use crate::strategy::{Outcome, SelectionStrategy, Strategy};
use crate::utils::{format_duration, seeded, Random};
use log::{debug, info};
use rand::Rng;
use std::time::{Duration, Instant};

/// The hyper-heuristic driver for the sequence-based variants.
pub struct MultiArmedHyper<'a> {
    problem: &'a Problem,
    config: Config,
    catalog: Catalog,
    strategy: Strategy,
    acceptor: Acceptor,
    rng: Random,
    transcript: Transcript,
}

impl<'a> MultiArmedHyper<'a> {
    /// Create a driver over the standard (or diagnostic) catalog.
    pub fn new(problem: &'a Problem, config: Config) -> Result<Self, ConfigError> {
        let catalog = if config.diagnostic_operators {
            Catalog::diagnostic()
        } else {
            Catalog::standard()
        };
        MultiArmedHyper::with_catalog(problem, config, catalog)
    }

    /// Create a driver over an explicit catalog.
    ///
    /// The ALNS variants have no sequence strategy and are rejected.
    pub fn with_catalog(
        problem: &'a Problem,
        config: Config,
        catalog: Catalog,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let strategy = Strategy::for_variant(&config, catalog.len())
            .ok_or(ConfigError::NotSequenceBased(config.variant))?;
        let acceptor = match config.variant {
            Variant::ExpoHyperRecord | Variant::ThompsonHyperRecord => Acceptor::Record {
                delta: config.delta,
            },
            _ => Acceptor::RecordToRecord {
                delta: config.delta,
            },
        };

        Ok(MultiArmedHyper {
            problem,
            rng: seeded(config.seed),
            transcript: Transcript::new(config.verbose),
            config,
            catalog,
            strategy,
            acceptor,
        })
    }

    pub fn name(&self) -> String {
        self.strategy.name(self.config.delta)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run until the time or iteration budget is spent and report the best solution.
    pub fn run(mut self) -> RunReport {
        let start = Instant::now();
        let name = self.name();
        let problem = self.problem;
        info!(
            "{}: {} customers, {} arms",
            name,
            problem.get_customer_count(),
            self.catalog.len()
        );
        self.transcript.header(problem, &name, Some(self.catalog.len()));

        let mut best = savings_method(problem, &mut self.rng);
        let mut current = best.clone();
        let mut iterations: u64 = 0;
        let mut sequence: Vec<usize> = Vec::with_capacity(self.config.max_sequence_length);
        let mut last = self.strategy.select_next(0, &mut self.rng);

        loop {
            if sequence.is_empty() && self.should_terminate(start, iterations) {
                break;
            }

            let mut next = self.strategy.select_next(last, &mut self.rng);
            sequence.push(next);

            if self.strategy.decide_apply(next, &mut self.rng)
                || sequence.len() >= self.config.max_sequence_length
            {
                iterations += 1;
                let candidate = self.execute(&current, &sequence);

                let outcome = Outcome {
                    improved_current: candidate.total_cost < current.total_cost,
                    new_best: candidate.total_cost < best.total_cost,
                };
                let progress = self.progress(start, iterations);
                let accepted = self.acceptor.accept(
                    candidate.total_cost,
                    best.total_cost,
                    best.feasible,
                    progress,
                    &mut self.rng,
                );

                self.transcript.row(
                    start.elapsed().as_secs_f64(),
                    iterations,
                    best.total_cost,
                    current.total_cost,
                    candidate.total_cost,
                    &sequence,
                );

                if outcome.new_best {
                    debug!(
                        "new best {:.2} after {} sequences",
                        candidate.total_cost, iterations
                    );
                    best = candidate.clone();
                }
                if accepted {
                    current = candidate;
                }

                self.strategy.on_outcome(&sequence, outcome);
                sequence.clear();
                next = self.rng.gen_range(0..self.catalog.len());
            }

            last = next;
        }

        let elapsed = start.elapsed();
        self.transcript.footer(&best, elapsed.as_secs_f64());
        info!(
            "{} finished in {}: cost {:.2}, feasible {}, {} sequences",
            name,
            format_duration(elapsed),
            best.total_cost,
            best.feasible,
            iterations
        );

        let transitions = self.strategy.transitions(&mut self.rng);
        let apply = self.strategy.apply_probabilities(&mut self.rng);
        RunReport::new(
            name,
            &best,
            elapsed.as_secs_f64(),
            iterations,
            self.transcript.into_text(),
            transitions,
            apply,
        )
    }

    /// Apply every arm of `sequence` in order to a copy of `current`.
    fn execute(&mut self, current: &Solution, sequence: &[usize]) -> Solution {
        let mut candidate = current.clone();
        for &arm in sequence {
            self.catalog
                .apply(arm, &mut candidate, self.problem, &mut self.rng);
        }
        candidate
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

    fn progress(&self, start: Instant, iterations: u64) -> f64 {
        budget_progress(&self.config, start.elapsed(), iterations)
    }
}

/// Consumed share of the run budget in `[0, 1]`.
///
/// An iteration limit takes precedence over the clock, so iteration-bounded
/// runs never depend on timing.
pub fn budget_progress(config: &Config, elapsed: Duration, iterations: u64) -> f64 {
    match (config.iteration_limit, config.time_limit) {
        (Some(limit), _) if limit > 0 => iterations as f64 / limit as f64,
        (_, Some(limit)) if !limit.is_zero() => elapsed.as_secs_f64() / limit.as_secs_f64(),
        _ => 0.0,
    }
    .clamp(0.0, 1.0)
}

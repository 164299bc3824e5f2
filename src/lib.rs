//! # VRPTW hyper-heuristics
//!
//! Multi-armed-bandit hyper-heuristics for the Vehicle Routing Problem with
//! Time Windows.
//!
//! A run starts from a Clarke-Wright savings solution and repeatedly applies
//! low-level heuristics (local searches and destroy/repair pairs) chosen by a
//! learning strategy: exponential weights, Bayesian counting or Thompson
//! sampling over operator sequences, or an adaptive large neighbourhood
//! search baseline. Infeasibility is priced with a big-M penalty so that any
//! feasible solution is cheaper than any infeasible one.

pub mod acceptor;
pub mod alns;
pub mod catalog;
pub mod config;
pub mod destroy;
pub mod error;
pub mod hyper;
pub mod local_search;
pub mod problem;
pub mod repair;
pub mod report;
pub mod savings;
pub mod solution;
pub mod strategy;
pub mod utils;

use crate::alns::AdaptiveSearch;
use crate::config::{Config, Variant};
use crate::error::ConfigError;
use crate::hyper::MultiArmedHyper;
use crate::problem::Problem;
use crate::report::RunReport;

/// Solve `problem` with the variant selected in `config`.
///
/// Fails before any search when `config` does not pass [`Config::validate`].
pub fn solve(problem: &Problem, config: Config) -> Result<RunReport, ConfigError> {
    let report = match config.variant {
        Variant::Alns => AdaptiveSearch::new(problem, config, false)?.run(),
        Variant::AlnsImproved => AdaptiveSearch::new(problem, config, true)?.run(),
        _ => MultiArmedHyper::new(problem, config)?.run(),
    };
    Ok(report)
}

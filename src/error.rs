//! Errors raised while loading problem instances or checking run settings.

use crate::config::Variant;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Failure to build a [`Problem`](crate::problem::Problem) from an instance file.
#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("failed to read instance: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid number: {0}")]
    Float(#[from] ParseFloatError),

    #[error("invalid integer: {0}")]
    Integer(#[from] ParseIntError),

    #[error("missing section: {0}")]
    MissingSection(&'static str),

    #[error("instance has no customers")]
    Empty,
}

/// A run configuration the solver refuses to start with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("either a time limit or an iteration limit is required")]
    Unbounded,

    #[error("time limit must be positive")]
    ZeroTimeLimit,

    #[error("beta must lie in [0, 0.5), got {0}")]
    Beta(f64),

    #[error("alpha, eta and delta must be non-negative")]
    Negative,

    #[error("the operator catalog is empty")]
    EmptyCatalog,

    #[error("{0} is not a sequence-based variant")]
    NotSequenceBased(Variant),
}

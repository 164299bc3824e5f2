//! Randomness helpers and small numeric utilities shared by the operators.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// The single pseudo-random stream threaded through every stochastic call.
pub type Random = ChaCha8Rng;

/// Maximum number of routes visited by one pass of an inter-route operator.
pub const MAX_ROUTE_SAMPLE: usize = 40;

/// Exponent of the rank-biased sampling used by the removal operators.
pub const RANK_BIAS: i32 = 6;

/// Create the run's random stream from a seed.
pub fn seeded(seed: u64) -> Random {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Route indexes `0..count` in random order, truncated to [`MAX_ROUTE_SAMPLE`].
pub fn random_indexes(count: usize, rng: &mut Random) -> Vec<usize> {
    let mut indexes: Vec<usize> = (0..count).collect();
    indexes.shuffle(rng);
    indexes.truncate(MAX_ROUTE_SAMPLE);
    indexes
}

/// Sample a position in a ranked list of `len` entries, strongly biased to the front.
///
/// `pos = round(len * y^p)`, shifted down by one, with `y ~ U(0, 1)`.
pub fn rank_biased_position(len: usize, rng: &mut Random) -> usize {
    let y: f64 = rng.gen();
    let pos = (len as f64 * y.powi(RANK_BIAS)).round() as usize;
    pos.saturating_sub(1).min(len.saturating_sub(1))
}

/// Number of requests a removal operator targets: `4 + U[0, min(97, round(0.4 n)))`.
pub fn removal_size(customers: usize, rng: &mut Random) -> usize {
    let limit = (customers as f64 * 0.4).round() as usize;
    4 + rng.gen_range(0..(limit + 1).min(97))
}

/// Roulette-wheel draw over weights that sum to one.
pub fn roulette(weights: &[f64], rng: &mut Random) -> usize {
    let unif: f64 = rng.gen();
    let mut acum = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        acum += weight;
        if unif < acum {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

/// Round to two decimals, as the reports do.
pub fn round2(value: f64) -> f64 {
    (value * 1e2).round() / 1e2
}

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Left-align `text` in a column of `width` characters.
pub fn to_column(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

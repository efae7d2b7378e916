use rand::Rng;
use thiserror::Error;

use crate::models::ProfileId;

/// Errors from pair sampling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("population has {0} profile(s), need at least 2 to form a pair")]
    InsufficientPopulation(usize),
}

/// Draw two distinct profile ids uniformly at random, without replacement,
/// from the current population.
///
/// Sampling is memoryless: the same pair can come back on a later call, and
/// nothing here biases toward recently added or recently rated profiles.
/// Callers that want anti-repeat behavior track history themselves.
pub fn sample_pair(population: &[ProfileId]) -> Result<(ProfileId, ProfileId), SampleError> {
    sample_pair_with(population, &mut rand::rng())
}

/// Same as [`sample_pair`] but with a caller-supplied RNG, so tests can
/// seed it.
pub fn sample_pair_with(
    population: &[ProfileId],
    rng: &mut impl Rng,
) -> Result<(ProfileId, ProfileId), SampleError> {
    if population.len() < 2 {
        return Err(SampleError::InsufficientPopulation(population.len()));
    }

    // Uniform without replacement: draw the first index from the full range,
    // the second from a range one smaller, and shift it past the first.
    let first = rng.random_range(0..population.len());
    let mut second = rng.random_range(0..population.len() - 1);
    if second >= first {
        second += 1;
    }

    Ok((population[first], population[second]))
}

use rand::{Rng as _, SeedableRng, rngs::StdRng};
use serde::Serialize;

/// Seedable random number generator.
///
/// Wraps StdRng to provide deterministic randomness from a seed value. A
/// simulation run owns exactly one `Rng` and lends it out by `&mut` to every
/// randomized decision, so the order of draws is the order of calls:
/// RFM window arming, counter resets, then mixed-workload row draws.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Rng {
    seed: u64,
    #[serde(skip_serializing)]
    rng: StdRng,
}

impl Rng {
    /// Creates a new RNG from a seed value.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed value for deterministic random generation
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this stream was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws an offset uniformly from `[0, span)`.
    pub fn uniform_offset(&mut self, span: f64) -> f64 {
        self.rng.random::<f64>() * span
    }

    /// Draws a counter value uniformly from `[0, max]` (inclusive).
    pub fn counter_value(&mut self, max: u64) -> u64 {
        self.rng.random_range(0..=max)
    }

    /// Draws a percentage uniformly from `[1, 100]`.
    pub fn percent(&mut self) -> u8 {
        self.rng.random_range(1..=100)
    }

    /// Draws an index uniformly from `[0, n)`.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn index_below(&mut self, n: usize) -> usize {
        self.rng.random_range(0..n)
    }
}

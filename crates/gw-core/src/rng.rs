//! Deterministic RNG for stochastic transition rules.
//!
//! # Determinism strategy
//!
//! Each trial gets its own `SmallRng` seeded by:
//!
//!   seed = base_seed XOR (trial * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive trial numbers across the seed space.  Replaying
//! the same key sequence with the same base seed reproduces every sampled
//! transition rule, and restarting a trial never reuses the previous trial's
//! stream.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// RNG used for weighted transition-rule sampling.
pub struct TaskRng(SmallRng);

impl TaskRng {
    pub fn new(seed: u64) -> Self {
        TaskRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed deterministically from a base seed and a trial counter.
    pub fn for_trial(base_seed: u64, trial: u64) -> Self {
        TaskRng::new(base_seed ^ trial.wrapping_mul(MIXING_CONSTANT))
    }

    /// Seed from operating-system entropy (non-reproducible runs).
    pub fn from_entropy() -> Self {
        TaskRng(SmallRng::from_entropy())
    }

    /// A fresh random base seed, for runs that did not configure one.
    pub fn entropy_seed() -> u64 {
        rand::random()
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Uniform draw in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

impl std::fmt::Debug for TaskRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TaskRng(..)")
    }
}

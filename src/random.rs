//! Exponential and categorical variates drawn from a seeded uniform stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{require_positive, Result, SimError};

#[derive(Clone, Debug)]
pub struct RandomVariateSource {
    rng: ChaCha8Rng,
}

impl RandomVariateSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.rng.r#gen()
    }

    // -ln(1 - U) / rate; 1 - U lies in (0, 1].
    pub fn exponential(&mut self, rate: f64) -> Result<f64> {
        let rate = require_positive("exponential rate", rate)?;
        let u = self.uniform();
        Ok(-(1.0 - u).ln() / rate)
    }

    /// Index drawn with probability proportional to its weight.
    ///
    /// Weights need not be normalised: the target `U * total` is located on
    /// the running cumulative sum, so `categorical(w)` and
    /// `categorical(w / sum(w))` select identically. Zero-weight entries are
    /// never returned.
    pub fn categorical(&mut self, weights: &[f64]) -> Result<usize> {
        let total: f64 = weights.iter().sum();
        if weights.is_empty() || !total.is_finite() || total <= 0.0 {
            return Err(SimError::DegenerateDistribution { len: weights.len() });
        }
        let target = self.uniform() * total;
        Ok(select_cumulative(weights, target))
    }
}

/// First positive-weight index whose cumulative sum reaches `target`.
///
/// Rounding can leave `target` marginally above the accumulated total; the
/// last positive-weight index absorbs that remainder.
pub(crate) fn select_cumulative(weights: &[f64], target: f64) -> usize {
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (idx, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = idx;
        if target <= cumulative {
            return idx;
        }
    }
    last_positive
}

pub fn derive_seed(seed: Option<u64>, trajectory: u64) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9E3779B97F4A7C15;
    let base = seed.unwrap_or(0xDEADBEEFCAFEBABE);
    let mut z = base ^ (trajectory.wrapping_mul(GOLDEN_GAMMA));
    z = z.wrapping_add(GOLDEN_GAMMA);
    let mut result = z;
    result = (result ^ (result >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    result = (result ^ (result >> 27)).wrapping_mul(0x94D049BB133111EB);
    result ^ (result >> 31)
}

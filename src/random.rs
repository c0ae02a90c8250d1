//! Injectable randomness for group spawning and scatter.
//!
//! The core never reaches for a global generator: every operation that
//! samples takes a `&mut impl RandomSource`. Any [`rand::Rng`] is a source,
//! so production code passes a [`ChaCha8Rng`] (via [`GroupRng`]) and tests
//! pass a seeded one to get reproducible layouts.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform float sampling, the only random capability the core needs.
pub trait RandomSource {
    /// Sample uniformly from the closed range `[min, max]`.
    ///
    /// Returns `min` when the range is empty or degenerate (`max <= min`),
    /// which happens for single-unit groups whose scatter range is zero,
    /// and when either bound is not finite.
    fn uniform(&mut self, min: f32, max: f32) -> f32;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        if max <= min || !min.is_finite() || !max.is_finite() {
            return min;
        }
        if max - min <= f32::MAX * 0.5 {
            return self.gen_range(min..=max);
        }
        // The span overflows rand's float sampler; interpolate instead.
        let t: f32 = self.gen_range(0.0..=1.0);
        (min * (1.0 - t) + max * t).clamp(min, max)
    }
}

/// Deterministic generator for a given seed.
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Shared generator used by the group systems.
#[derive(Resource)]
pub struct GroupRng(pub ChaCha8Rng);

impl GroupRng {
    /// Seeded when `seed` is set (reproducible runs), entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(seeded(seed)),
            None => Self(ChaCha8Rng::from_entropy()),
        }
    }
}

impl Default for GroupRng {
    fn default() -> Self {
        Self::new(None)
    }
}

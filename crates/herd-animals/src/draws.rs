//! The random-draw capability threaded through every stage operation.
//!
//! Stage and protocol code never touches a global generator. It asks a
//! [`DrawSource`] for uniform probabilities and normal samples, which lets
//! the engine run from a seed ([`SeededDraws`]) and lets tests script the
//! exact sequence of outcomes ([`ScriptedDraws`]).

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::config::NormalParams;
use crate::error::AnimalError;

/// Source of uniform and normal draws.
pub trait DrawSource {
    /// The next raw uniform draw. Well-behaved sources return `[0, 1)`.
    fn next_uniform(&mut self) -> f64;

    /// A sample from `N(mean, std_dev)`.
    fn next_normal(&mut self, mean: f64, std_dev: f64) -> Result<f64, AnimalError>;

    /// The next uniform draw, checked to lie in `[0, 1)`.
    fn probability(&mut self) -> Result<f64, AnimalError> {
        let value = self.next_uniform();
        if (0.0..1.0).contains(&value) {
            Ok(value)
        } else {
            Err(AnimalError::InvalidDraw { value })
        }
    }

    /// Whether a draw lands strictly below `rate`.
    fn chance(&mut self, rate: f64) -> Result<bool, AnimalError> {
        Ok(self.probability()? < rate)
    }

    /// A sample from a configured normal distribution.
    fn normal(&mut self, params: &NormalParams) -> Result<f64, AnimalError> {
        self.next_normal(params.mean, params.std_dev)
    }
}

/// Round a sampled duration to whole days, clamped to the `u32` range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn whole_days(value: f64) -> u32 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, f64::from(u32::MAX)) as u32
    }
}

// ---------------------------------------------------------------------------
// Seeded source
// ---------------------------------------------------------------------------

/// A reproducible draw source backed by a seeded [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededDraws {
    rng: StdRng,
}

impl SeededDraws {
    /// Create a source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DrawSource for SeededDraws {
    fn next_uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn next_normal(&mut self, mean: f64, std_dev: f64) -> Result<f64, AnimalError> {
        let normal = Normal::new(mean, std_dev)
            .map_err(|_err| AnimalError::InvalidDistribution { mean, std_dev })?;
        Ok(normal.sample(&mut self.rng))
    }
}

// ---------------------------------------------------------------------------
// Scripted source
// ---------------------------------------------------------------------------

/// A draw source that replays fixed sequences.
///
/// Uniform draws come from the script in order; once it is empty the
/// fallback value is repeated, or NaN if none was set (which
/// [`DrawSource::probability`] rejects). Normal draws come from their own
/// script; once it is empty every normal draw returns its mean.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDraws {
    uniforms: VecDeque<f64>,
    normals: VecDeque<f64>,
    fallback: Option<f64>,
}

impl ScriptedDraws {
    /// Script the uniform draws.
    pub fn new(uniforms: impl IntoIterator<Item = f64>) -> Self {
        Self {
            uniforms: uniforms.into_iter().collect(),
            normals: VecDeque::new(),
            fallback: None,
        }
    }

    /// Script the normal draws.
    #[must_use]
    pub fn with_normals(mut self, normals: impl IntoIterator<Item = f64>) -> Self {
        self.normals = normals.into_iter().collect();
        self
    }

    /// Repeat `value` once the uniform script runs out.
    #[must_use]
    pub const fn repeating(mut self, value: f64) -> Self {
        self.fallback = Some(value);
        self
    }

    /// Uniform draws not yet consumed.
    pub fn remaining_uniforms(&self) -> usize {
        self.uniforms.len()
    }
}

impl DrawSource for ScriptedDraws {
    fn next_uniform(&mut self) -> f64 {
        self.uniforms
            .pop_front()
            .or(self.fallback)
            .unwrap_or(f64::NAN)
    }

    fn next_normal(&mut self, mean: f64, std_dev: f64) -> Result<f64, AnimalError> {
        if !(mean.is_finite() && std_dev.is_finite() && std_dev >= 0.0) {
            return Err(AnimalError::InvalidDistribution { mean, std_dev });
        }
        Ok(self.normals.pop_front().unwrap_or(mean))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn seeded_draws_are_reproducible() {
        let mut a = SeededDraws::new(42);
        let mut b = SeededDraws::new(42);
        for _ in 0..100 {
            assert_eq!(a.probability().unwrap(), b.probability().unwrap());
            assert_eq!(
                a.next_normal(21.0, 2.5).unwrap(),
                b.next_normal(21.0, 2.5).unwrap()
            );
        }
    }

    #[test]
    fn seeded_probabilities_stay_in_unit_interval() {
        let mut draws = SeededDraws::new(7);
        for _ in 0..10_000 {
            let p = draws.probability().unwrap();
            assert!((0.0..1.0).contains(&p));
        }
    }

    #[test]
    fn negative_std_dev_is_rejected() {
        let mut draws = SeededDraws::new(1);
        assert!(matches!(
            draws.next_normal(0.0, -1.0),
            Err(AnimalError::InvalidDistribution { .. })
        ));
    }

    #[test]
    fn out_of_range_draw_is_an_invariant_error() {
        let mut draws = ScriptedDraws::new([1.0]);
        assert!(matches!(
            draws.probability(),
            Err(AnimalError::InvalidDraw { .. })
        ));
        let mut draws = ScriptedDraws::new([-0.1]);
        assert!(draws.probability().is_err());
    }

    #[test]
    fn scripted_draws_replay_then_fall_back() {
        let mut draws = ScriptedDraws::new([0.1, 0.2])
            .with_normals([3.0])
            .repeating(0.9);
        assert_eq!(draws.probability().unwrap(), 0.1);
        assert_eq!(draws.probability().unwrap(), 0.2);
        assert_eq!(draws.probability().unwrap(), 0.9);
        assert_eq!(draws.next_normal(10.0, 1.0).unwrap(), 3.0);
        assert_eq!(draws.next_normal(10.0, 1.0).unwrap(), 10.0);
    }

    #[test]
    fn exhausted_script_without_fallback_fails() {
        let mut draws = ScriptedDraws::default();
        assert!(draws.probability().is_err());
    }

    #[test]
    fn whole_days_rounds_and_clamps() {
        assert_eq!(whole_days(4.5), 5);
        assert_eq!(whole_days(-3.0), 0);
        assert_eq!(whole_days(f64::NAN), 0);
    }

    #[test]
    fn chance_is_strictly_below_rate() {
        let mut draws = ScriptedDraws::new([0.5, 0.49]);
        assert!(!draws.chance(0.5).unwrap());
        assert!(draws.chance(0.5).unwrap());
    }
}

//! Random perturbation source that keeps synthetic readings lively.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Injectable noise generator.
///
/// Production code seeds from entropy; tests either pick a seed for
/// reproducible ticks or disable noise entirely so every perturbation is 0.
#[derive(Debug, Clone)]
pub struct Jitter {
    rng: Option<StdRng>,
}

impl Jitter {
    pub fn from_entropy() -> Self {
        Self {
            rng: Some(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn disabled() -> Self {
        Self { rng: None }
    }

    /// Seeded when a seed is given, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_else(Self::from_entropy)
    }

    pub fn is_enabled(&self) -> bool {
        self.rng.is_some()
    }

    /// Uniform value in `[-amplitude, amplitude]`
    pub fn perturb(&mut self, amplitude: f64) -> f64 {
        match self.rng.as_mut() {
            Some(rng) if amplitude > 0.0 && amplitude.is_finite() => {
                rng.gen_range(-amplitude..=amplitude)
            }
            _ => 0.0,
        }
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::from_entropy()
    }
}

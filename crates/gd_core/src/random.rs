//! Seedable random source for gameplay decisions (spawn timing, launch speeds,
//! house selection). A fixed seed reproduces a session exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct SceneRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SceneRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from the wall clock. Used when no seed is configured.
    pub fn from_clock() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5eed);
        Self::seeded(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[min, max]`. A degenerate or inverted range yields `min`.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.random_range(min..=max)
        } else {
            min
        }
    }

    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        if max > min {
            self.rng.random_range(min..=max)
        } else {
            min
        }
    }

    /// Uniform index in `0..len`, or `None` for an empty collection.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.random_range(0..len))
        }
    }
}

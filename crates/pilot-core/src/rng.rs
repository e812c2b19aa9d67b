//! Deterministic per-vehicle RNG.
//!
//! Each vehicle gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (vessel_id * MIXING_CONSTANT)
//!
//! so controllers never share RNG state and the parallel loop stays
//! reproducible regardless of thread scheduling.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::VesselId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── VesselRng ─────────────────────────────────────────────────────────────────

/// Per-vehicle deterministic RNG, owned by that vehicle's controller.
#[derive(Clone, Debug)]
pub struct VesselRng(SmallRng);

impl VesselRng {
    /// Seed deterministically from the run's global seed and a vessel ID.
    pub fn new(global_seed: u64, vessel: VesselId) -> Self {
        let seed = global_seed ^ (vessel.0 as u64).wrapping_mul(MIXING_CONSTANT);
        VesselRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform point inside the unit ball (rejection sampled).
    pub fn inside_unit_sphere(&mut self) -> Vec3 {
        loop {
            let v = Vec3::new(
                self.0.gen_range(-1.0..=1.0),
                self.0.gen_range(-1.0..=1.0),
                self.0.gen_range(-1.0..=1.0),
            );
            if v.length_squared() <= 1.0 {
                return v;
            }
        }
    }
}

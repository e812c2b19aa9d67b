//! Counters for degraded numerics and fallbacks.
//!
//! Nothing on the control path is allowed to fail.  When a computation yields
//! a non-finite value it is replaced by a documented fallback, and the event
//! is counted here and logged at `warn` so it stays observable.

use glam::Vec3;
use tracing::warn;

use crate::math;

/// Per-controller diagnostic counters.  Cheap to copy; the host may read and
/// merge them after each tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostics {
    /// Non-finite scalars or vectors replaced by a fallback.
    pub non_finite:     u64,
    /// Pathfinding queries that fell back to a direct line.
    pub path_fallbacks: u64,
    /// Configuration values clamped into range.
    pub clamped_config: u64,
}

impl Diagnostics {
    /// Return `value` if finite, otherwise count and return `fallback`.
    pub fn finite_or(&mut self, value: f32, fallback: f32, what: &'static str) -> f32 {
        if value.is_finite() {
            value
        } else {
            self.non_finite += 1;
            warn!(what, value, fallback, "non-finite value replaced");
            fallback
        }
    }

    /// Vector variant of [`finite_or`][Self::finite_or].
    pub fn finite_vec_or(&mut self, value: Vec3, fallback: Vec3, what: &'static str) -> Vec3 {
        if math::is_finite(value) {
            value
        } else {
            self.non_finite += 1;
            warn!(what, ?value, ?fallback, "non-finite vector replaced");
            fallback
        }
    }

    pub fn merge(&mut self, other: &Diagnostics) {
        self.non_finite     += other.non_finite;
        self.path_fallbacks += other.path_fallbacks;
        self.clamped_config += other.clamped_config;
    }
}

//! Gunfire evasion overlay and the surface weave.
//!
//! Evasion is not a behavior of its own.  It runs beside whichever behavior
//! the ladder committed to and perturbs its output: the orbital variant adds
//! a lateral thruster vector, the surface variant weaves its steering.

use pilot_agent::Agent;
use pilot_core::math::project_on_plane;
use pilot_core::{Vec3, VesselId};

use crate::{OrbitalConfig, ThreatSignal};

/// Weave half-amplitude, in units of the weave factor.
pub const WEAVE_LIMIT: f32 = 2.3;

/// Missiles closer than this make a surface vehicle weave.
pub const WEAVE_MISSILE_RANGE: f32 = 2_500.0;

// ── Gunfire evasion ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EvasionTuning {
    pub min_time:            f32,
    pub threshold:           f32,
    pub time_threshold:      f32,
    pub min_range_threshold: f32,
    pub ignore_my_target_targeting_me: bool,
}

impl From<&OrbitalConfig> for EvasionTuning {
    fn from(cfg: &OrbitalConfig) -> Self {
        Self {
            min_time:            cfg.min_evasion_time,
            threshold:           cfg.evasion_threshold,
            time_threshold:      cfg.evasion_time_threshold,
            min_range_threshold: cfg.evasion_min_range_threshold,
            ignore_my_target_targeting_me: cfg.evasion_ignore_my_target_targeting_me,
        }
    }
}

/// Debounced "evading gunfire" flag with the relative threat direction.
///
/// Once triggered the flag holds for at least `min_time` seconds, however
/// briefly the threat lasted.  The timer then resets and the threat is
/// re-evaluated.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GunfireEvasion {
    timer:      f32,
    threat_rel: Vec3,
    evading:    bool,
}

impl GunfireEvasion {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_evading(&self) -> bool {
        self.evading
    }

    /// Direction of the threat relative to us, as of the last trigger.
    #[inline]
    pub fn threat_relative(&self) -> Vec3 {
        self.threat_rel
    }

    /// Fold one tick of threat information into the flag.  Returns the flag.
    pub fn update(
        &mut self,
        me:        &Agent,
        threat:    &ThreatSignal,
        my_target: Option<VesselId>,
        tuning:    &EvasionTuning,
        dt:        f32,
    ) -> bool {
        self.evading = false;

        let ignored = tuning.ignore_my_target_targeting_me
            && threat.threat_source.is_some()
            && threat.threat_source == my_target;

        let mut rating = tuning.threshold + 1.0;
        if threat.under_fire
            && !ignored
            && threat.miss_time >= tuning.time_threshold
            && threat.threat_distance_sqr(me.position()) >= tuning.min_range_threshold * tuning.min_range_threshold
        {
            rating = threat.miss_distance;
        }

        let holding = self.timer < tuning.min_time && self.timer != 0.0;
        if holding || rating < tuning.threshold {
            if self.timer < tuning.min_time {
                self.threat_rel = me.velocity().normalize_or_zero() + me.orientation.right;
                if threat.under_fire {
                    self.threat_rel = threat.threat_position - me.position();
                }
            }
            self.evading = true;
            self.timer += dt;
            if self.timer >= tuning.min_time {
                self.timer = 0.0;
            }
        }
        self.evading
    }

    /// Thruster vector that jinks across the threat axis along `jitter`, or
    /// `None` when not evading.
    pub fn rcs_overlay(&self, jitter: Vec3) -> Option<Vec3> {
        self.evading.then(|| project_on_plane(jitter, self.threat_rel))
    }
}

// ── Weave ─────────────────────────────────────────────────────────────────────

/// Triangle-wave yaw offset (degrees) that a surface vehicle adds to its
/// heading error while under fire.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Weave {
    adjustment: f32,
    direction:  f32,
}

impl Default for Weave {
    fn default() -> Self {
        Self { adjustment: 0.0, direction: 1.0 }
    }
}

impl Weave {
    #[inline]
    pub fn adjustment(&self) -> f32 {
        self.adjustment
    }

    /// Advance one tick, reversing direction at `±WEAVE_LIMIT · factor`.
    pub fn advance(&mut self, factor: f32, dt: f32) -> f32 {
        if self.adjustment.abs() + dt * factor > WEAVE_LIMIT * factor {
            self.direction = -self.direction;
        }
        self.adjustment += factor * self.direction * dt;
        self.adjustment
    }

    #[inline]
    pub fn reset(&mut self) {
        self.adjustment = 0.0;
    }
}

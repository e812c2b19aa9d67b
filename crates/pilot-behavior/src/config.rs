//! Controller configuration.
//!
//! Configuration is immutable once a pilot is built.  Every tunable has a
//! documented range; [`OrbitalConfig::clamped`] and [`SurfaceConfig::clamped`]
//! pull out-of-range values onto the nearest bound once, at construction,
//! logging each at `warn` and counting it in [`Diagnostics::clamped_config`].
//!
//! Surface tunables have two tiers of bounds.  With `up_to_eleven` set, the
//! extended upper bounds apply instead of the normal ones.

use tracing::warn;

use pilot_avoid::AvoidanceConfig;
use pilot_core::{Diagnostics, MovementClass};
use pilot_spatial::GridSpec;

use crate::{BehaviorError, BehaviorResult};

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Valid range of one tunable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min:          f32,
    pub max:          f32,
    /// Upper bound when `up_to_eleven` is set.
    pub extended_max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max, extended_max: max }
    }

    pub const fn extended(min: f32, max: f32, extended_max: f32) -> Self {
        Self { min, max, extended_max }
    }

    #[inline]
    pub fn upper(&self, up_to_eleven: bool) -> f32 {
        if up_to_eleven { self.extended_max } else { self.max }
    }

    /// Clamp `value` in place.  Non-finite values fall back to `default`.
    fn apply(&self, value: &mut f32, default: f32, up_to_eleven: bool, name: &'static str, diag: &mut Diagnostics) {
        let upper = self.upper(up_to_eleven);
        let clamped = if value.is_finite() { value.clamp(self.min, upper) } else { default };
        if clamped != *value {
            warn!(name, value = *value, clamped, "configuration value out of range");
            diag.clamped_config += 1;
            *value = clamped;
        }
    }
}

// ── Orbital ───────────────────────────────────────────────────────────────────

pub mod orbital_bounds {
    use super::Bounds;

    pub const MIN_ENGAGEMENT_RANGE:        Bounds = Bounds::new(10.0, 10_000.0);
    pub const MANEUVER_SPEED:              Bounds = Bounds::new(10.0, 10_000.0);
    pub const FIRING_SPEED:                Bounds = Bounds::new(2.0, 1_000.0);
    pub const MIN_EVASION_TIME:            Bounds = Bounds::new(0.0, 1.0);
    pub const EVASION_THRESHOLD:           Bounds = Bounds::new(0.0, 100.0);
    pub const EVASION_TIME_THRESHOLD:      Bounds = Bounds::new(0.0, 5.0);
    pub const EVASION_MIN_RANGE_THRESHOLD: Bounds = Bounds::new(10.0, 10_000.0);
    pub const VESSEL_STANDOFF_DISTANCE:    Bounds = Bounds::new(0.0, 10_000.0);
    pub const DEFAULT_TERRAIN_HEIGHT:      Bounds = Bounds::new(0.0, 100_000.0);
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitalConfig {
    pub min_engagement_range:        f32,
    /// Closing speed to hold while intercepting or escaping.
    pub maneuver_speed:              f32,
    /// Relative speed below which guns may be used.
    pub firing_speed:                f32,

    /// Seconds the gunfire evasion overlay stays on once triggered.
    pub min_evasion_time:            f32,
    /// Miss distance below which incoming fire counts as a threat.
    pub evasion_threshold:           f32,
    /// Ignore fire whose closest miss is sooner than this.
    pub evasion_time_threshold:      f32,
    /// Ignore fire from closer than this.
    pub evasion_min_range_threshold: f32,
    pub evasion_ignore_my_target_targeting_me: bool,

    pub allow_withdrawal:              bool,
    /// Keep auxiliary thrusters on during ordinary maneuvers.
    pub maneuver_rcs:                  bool,
    pub vessel_standoff_distance:      f32,
    /// Line-of-sight rate (deg/s) above which angular velocity is nulled.
    pub firing_angular_velocity_limit: f32,

    /// Maneuver time limit in normal conditions.
    pub combat_update_interval:    f32,
    /// Maneuver time limit with a missile inbound.
    pub emergency_update_interval: f32,
    /// Burn length for commanded moves.
    pub commanded_burn_time:       f32,
    /// Time limit of a missile-evasion burn.
    pub missile_evade_time:        f32,
    /// Time limit of a withdrawal burn.
    pub withdraw_time_limit:       f32,
    /// Used when the body does not report its highest terrain.
    pub default_terrain_height:    f32,
}

impl Default for OrbitalConfig {
    fn default() -> Self {
        Self {
            min_engagement_range:        500.0,
            maneuver_speed:              100.0,
            firing_speed:                20.0,
            min_evasion_time:            0.2,
            evasion_threshold:           25.0,
            evasion_time_threshold:      0.1,
            evasion_min_range_threshold: 10.0,
            evasion_ignore_my_target_targeting_me: false,
            allow_withdrawal:              true,
            maneuver_rcs:                  false,
            vessel_standoff_distance:      200.0,
            firing_angular_velocity_limit: 1.0,
            combat_update_interval:    2.5,
            emergency_update_interval: 0.5,
            commanded_burn_time:       10.0,
            missile_evade_time:        4.0,
            withdraw_time_limit:       60.0,
            default_terrain_height:    200.0,
        }
    }
}

impl OrbitalConfig {
    /// Reject settings that have no meaningful clamp: non-positive intervals.
    pub fn validate(&self) -> BehaviorResult<()> {
        let intervals = [
            ("combat_update_interval", self.combat_update_interval),
            ("emergency_update_interval", self.emergency_update_interval),
            ("commanded_burn_time", self.commanded_burn_time),
            ("missile_evade_time", self.missile_evade_time),
            ("withdraw_time_limit", self.withdraw_time_limit),
        ];
        for (name, value) in intervals {
            if !(value.is_finite() && value > 0.0) {
                return Err(BehaviorError::Config(format!("{name} must be positive and finite, got {value}")));
            }
        }
        Ok(())
    }

    /// Copy with every ranged tunable clamped into its bounds.
    pub fn clamped(mut self, diag: &mut Diagnostics) -> Self {
        use orbital_bounds as b;
        let d = Self::default();
        b::MIN_ENGAGEMENT_RANGE.apply(&mut self.min_engagement_range, d.min_engagement_range, false, "min_engagement_range", diag);
        b::MANEUVER_SPEED.apply(&mut self.maneuver_speed, d.maneuver_speed, false, "maneuver_speed", diag);
        b::FIRING_SPEED.apply(&mut self.firing_speed, d.firing_speed, false, "firing_speed", diag);
        b::MIN_EVASION_TIME.apply(&mut self.min_evasion_time, d.min_evasion_time, false, "min_evasion_time", diag);
        b::EVASION_THRESHOLD.apply(&mut self.evasion_threshold, d.evasion_threshold, false, "evasion_threshold", diag);
        b::EVASION_TIME_THRESHOLD.apply(
            &mut self.evasion_time_threshold,
            d.evasion_time_threshold,
            false,
            "evasion_time_threshold",
            diag,
        );
        b::EVASION_MIN_RANGE_THRESHOLD.apply(
            &mut self.evasion_min_range_threshold,
            d.evasion_min_range_threshold,
            false,
            "evasion_min_range_threshold",
            diag,
        );
        b::VESSEL_STANDOFF_DISTANCE.apply(
            &mut self.vessel_standoff_distance,
            d.vessel_standoff_distance,
            false,
            "vessel_standoff_distance",
            diag,
        );
        b::DEFAULT_TERRAIN_HEIGHT.apply(
            &mut self.default_terrain_height,
            d.default_terrain_height,
            false,
            "default_terrain_height",
            diag,
        );
        self
    }
}

// ── Surface ───────────────────────────────────────────────────────────────────

/// Which side a broadside attacker keeps toward its target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrbitDirection {
    Port,
    /// Picked at random when the pilot is built.
    #[default]
    Either,
    Starboard,
}

pub mod surface_bounds {
    use super::Bounds;

    pub const MAX_SLOPE_ANGLE:      Bounds = Bounds::extended(1.0, 30.0, 90.0);
    pub const CRUISE_SPEED:         Bounds = Bounds::extended(5.0, 60.0, 300.0);
    pub const MAX_SPEED:            Bounds = Bounds::extended(5.0, 80.0, 400.0);
    pub const MAX_DRIFT:            Bounds = Bounds::new(1.0, 180.0);
    pub const TARGET_PITCH:         Bounds = Bounds::new(-10.0, 10.0);
    pub const BANK_ANGLE:           Bounds = Bounds::new(-45.0, 45.0);
    pub const WEAVE_FACTOR:         Bounds = Bounds::new(0.0, 10.0);
    pub const STEER_MULT:           Bounds = Bounds::extended(0.2, 20.0, 200.0);
    pub const STEER_DAMPING:        Bounds = Bounds::extended(0.1, 10.0, 100.0);
    pub const MIN_ENGAGEMENT_RANGE: Bounds = Bounds::extended(0.0, 6_000.0, 20_000.0);
    pub const MAX_ENGAGEMENT_RANGE: Bounds = Bounds::extended(0.0, 8_000.0, 30_000.0);
    pub const AVOID_MASS:           Bounds = Bounds::extended(0.0, 100.0, 1.0e6);
    pub const COMBAT_ALTITUDE:      Bounds = Bounds::new(-200.0, -15.0);
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceConfig {
    pub class:                MovementClass,
    pub max_slope_angle:      f32,
    pub cruise_speed:         f32,
    pub max_speed:            f32,
    /// Largest angle (deg) allowed between heading and velocity.
    pub max_drift:            f32,
    /// Nose-up trim while moving (deg).
    pub target_pitch:         f32,
    /// Roll into turns (deg).
    pub bank_angle:           f32,
    pub weave_factor:         f32,
    pub steer_mult:           f32,
    pub steer_damping:        f32,
    pub min_engagement_range: f32,
    pub max_engagement_range: f32,
    /// Vessels lighter than this are not avoided.
    pub avoid_mass:           f32,
    /// Submarine cruising depth (negative altitude).
    pub combat_altitude:      f32,

    pub broadside_attack:  bool,
    pub orbit_direction:   OrbitDirection,
    pub maintain_min_range: bool,
    pub powered_steering:  bool,
    pub maneuver_rcs:      bool,
    pub up_to_eleven:      bool,

    pub avoidance: AvoidanceConfig,
    pub grid:      GridSpec,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            class:                MovementClass::Land,
            max_slope_angle:      10.0,
            cruise_speed:         20.0,
            max_speed:            30.0,
            max_drift:            10.0,
            target_pitch:         0.0,
            bank_angle:           0.0,
            weave_factor:         6.5,
            steer_mult:           6.0,
            steer_damping:        3.0,
            min_engagement_range: 500.0,
            max_engagement_range: 4_000.0,
            avoid_mass:           0.0,
            combat_altitude:      -75.0,
            broadside_attack:   false,
            orbit_direction:    OrbitDirection::Either,
            maintain_min_range: false,
            powered_steering:   true,
            maneuver_rcs:       false,
            up_to_eleven:       false,
            avoidance: AvoidanceConfig::default(),
            grid:      GridSpec::default(),
        }
    }
}

impl SurfaceConfig {
    pub fn validate(&self) -> BehaviorResult<()> {
        self.grid.validate()?;
        if self.avoidance.vessel_step_secs <= 0.0 {
            return Err(BehaviorError::Config(format!(
                "avoidance.vessel_step_secs must be positive, got {}",
                self.avoidance.vessel_step_secs
            )));
        }
        Ok(())
    }

    /// Copy with every ranged tunable clamped into the tier selected by
    /// `up_to_eleven`.  The maximum engagement range is then raised to the
    /// minimum if it ended up below it.
    pub fn clamped(mut self, diag: &mut Diagnostics) -> Self {
        use surface_bounds as b;
        let d = Self::default();
        let x = self.up_to_eleven;
        b::MAX_SLOPE_ANGLE.apply(&mut self.max_slope_angle, d.max_slope_angle, x, "max_slope_angle", diag);
        b::CRUISE_SPEED.apply(&mut self.cruise_speed, d.cruise_speed, x, "cruise_speed", diag);
        b::MAX_SPEED.apply(&mut self.max_speed, d.max_speed, x, "max_speed", diag);
        b::MAX_DRIFT.apply(&mut self.max_drift, d.max_drift, x, "max_drift", diag);
        b::TARGET_PITCH.apply(&mut self.target_pitch, d.target_pitch, x, "target_pitch", diag);
        b::BANK_ANGLE.apply(&mut self.bank_angle, d.bank_angle, x, "bank_angle", diag);
        b::WEAVE_FACTOR.apply(&mut self.weave_factor, d.weave_factor, x, "weave_factor", diag);
        b::STEER_MULT.apply(&mut self.steer_mult, d.steer_mult, x, "steer_mult", diag);
        b::STEER_DAMPING.apply(&mut self.steer_damping, d.steer_damping, x, "steer_damping", diag);
        b::MIN_ENGAGEMENT_RANGE.apply(&mut self.min_engagement_range, d.min_engagement_range, x, "min_engagement_range", diag);
        b::MAX_ENGAGEMENT_RANGE.apply(&mut self.max_engagement_range, d.max_engagement_range, x, "max_engagement_range", diag);
        b::AVOID_MASS.apply(&mut self.avoid_mass, d.avoid_mass, x, "avoid_mass", diag);
        b::COMBAT_ALTITUDE.apply(&mut self.combat_altitude, d.combat_altitude, x, "combat_altitude", diag);

        if self.max_engagement_range < self.min_engagement_range {
            warn!(
                min = self.min_engagement_range,
                max = self.max_engagement_range,
                "max_engagement_range below min_engagement_range, raising it"
            );
            diag.clamped_config += 1;
            self.max_engagement_range = self.min_engagement_range;
        }
        self.avoidance = self.avoidance.clamped(diag);
        self
    }
}

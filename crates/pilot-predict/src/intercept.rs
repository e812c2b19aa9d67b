//! Intercept planning: burn-time estimates, the near-intercept predicate,
//! the closest-approach lead point and the escape check.

use pilot_agent::{Agent, PublicStatus};
use pilot_core::Vec3;
use pilot_core::math::{angle_deg, clamp, project_on_plane, rotate_towards};

use crate::{MAX_CPA_HORIZON, MIN_CLOSING_SPEED, displacement, predict_position, solve_time, time_to_cpa};

/// Largest angle the lead point may deviate from the line of sight.
const MAX_LEAD_DEVIATION_DEG: f32 = 22.5;

/// Damping fraction used when estimating rotation time.  Planning to reach
/// the burn attitude over 75% of the arc bounds overshoot on the final turn.
const ROTATE_DAMPING: f32 = 0.75;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Relative picture of one target as seen from the controlled vessel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Geometry {
    /// `target.position - my.position`
    pub to_target:    Vec3,
    /// `my.velocity - target.velocity`
    pub rel_vel:      Vec3,
    pub target_accel: Vec3,
}

impl Geometry {
    pub fn between(me: &Agent, target: &PublicStatus) -> Self {
        Self {
            to_target:    target.position() - me.position(),
            rel_vel:      me.velocity() - target.velocity(),
            target_accel: target.acceleration(),
        }
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.to_target.length()
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.to_target.normalize_or_zero()
    }

    /// Positive when closing.
    #[inline]
    pub fn closing_speed(&self) -> f32 {
        self.rel_vel.dot(self.direction())
    }
}

// ── Burn estimate ─────────────────────────────────────────────────────────────

/// Time needed to stop relative motion: null the velocity at full thrust,
/// after first turning to the burn attitude.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BurnEstimate {
    pub kill_velocity: f32,
    pub rotate:        f32,
}

impl BurnEstimate {
    #[inline]
    pub fn total(&self) -> f32 {
        self.kill_velocity + self.rotate
    }
}

/// Estimate the braking burn against `rel_vel` for a vessel pointing `nose`.
pub fn burn_estimate(rel_vel: Vec3, nose: Vec3, max_accel: f32, max_angular_accel: f32) -> BurnEstimate {
    let kill_velocity = rel_vel.length() / max_accel.max(0.01);
    let arc = angle_deg(nose, -rel_vel).to_radians();
    let rotate = solve_time(arc * ROTATE_DAMPING, max_angular_accel.abs(), 0.0) / ROTATE_DAMPING;
    BurnEstimate { kill_velocity, rotate }
}

/// `true` once waiting any longer to brake would overshoot the closest
/// approach.  Equality counts as near.
#[inline]
pub fn is_near_intercept(time_to_cpa: f32, burn: &BurnEstimate) -> bool {
    time_to_cpa > 0.0 && time_to_cpa <= burn.total()
}

/// Full near-intercept test for a vessel against `geom`.
///
/// False when not closing by at least [`MIN_CLOSING_SPEED`] or when the lead
/// point is not being approached at all.
pub fn near_intercept(me: &Agent, geom: &Geometry, min_range: f32, gun_range: f32) -> bool {
    let burn = burn_estimate(geom.rel_vel, me.orientation.nose, me.max_acceleration, me.max_angular_acceleration);

    if geom.closing_speed() < MIN_CLOSING_SPEED {
        return false;
    }

    let lead = closest_approach_point(geom, min_range, gun_range);
    let t = time_to_cpa(lead, -geom.rel_vel, Vec3::ZERO, MAX_CPA_HORIZON);
    is_near_intercept(t, &burn)
}

// ── Lead point ────────────────────────────────────────────────────────────────

/// Aim point (relative to the controlled vessel) for an intercept burn.
///
/// The line of sight is offset sideways, along our lateral drift, by the
/// pair's actual closest-approach distance clamped to
/// `[min_range, gun_range / 2]`.  That distance is the same whichever side
/// computes it, so two vessels targeting each other settle on a common
/// standoff instead of fighting over whose minimum range wins.  The result is
/// never more than 22.5° off the line of sight.  A target accelerating away
/// is led by its acceleration along the line of sight.
pub fn closest_approach_point(geom: &Geometry, min_range: f32, gun_range: f32) -> Vec3 {
    let target_rel_vel = -geom.rel_vel;
    let t_cpa = time_to_cpa(geom.to_target, target_rel_vel, Vec3::ZERO, MAX_CPA_HORIZON);
    let actual_ca = geom.to_target + displacement(target_rel_vel, Vec3::ZERO, t_cpa);
    let lateral = project_on_plane(geom.rel_vel, geom.to_target).normalize_or_zero();

    let dir = geom.direction();
    let accel_away = geom.target_accel.dot(dir);
    let mut aim = geom.to_target;
    if accel_away > 0.0 {
        aim += displacement(Vec3::ZERO, dir * accel_away, t_cpa.min(999.0));
    }

    let offset = clamp(actual_ca.length(), min_range, gun_range * 0.5);
    rotate_towards(aim, aim + lateral * offset, MAX_LEAD_DEVIATION_DEG.to_radians(), f32::MAX)
}

// ── Relative rates and escape ─────────────────────────────────────────────────

/// Line-of-sight rotation rate in degrees per second.
pub fn angular_velocity_deg(geom: &Geometry) -> f32 {
    angle_deg(geom.to_target, geom.to_target + geom.rel_vel)
}

/// `true` if, after turning around and burning away, relative drift would
/// still carry us inside `min_range`, so a deliberate escape burn is needed.
pub fn away_check(me: &Agent, geom: &Geometry, min_range: f32) -> bool {
    let escape = -geom.direction();
    let target_rel_vel = -geom.rel_vel;

    let arc = angle_deg(me.orientation.nose, escape).to_radians();
    let t_rotate = solve_time(arc / 2.0, me.max_angular_acceleration.abs(), 0.0) * 2.0;
    let t_displace = solve_time(
        min_range - geom.distance(),
        me.max_acceleration,
        geom.rel_vel.dot(escape),
    );
    let t_escape = t_rotate * 2.0 + t_displace;

    let drift = predict_position(geom.to_target, target_rel_vel, Vec3::ZERO, t_escape);
    drift.length_squared() < min_range * min_range
}

/// May we chase `target`?  Always, unless its public tag says it is
/// withdrawing; then only when it is already in gun range, when we out-
/// accelerate it, or when we are already closing.
pub fn can_intercept(target: &PublicStatus, geom: &Geometry, max_accel: f32, gun_range: f32) -> bool {
    if !target.is_withdrawing() {
        return true;
    }
    geom.to_target.length_squared() < gun_range * gun_range
        || max_accel * max_accel > target.acceleration().length_squared()
        || (-geom.rel_vel).dot(geom.to_target) < 0.0
}

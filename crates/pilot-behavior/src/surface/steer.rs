//! Attitude and throttle control for surface vehicles.
//!
//! Turns the tick's intent (direction, speed, reverse and aim flags) into
//! pitch/yaw/roll/wheel-steer scalars and a proportional throttle.

use pilot_agent::Agent;
use pilot_core::math::{angle_deg, clamp, clamp01, project_on_plane, rotate_towards, signed_angle_deg};
use pilot_core::{Diagnostics, MovementClass, Vec3};
use pilot_spatial::TerrainQuery;

use crate::{SurfaceCommand, SurfaceConfig};

/// Half the baseline, in metres, over which terrain slope is sampled.
pub const TERRAIN_OFFSET: f32 = 5.0;

/// Throttle per unit of speed error.
pub const SPEED_GAIN: f32 = 0.25;

/// Brakes engage when commanded and actual speed oppose by more than this.
pub const BRAKE_SPEED: f32 = 5.0;

/// Beyond this angle between nose and velocity we are moving backwards.
const REVERSE_ANGLE_DEG: f32 = 110.0;

const SUBMARINE_PITCH_INTEGRAL: f32 = 0.4;

/// What the behavior logic asked for this tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intent {
    pub direction: Vec3,
    pub speed:     f32,
    pub reversing: bool,
    /// Pointing a fixed weapon: tighter gains, no weave.
    pub aiming:    bool,
}

impl Intent {
    /// Stand still facing the way we already face.
    pub fn hold(me: &Agent) -> Self {
        Self { direction: me.orientation.nose, speed: 0.0, reversing: false, aiming: false }
    }
}

/// Per-vehicle controller state carried between ticks.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Steering {
    direction_integral: Vec3,
}

impl Steering {
    /// Fill in the attitude part of `out`.
    ///
    /// `weave` is the yaw offset in degrees; `depth` the submarine's wanted
    /// altitude (ignored for other classes).
    #[allow(clippy::too_many_arguments)]
    pub fn attitude(
        &mut self,
        cfg:     &SurfaceConfig,
        me:      &Agent,
        terrain: &dyn TerrainQuery,
        intent:  &Intent,
        weave:   f32,
        depth:   f32,
        dt:      f32,
        diag:    &mut Diagnostics,
        out:     &mut SurfaceCommand,
    ) {
        let o = me.orientation;
        let up = me.up;
        let vel = me.velocity();
        let horizontal = me.horizontal_velocity();
        let mobile = cfg.class.is_mobile();

        // ── Yaw ───────────────────────────────────────────────────────────
        let mut yaw_target = project_on_plane(intent.direction, o.top);
        let mut drift_mult = 1.0;
        if mobile && horizontal.length() * 10.0 > cfg.cruise_speed {
            drift_mult = (angle_deg(vel, yaw_target) / cfg.max_drift).max(1.0);
            yaw_target = rotate_towards(vel, yaw_target, cfg.max_drift.to_radians(), 0.0);
        }
        let invert = angle_deg(horizontal, o.nose) > 90.0 && (me.speed() * 10.0).round() / 10.0 > 1.0;
        let heading = if invert { -o.nose } else { o.nose };
        let yaw_error = signed_angle_deg(heading, yaw_target, o.right) + if intent.aiming { 0.0 } else { weave };

        // ── Pitch ─────────────────────────────────────────────────────────
        let pitch_now = 90.0 - angle_deg(o.nose, up);
        let mut pitch_integral = 0.0;
        let pitch_error = match cfg.class {
            MovementClass::Stationary => {
                signed_angle_deg(o.nose, project_on_plane(intent.direction, o.right), o.top)
            }
            MovementClass::Submarine => {
                let alt = me.situation.altitude;
                let ratio = if alt > depth { 1.0 - alt / depth } else { 1.0 - depth / alt };
                let ratio = diag.finite_or(ratio, 0.0, "submarine depth ratio");
                let pitch_angle = if alt > depth { -cfg.max_slope_angle * ratio } else { cfg.max_slope_angle * ratio };
                let error = pitch_angle - pitch_now;

                let mut integral = project_on_plane(
                    self.direction_integral + (o.top * error + o.right * yaw_error) * dt,
                    o.nose,
                );
                if integral.length_squared() > 1.0 {
                    integral = integral.normalize();
                }
                self.direction_integral = integral;
                pitch_integral = SUBMARINE_PITCH_INTEGRAL * integral.dot(o.top);
                error
            }
            _ => {
                let pitch_angle = if intent.aiming {
                    signed_angle_deg(o.nose, project_on_plane(intent.direction, o.right), o.top)
                } else {
                    slope_deg(terrain, me.position(), o.nose)
                        + cfg.target_pitch * clamp01(horizontal.length() / cfg.cruise_speed)
                };
                pitch_angle - pitch_now
            }
        };

        // ── Roll ──────────────────────────────────────────────────────────
        let roll_error = if mobile {
            let base_roll = slope_deg(terrain, me.position(), o.right);
            let drift = signed_angle_deg(o.nose, horizontal, o.right);
            let bank = signed_angle_deg(o.top, up, -o.right);
            let target_roll = base_roll
                + cfg.bank_angle * clamp01(drift / cfg.max_drift) * clamp01(me.speed() / cfg.cruise_speed);
            target_roll - bank
        } else {
            signed_angle_deg(o.top, up, o.right)
        };

        // ── Gains ─────────────────────────────────────────────────────────
        let av = me.angular_velocity;
        let (kp, ky, kw) = if intent.aiming { (0.02, 0.007, 0.005) } else { (0.015, 0.005, 0.003) };
        let steer = cfg.steer_mult;
        let damp = cfg.steer_damping;

        // Positive commands drive positive body rates; damping opposes them.
        out.pitch = clamp(kp * steer * pitch_error + pitch_integral - damp * av.x, -2.0, 2.0);
        out.yaw = clamp((ky * steer * yaw_error - damp * 0.2 * av.z) * drift_mult, -2.0, 2.0);
        out.roll = steer * 0.006 * roll_error - 0.4 * damp * av.y;
        out.wheel_steer = -clamp(kw * steer * yaw_error - damp * 0.1 * av.z, -2.0, 2.0);

        out.pitch = diag.finite_or(out.pitch, 0.0, "pitch command");
        out.yaw = diag.finite_or(out.yaw, 0.0, "yaw command");
        out.roll = diag.finite_or(out.roll, 0.0, "roll command");
        out.wheel_steer = diag.finite_or(out.wheel_steer, 0.0, "wheel steer command");

        if cfg.maneuver_rcs && [out.pitch, out.yaw, out.roll].iter().any(|c| c.abs() >= 1.0) {
            out.rcs_enabled = true;
        }
    }
}

/// Proportional speed controller.  Fills throttle, brakes and the clamped
/// target speed of `out`.
pub fn throttle(cfg: &SurfaceConfig, me: &Agent, intent: &Intent, diag: &mut Diagnostics, out: &mut SurfaceCommand) {
    let lo = if intent.reversing { -cfg.max_speed } else { 0.0 };
    let target = clamp(diag.finite_or(intent.speed, cfg.cruise_speed, "target speed"), lo, cfg.max_speed);

    let speed = me.speed();
    let signed = if angle_deg(me.horizontal_velocity(), me.orientation.nose) < REVERSE_ANGLE_DEG { speed } else { -speed };

    out.target_speed = target;
    out.brakes = target * signed < -BRAKE_SPEED;
    out.throttle = clamp((target - signed) * SPEED_GAIN, -1.0, 1.0);
}

/// Terrain slope in degrees along `axis`, sampled either side of `at`.
fn slope_deg(terrain: &dyn TerrainQuery, at: Vec3, axis: Vec3) -> f32 {
    let d = axis * TERRAIN_OFFSET;
    let ahead = at + d;
    let behind = at - d;
    (terrain.height(ahead.x, ahead.z) - terrain.height(behind.x, behind.z))
        .atan2(TERRAIN_OFFSET * 2.0)
        .to_degrees()
}

//! Resumable orbital maneuvers.
//!
//! Each variant carries the loop-local state of one long-running behavior.
//! [`Maneuver::step`] is called once per tick while the maneuver holds
//! authority: it first checks that the maneuver is still valid and not yet
//! complete, and if so writes this tick's output and returns `true`.
//! Returning `false` hands control back to the ladder.

use pilot_agent::BehaviorState;
use pilot_core::math::{clamp, clamp01, lerp, project, project_on_plane, slerp};
use pilot_core::{Diagnostics, Vec3, VesselId};
use pilot_predict::{Geometry, angular_velocity_deg, away_check, closest_approach_point, near_intercept};

use crate::orbital::ladder::{gun_ready, missile_needs_aim};
use crate::{Command, ControlContext, DebugKind, DebugVector, OrbitalCommand, OrbitalConfig};

/// Below `GRAVITY_TURN_ALTITUDE · safe` the apoapsis burn goes straight up.
const GRAVITY_TURN_ALTITUDE: f32 = 0.1;

/// Correction burns aim `SAFE_MARGIN · safe`.
const SAFE_MARGIN: f32 = 1.1;

/// Circularisation stops once the remaining delta-v squared is this small.
const CIRCULARIZED_DV_SQR: f32 = 4.0;

/// Withdrawal stops once the remaining delta-v squared is this small.
const WITHDRAWN_DV_SQR: f32 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub enum Maneuver {
    EvadeMissile { missile: VesselId },
    /// Retrograde burn off an escape trajectory.
    Escape,
    /// Gravity turn until the apoapsis clears the safe altitude.
    RaiseApoapsis,
    /// Radial burn out of the atmosphere.
    ClimbOut,
    Circularize,
    Commanded { following: bool, timer: f32 },
    Withdraw { delta_v: Vec3 },
    FireGuns { target: VesselId, solution: Vec3 },
    FireMissiles { target: VesselId, solution: Vec3 },
    Away { target: VesselId, min_range: f32 },
    Intercept { target: VesselId, min_range: f32, max_range: f32 },
    KillVelocity { target: VesselId },
    KillAngularVelocity { target: VesselId },
    DriftAway { target: VesselId, min_range: f32 },
    Drift { target: VesselId, facing: Vec3 },
    Stranded { target: VesselId, facing: Vec3 },
    Idle { armed: bool },
}

impl Maneuver {
    pub fn state(&self) -> BehaviorState {
        match self {
            Maneuver::EvadeMissile { .. } => BehaviorState::Evading,
            Maneuver::Escape | Maneuver::RaiseApoapsis | Maneuver::ClimbOut | Maneuver::Circularize => {
                BehaviorState::CorrectingOrbit
            }
            Maneuver::Commanded { following: true, .. }  => BehaviorState::Following,
            Maneuver::Commanded { following: false, .. } => BehaviorState::Moving,
            Maneuver::Withdraw { .. }                   => BehaviorState::Withdrawing,
            Maneuver::FireGuns { .. } | Maneuver::FireMissiles { .. } => BehaviorState::Firing,
            Maneuver::Away { .. }                       => BehaviorState::ManeuveringAway,
            Maneuver::Intercept { .. }                  => BehaviorState::ManeuveringToward,
            Maneuver::KillVelocity { .. }               => BehaviorState::KillingVelocity,
            Maneuver::KillAngularVelocity { .. }        => BehaviorState::KillingAngularVelocity,
            Maneuver::DriftAway { .. } | Maneuver::Drift { .. } => BehaviorState::Drifting,
            Maneuver::Stranded { .. }                   => BehaviorState::Stranded,
            Maneuver::Idle { .. }                       => BehaviorState::Idle,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Maneuver::EvadeMissile { .. }                => "Evading Missile",
            Maneuver::Escape                             => "Correcting Orbit (On escape trajectory)",
            Maneuver::RaiseApoapsis                      => "Correcting Orbit (Apoapsis too low)",
            Maneuver::ClimbOut                           => "Correcting Orbit (Falling inside atmo)",
            Maneuver::Circularize                        => "Correcting Orbit (Circularizing)",
            Maneuver::Commanded { following: false, .. } => "Maneuvering (Commanded Position)",
            Maneuver::Commanded { following: true, .. }  => "Maneuvering (Following)",
            Maneuver::Withdraw { .. }                    => "Withdrawing",
            Maneuver::FireGuns { .. }                    => "Firing Guns",
            Maneuver::FireMissiles { .. }                => "Firing Missiles",
            Maneuver::Away { .. }                        => "Maneuvering (Away)",
            Maneuver::Intercept { .. }                   => "Maneuvering (Intercept Target)",
            Maneuver::KillVelocity { .. }                => "Maneuvering (Kill Velocity)",
            Maneuver::KillAngularVelocity { .. }         => "Maneuvering (Kill Angular Velocity)",
            Maneuver::DriftAway { .. }                   => "Maneuvering (Drift Away)",
            Maneuver::Drift { .. }                       => "Maneuvering (Drift)",
            Maneuver::Stranded { .. }                    => "Stranded",
            Maneuver::Idle { armed: true }               => "Idle",
            Maneuver::Idle { armed: false }              => "Idle (Unarmed)",
        }
    }

    /// Whether the gunfire overlay may perturb this maneuver's thrusters.
    #[inline]
    pub fn takes_evasion_overlay(&self) -> bool {
        !matches!(self, Maneuver::EvadeMissile { .. })
    }

    /// Whether the status string carries the evasion suffix.
    #[inline]
    pub fn shows_evasion(&self) -> bool {
        !matches!(self, Maneuver::EvadeMissile { .. } | Maneuver::Commanded { .. })
    }

    /// Longest this maneuver may hold authority before the ladder is
    /// consulted afresh.  `interval` is the current cadence.
    pub fn time_limit(&self, cfg: &OrbitalConfig, interval: f32) -> f32 {
        match self {
            Maneuver::EvadeMissile { .. } => cfg.missile_evade_time,
            Maneuver::Commanded { .. }    => cfg.commanded_burn_time * 3.0,
            Maneuver::Withdraw { .. }     => cfg.withdraw_time_limit,
            _                             => interval,
        }
    }

    /// Reset `cmd` to this maneuver's starting settings.
    pub fn begin(&self, cfg: &OrbitalConfig, cmd: &mut OrbitalCommand) {
        *cmd = OrbitalCommand { rcs_enabled: cfg.maneuver_rcs, ..OrbitalCommand::default() };
        match self {
            Maneuver::EvadeMissile { .. } => {
                cmd.rcs_enabled = true;
                cmd.alignment_tolerance_deg = 45.0;
                cmd.throttle = 1.0;
            }
            Maneuver::Escape
            | Maneuver::RaiseApoapsis
            | Maneuver::ClimbOut
            | Maneuver::Circularize
            | Maneuver::Commanded { .. }
            | Maneuver::Withdraw { .. } => {
                cmd.throttle = 1.0;
            }
            Maneuver::FireGuns { solution, .. } | Maneuver::FireMissiles { solution, .. } => {
                cmd.rcs_enabled = true;
                cmd.lerp_attitude = false;
                cmd.attitude = *solution;
            }
            Maneuver::Away { .. } => {
                cmd.rcs_enabled = true;
                cmd.alignment_tolerance_deg = 135.0;
                cmd.throttle = 1.0;
            }
            Maneuver::Drift { facing, .. } | Maneuver::Stranded { facing, .. } => {
                cmd.rcs_enabled = true;
                cmd.attitude = *facing;
            }
            Maneuver::Intercept { .. }
            | Maneuver::KillVelocity { .. }
            | Maneuver::KillAngularVelocity { .. }
            | Maneuver::DriftAway { .. } => {
                cmd.rcs_enabled = true;
            }
            Maneuver::Idle { .. } => {}
        }
    }

    /// Run one tick.  Returns `false`, leaving `cmd` untouched, when the
    /// maneuver is complete or its subject has gone.
    pub fn step(
        &mut self,
        cfg:   &OrbitalConfig,
        ctx:   &ControlContext<'_>,
        cmd:   &mut OrbitalCommand,
        debug: &mut Vec<DebugVector>,
        diag:  &mut Diagnostics,
    ) -> bool {
        let me = ctx.me;
        match self {
            // ── Threat and orbit ──────────────────────────────────────────
            Maneuver::EvadeMissile { missile } => {
                let Some(m) = ctx.threat.incoming_missile.filter(|m| m.id == *missile) else {
                    return false;
                };
                let incoming = m.position - me.position();
                if (me.velocity() - m.velocity).dot(incoming) < 0.0 {
                    return false;
                }
                let dodge = project_on_plane(me.orientation.nose, incoming.normalize_or_zero());
                cmd.attitude = dodge;
                cmd.rcs_vector = dodge * 2.0;
                true
            }
            Maneuver::Escape => {
                let Some(o) = ctx.orbit else {
                    return false;
                };
                cmd.attitude = -o.prograde;
                true
            }
            Maneuver::RaiseApoapsis => {
                let Some(o) = ctx.orbit else {
                    return false;
                };
                let safe = o.min_safe_altitude(cfg.default_terrain_height);
                if o.apoapsis >= safe * SAFE_MARGIN {
                    return false;
                }
                let turn = if o.altitude < GRAVITY_TURN_ALTITUDE * safe {
                    1.0
                } else {
                    let shortfall = (SAFE_MARGIN * safe - o.apoapsis) / (safe * (SAFE_MARGIN - GRAVITY_TURN_ALTITUDE));
                    let t = diag.finite_or(clamp(shortfall, 0.1, 1.0), 1.0, "gravity turn");
                    clamp(t.log10() + 1.0, 0.33, 1.0)
                };
                cmd.attitude = o.horizontal.lerp(o.radial, turn);
                cmd.alignment_tolerance_deg = clamp(15.0 * turn, 5.0, 15.0);
                true
            }
            Maneuver::ClimbOut => {
                let Some(o) = ctx.orbit else {
                    return false;
                };
                let safe = o.min_safe_altitude(cfg.default_terrain_height);
                if o.apoapsis >= safe * SAFE_MARGIN && o.time_to_periapsis >= o.time_to_apoapsis {
                    return false;
                }
                cmd.attitude = o.radial;
                true
            }
            Maneuver::Circularize => {
                let Some(o) = ctx.orbit else {
                    return false;
                };
                let dv = diag.finite_vec_or(o.circular_velocity() - me.velocity(), Vec3::ZERO, "circularize delta-v");
                if dv.length_squared() <= CIRCULARIZED_DV_SQR {
                    return false;
                }
                cmd.attitude = dv.normalize_or_zero();
                cmd.throttle = lerp(0.0, 1.0, clamp01(dv.length_squared() / 100.0));
                true
            }

            // ── Commands and withdrawal ───────────────────────────────────
            Maneuver::Commanded { following, timer } => {
                let attitude = match (ctx.command, *following) {
                    (Command::MoveTo(p), false) => (*p - me.position()).normalize_or_zero(),
                    (Command::Follow { .. }, true) => match ctx.leader_status() {
                        Some(leader) => leader.nose,
                        None => return false,
                    },
                    _ => return false,
                };
                cmd.attitude = attitude;
                cmd.throttle = lerp(1.0, 0.0, clamp01(*timer / cfg.commanded_burn_time));
                *timer += ctx.dt;
                true
            }
            Maneuver::Withdraw { delta_v } => {
                if !me.propulsion || delta_v.length_squared() <= WITHDRAWN_DV_SQR {
                    return false;
                }
                *delta_v -= project(me.kinematics.acceleration, *delta_v) * ctx.dt;
                cmd.attitude = delta_v.normalize_or_zero();
                true
            }

            // ── Weapons ───────────────────────────────────────────────────
            Maneuver::FireGuns { target, solution } => {
                let Some(geom) = geometry(ctx, *target) else {
                    return false;
                };
                if !gun_ready(cfg, ctx, &geom) {
                    return false;
                }
                if let Some(s) = ctx.weapons.gun.and_then(|g| g.firing_solution) {
                    *solution = s;
                }
                cmd.attitude = *solution;
                cmd.rcs_vector = -project_on_plane(geom.rel_vel, geom.to_target);
                true
            }
            Maneuver::FireMissiles { target, solution } => {
                let Some(geom) = geometry(ctx, *target) else {
                    return false;
                };
                if !missile_needs_aim(ctx) {
                    return false;
                }
                if let Some(s) = ctx.weapons.missile.and_then(|m| m.fire_solution) {
                    *solution = s;
                }
                cmd.attitude = *solution;
                cmd.rcs_vector = -project_on_plane(geom.rel_vel, geom.to_target);
                true
            }

            // ── Maneuvering sub-ladder ────────────────────────────────────
            Maneuver::Away { target, min_range } => {
                let Some(geom) = geometry(ctx, *target) else {
                    return false;
                };
                if geom.to_target.length_squared() > *min_range * *min_range || !away_check(me, &geom, *min_range) {
                    return false;
                }
                let away = -geom.direction();
                cmd.attitude = away;
                cmd.throttle = if geom.rel_vel.dot(away) < cfg.maneuver_speed { 1.0 } else { 0.0 };
                true
            }
            Maneuver::Intercept { target, min_range, max_range } => {
                let Some(geom) = geometry(ctx, *target) else {
                    return false;
                };
                let gun_range = ctx.weapons.gun_range;
                if geom.to_target.length_squared() < *max_range * *max_range
                    || near_intercept(me, &geom, *min_range, gun_range)
                {
                    return false;
                }
                if !me.propulsion {
                    return false;
                }

                let lead = closest_approach_point(&geom, *min_range, gun_range);
                let lead_dir = lead.normalize_or_zero();
                debug.push(DebugVector { kind: DebugKind::AimPoint, value: lead });

                // Burn the difference between the wanted and the current relative velocity.
                let mut burn = lead_dir * cfg.maneuver_speed - geom.rel_vel;
                let burn_mag = burn.length();

                // Null lateral drift first.
                let max_accel = me.max_acceleration.max(f32::EPSILON);
                let lateral = project_on_plane(burn, lead_dir);
                let bend = diag.finite_or(clamp01(lateral.length() / (max_accel * 10.0)), 0.0, "intercept lateral bias");
                burn = slerp(burn.normalize_or_zero(), lateral.normalize_or_zero(), bend) * burn_mag;

                let burn_ratio = diag.finite_or(burn_mag / max_accel, 1.0, "intercept burn ratio");
                let mut throttle = if geom.rel_vel.dot(lead_dir) < cfg.maneuver_speed { 1.0 } else { 0.0 };
                if burn_ratio < 1.0 && cmd.throttle == 0.0 {
                    throttle = 0.0;
                }
                cmd.throttle = throttle * clamp(burn_ratio, 0.2, 1.0);
                cmd.attitude = if cmd.throttle > 0.0 { burn.normalize_or_zero() } else { lead_dir };
                true
            }
            Maneuver::KillVelocity { target } => {
                let Some(geom) = geometry(ctx, *target) else {
                    return false;
                };
                if geom.rel_vel.length_squared() < cfg.firing_speed * cfg.firing_speed / 9.0 {
                    return false;
                }
                cmd.attitude = (geom.target_accel - geom.rel_vel).normalize_or_zero();
                cmd.throttle = 1.0;
                true
            }
            Maneuver::KillAngularVelocity { target } => {
                let Some(geom) = geometry(ctx, *target) else {
                    return false;
                };
                if angular_velocity_deg(&geom) < cfg.firing_angular_velocity_limit / 2.0 {
                    return false;
                }
                cmd.attitude = -project_on_plane(geom.rel_vel, geom.to_target).normalize_or_zero();
                cmd.throttle = 1.0;
                true
            }
            Maneuver::DriftAway { target, min_range } => {
                let Some(geom) = geometry(ctx, *target) else {
                    return false;
                };
                if geom.to_target.length_squared() > *min_range * *min_range {
                    return false;
                }
                cmd.attitude = geom.direction();
                true
            }
            Maneuver::Drift { target, .. } | Maneuver::Stranded { target, .. } => geometry(ctx, *target).is_some(),
            Maneuver::Idle { .. } => true,
        }
    }
}

/// Geometry to `target`, if it is still the selected target and observable.
fn geometry(ctx: &ControlContext<'_>, target: VesselId) -> Option<Geometry> {
    if ctx.target != Some(target) {
        return None;
    }
    ctx.traffic.get(target).map(|t| Geometry::between(ctx.me, &t))
}

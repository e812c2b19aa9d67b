//! The orbital priority ladder.
//!
//! Walked top to bottom every tick; the first rung whose condition holds
//! names the behavior that should be running.  Rungs are ordered by
//! [`Priority`]: a lower value outranks a higher one.

use pilot_agent::PublicStatus;
use pilot_core::Vec3;
use pilot_predict::{Geometry, angular_velocity_deg, away_check, can_intercept, near_intercept};

use crate::orbital::maneuver::Maneuver;
use crate::{Command, ControlContext, OrbitalConfig, WeaponClass};

/// Delta-v burned by a withdrawal.
pub const WITHDRAW_DELTA_V: f32 = 200.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    EvadeMissile,
    CorrectOrbit,
    Commanded,
    Withdraw,
    FireGuns,
    FireMissiles,
    Engage,
    Idle,
}

/// The rung that matched, with a fresh maneuver ready to start.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub priority: Priority,
    pub maneuver: Maneuver,
}

impl Candidate {
    fn new(priority: Priority, maneuver: Maneuver) -> Self {
        Self { priority, maneuver }
    }
}

// ── Engagement envelope ───────────────────────────────────────────────────────

/// Distances the maneuvering sub-ladder works between.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Envelope {
    pub min:            f32,
    pub max:            f32,
    /// Minimum range before the selected weapon narrows it.
    pub min_projectile: f32,
    /// Selected weapon is not a missile.
    pub projectile:     bool,
}

impl Envelope {
    pub fn for_target(cfg: &OrbitalConfig, ctx: &ControlContext<'_>, target: &PublicStatus) -> Self {
        let mut min = cfg.min_engagement_range.max(target.radius + cfg.vessel_standoff_distance);
        let mut max = ctx.weapons.gun_range.max(min * 1.2);
        let min_projectile = min;
        let mut projectile = true;
        if let Some(w) = ctx.weapons.selected {
            min = w.engage_min_range.max(min);
            max = w.engage_max_range.min(max);
            projectile = w.class != WeaponClass::Missile;
        }
        Self { min, max, min_projectile, projectile }
    }

    /// Range inside which we should back off.
    #[inline]
    pub fn too_close(&self) -> f32 {
        if self.projectile { self.min_projectile } else { self.min }
    }
}

// ── Predicates ────────────────────────────────────────────────────────────────

/// Gun can fire soon, the target is inside both the gun's own range and the
/// guard range, and we are slower than the firing speed relative to it.
pub fn gun_ready(cfg: &OrbitalConfig, ctx: &ControlContext<'_>, geom: &Geometry) -> bool {
    let Some(gun) = ctx.weapons.gun else {
        return false;
    };
    let dist_sqr = geom.to_target.length_squared();
    geom.rel_vel.length_squared() < cfg.firing_speed * cfg.firing_speed
        && gun.can_fire_soon
        && dist_sqr <= gun.max_range * gun.max_range
        && dist_sqr <= ctx.weapons.gun_range * ctx.weapons.gun_range
}

/// A missile is selected and still needs aiming before launch.
pub fn missile_needs_aim(ctx: &ControlContext<'_>) -> bool {
    ctx.weapons.missile.is_some_and(|m| !m.launch_authorized)
}

/// Nearest hostile is drifting slowly enough relative to us that a
/// withdrawal burn will open the range.
pub fn should_withdraw(cfg: &OrbitalConfig, ctx: &ControlContext<'_>) -> bool {
    ctx.nearest_hostile().is_some_and(|h| {
        let rel = ctx.me.velocity() - h.velocity();
        rel.length_squared() < cfg.vessel_standoff_distance * cfg.vessel_standoff_distance
    })
}

/// Away from the average bearing of visible hostiles.
pub fn withdraw_direction(ctx: &ControlContext<'_>) -> Vec3 {
    let here = ctx.me.position();
    let sum: Vec3 = ctx
        .hostiles
        .iter()
        .filter_map(|&id| ctx.traffic.get(id))
        .map(|h| (h.position() - here).normalize_or_zero())
        .sum();
    -sum.normalize_or_zero()
}

// ── Ladder ────────────────────────────────────────────────────────────────────

/// Walk the ladder.  Always returns a rung; the last one is idle.
pub fn decide(cfg: &OrbitalConfig, ctx: &ControlContext<'_>) -> Candidate {
    let me = ctx.me;

    // 1. Imminent missile.
    if let Some(m) = ctx.threat.missile_to_evade() {
        return Candidate::new(Priority::EvadeMissile, Maneuver::EvadeMissile { missile: m.id });
    }

    // 2. Unsafe orbit.
    if let Some(orbit) = ctx.orbit {
        let safe = orbit.min_safe_altitude(cfg.default_terrain_height);
        if orbit.is_unsafe(safe) {
            let m = if orbit.is_escaping() {
                Maneuver::Escape
            } else if orbit.apoapsis < safe {
                Maneuver::RaiseApoapsis
            } else if orbit.altitude < safe {
                Maneuver::ClimbOut
            } else {
                Maneuver::Circularize
            };
            return Candidate::new(Priority::CorrectOrbit, m);
        }
    }

    // 3. Commanded move.
    if me.propulsion {
        match ctx.command {
            Command::MoveTo(_) => {
                return Candidate::new(Priority::Commanded, Maneuver::Commanded { following: false, timer: 0.0 });
            }
            Command::Follow { .. } => {
                return Candidate::new(Priority::Commanded, Maneuver::Commanded { following: true, timer: 0.0 });
            }
            _ => {}
        }
    }

    // 4. Unarmed: leave.
    if cfg.allow_withdrawal && me.propulsion && !me.weapons && should_withdraw(cfg, ctx) {
        let normal = ctx.orbit.map_or(me.orientation.right, |o| o.normal);
        let side = if withdraw_direction(ctx).dot(normal) > 0.0 { 1.0 } else { -1.0 };
        return Candidate::new(Priority::Withdraw, Maneuver::Withdraw { delta_v: normal * side * WITHDRAW_DELTA_V });
    }

    let Some(target) = ctx.target_status() else {
        return Candidate::new(Priority::Idle, Maneuver::Idle { armed: me.weapons });
    };
    let geom = Geometry::between(me, &target);

    // 5. Guns.
    if gun_ready(cfg, ctx, &geom) {
        return Candidate::new(Priority::FireGuns, Maneuver::FireGuns { target: target.id, solution: geom.direction() });
    }

    // 6. Missiles.
    if missile_needs_aim(ctx) {
        return Candidate::new(
            Priority::FireMissiles,
            Maneuver::FireMissiles { target: target.id, solution: geom.direction() },
        );
    }

    // 7. Maneuvering sub-ladder.
    if me.weapons {
        return Candidate::new(Priority::Engage, engage(cfg, ctx, &target, &geom));
    }

    // 8.
    Candidate::new(Priority::Idle, Maneuver::Idle { armed: me.weapons })
}

/// Too close → burn away; too far and reachable → intercept; otherwise null
/// relative velocity, then line-of-sight rate; otherwise drift.
fn engage(cfg: &OrbitalConfig, ctx: &ControlContext<'_>, target: &PublicStatus, geom: &Geometry) -> Maneuver {
    let me = ctx.me;
    let env = Envelope::for_target(cfg, ctx, target);
    let range = geom.distance();
    let id = target.id;

    if range < env.too_close() && away_check(me, geom, env.min) {
        return Maneuver::Away { target: id, min_range: env.min };
    }

    let near_int = me.propulsion && range > env.max && near_intercept(me, geom, env.min, ctx.weapons.gun_range);
    if me.propulsion
        && range > env.max
        && !near_int
        && can_intercept(target, geom, me.max_acceleration, ctx.weapons.gun_range)
    {
        return Maneuver::Intercept { target: id, min_range: env.min, max_range: env.max };
    }

    if me.propulsion && (geom.rel_vel.length_squared() > cfg.firing_speed * cfg.firing_speed || near_int) {
        return Maneuver::KillVelocity { target: id };
    }
    if me.propulsion && angular_velocity_deg(geom) > cfg.firing_angular_velocity_limit {
        return Maneuver::KillAngularVelocity { target: id };
    }

    let facing = geom.direction();
    if !me.propulsion {
        Maneuver::Stranded { target: id, facing }
    } else if range < env.min {
        Maneuver::DriftAway { target: id, min_range: env.min }
    } else {
        Maneuver::Drift { target: id, facing }
    }
}

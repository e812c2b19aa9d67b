//! The surface variant: ground and sea vehicles.
//!
//! Evaluated from scratch every physics tick:
//!
//! ```text
//! panic checks ─► local avoidance ─► engage target ─► follow leader ─► goto
//!      │                 │                 │                │           │
//!      │                 └─────────────────┴──── tactical overlay ──────┘
//!      ▼                                           │
//!  attitude control + throttle ◄───────────────────┘
//! ```
//!
//! Stationary emplacements skip the panic checks, avoidance and movement and
//! only aim.

pub mod route;
pub mod steer;

use tracing::debug;

use pilot_agent::{Agent, BehaviorState, PublicStatus};
use pilot_avoid::{AvoidanceInput, AvoidanceOutcome, LocalAvoidance};
use pilot_core::math::{angle_deg, clamp, clamp01, project_on_plane, rotate_towards, sign};
use pilot_core::{Diagnostics, MovementClass, Vec3, VesselId, VesselRng};
use pilot_predict::time_to_cpa;
use pilot_spatial::{Pathfinder, TraversalProfile};

use crate::evasion::{WEAVE_MISSILE_RANGE, Weave};
use crate::{
    ActuatorCommand, BehaviorResult, Command, ControlContext, DebugKind, DebugVector, OrbitDirection, Pilot, Status,
    SurfaceCommand, SurfaceConfig, TickReport, WeaponClass,
};

use route::{ARRIVAL_RADIUS, Navigator};
use steer::{Intent, Steering};

/// Muzzle velocity assumed when the selected gun reports none.
pub const DEFAULT_SHOT_SPEED: f32 = 1_000.0;

/// Broadside approach angle at maximum engagement range, in degrees.
pub const ATTACK_ANGLE_AT_MAX_RANGE: f32 = 30.0;

/// Below this horizontal speed a target counts as stationary.
const SLOW_TARGET_SPEED: f32 = 10.0;

/// Fixed guns steer by their firing solution when it is this close to the nose.
const FIXED_GUN_STEER_DEG: f32 = 20.0;

/// Submarine depths.
const PERISCOPE_DEPTH: f32 = -10.0;
const SURFACED_DEPTH: f32 = 1.0;

/// Scan countdown values at which bypass and broadside checks run.
const BYPASS_CHECK_TICK: u32 = 5;
const SIDESLIP_CHECK_TICK: u32 = 10;

/// Seconds ahead a broadside attacker checks its own track for land.
const SIDESLIP_LOOKAHEAD: f32 = 10.0;

/// Pilot for ground, sea and submarine vehicles and fixed emplacements.
pub struct SurfacePilot {
    cfg:       SurfaceConfig,
    avoidance: LocalAvoidance,
    nav:       Navigator,
    steering:  Steering,
    weave:     Weave,
    /// `+1` keeps the target to port when attacking broadside, `-1` to starboard.
    side_slip: f32,
    /// Target we are currently opening range from.
    extending: Option<VesselId>,
    state:     BehaviorState,
    diag:      Diagnostics,
}

impl SurfacePilot {
    /// Build a pilot for `vessel`.  Out-of-range tunables are clamped into the
    /// tier `cfg.up_to_eleven` selects.
    pub fn new(cfg: SurfaceConfig, seed: u64, vessel: VesselId) -> BehaviorResult<Self> {
        cfg.validate()?;
        let mut diag = Diagnostics::default();
        let cfg = cfg.clamped(&mut diag);
        let mut rng = VesselRng::new(seed, vessel);
        let side_slip = match cfg.orbit_direction {
            OrbitDirection::Port => 1.0,
            OrbitDirection::Starboard => -1.0,
            OrbitDirection::Either => {
                if rng.gen_bool(0.5) { 1.0 } else { -1.0 }
            }
        };
        let profile = TraversalProfile {
            class:             cfg.class,
            max_slope_deg:     cfg.max_slope_angle,
            min_obstacle_mass: cfg.avoid_mass,
        };
        Ok(Self {
            avoidance: LocalAvoidance::new(cfg.avoidance),
            nav: Navigator::new(profile, cfg.grid),
            steering: Steering::default(),
            weave: Weave::default(),
            side_slip,
            extending: None,
            state: BehaviorState::Idle,
            diag,
            cfg,
        })
    }

    /// Replace the default A* planner.
    pub fn with_pathfinder(mut self, pathfinder: Box<dyn Pathfinder>) -> Self {
        let profile = TraversalProfile {
            class:             self.cfg.class,
            max_slope_deg:     self.cfg.max_slope_angle,
            min_obstacle_mass: self.cfg.avoid_mass,
        };
        self.nav = Navigator::with_pathfinder(profile, self.cfg.grid, pathfinder);
        self
    }

    #[inline]
    pub fn config(&self) -> &SurfaceConfig {
        &self.cfg
    }

    #[inline]
    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    #[inline]
    pub fn avoidance(&self) -> &LocalAvoidance {
        &self.avoidance
    }

    // ── Panic checks ──────────────────────────────────────────────────────

    /// Situations in which driving makes no sense.
    fn panic(&self, me: &Agent, intent: &mut Intent) -> Option<Status> {
        let s = me.situation;
        let class = self.cfg.class;
        let status = if !(s.grounded() || s.submerged) {
            intent.direction = me.horizontal_velocity();
            Status::new(BehaviorState::Custom, "Airtime!")
        } else if s.landed && !s.splashed && !class.crosses_land() {
            Status::new(BehaviorState::Stranded, "Stranded")
        } else if s.splashed && !class.crosses_water() {
            Status::new(BehaviorState::Stranded, "Floating")
        } else if s.submerged && class != MovementClass::Submarine {
            Status::new(BehaviorState::Stranded, "Sunk")
        } else {
            return None;
        };
        intent.speed = 0.0;
        Some(status)
    }

    // ── Pilot logic ───────────────────────────────────────────────────────

    fn pilot_logic(
        &mut self,
        ctx:      &ControlContext<'_>,
        waypoint: Option<Vec3>,
        intent:   &mut Intent,
        debug:    &mut Vec<DebugVector>,
    ) -> Status {
        let me = ctx.me;
        let mobile = self.cfg.class.is_mobile();

        if mobile {
            let input = AvoidanceInput {
                me,
                traffic:          ctx.traffic,
                scenery:          ctx.scenery,
                incoming_missile: ctx.threat.incoming_missile.map(|m| m.id),
                avoid_mass:       self.cfg.avoid_mass,
                max_slope_deg:    self.cfg.max_slope_angle,
                max_drift_deg:    self.cfg.max_drift,
                max_speed:        self.cfg.max_speed,
            };
            let outcome = self.avoidance.update(&input);

            let dodge = self.avoidance.dodge();
            if dodge != Vec3::ZERO {
                debug.push(DebugVector { kind: DebugKind::AvoidanceNormal, value: dodge });
            }
            debug.extend(
                self.avoidance
                    .contacts()
                    .iter()
                    .map(|h| DebugVector { kind: DebugKind::AvoidanceContact, value: h.point }),
            );

            if let AvoidanceOutcome::Avoid(report) = outcome {
                intent.direction = report.direction;
                intent.speed = report.speed;
                intent.reversing = report.reversing;
                self.nav.mark_left_path();
                return Status::new(report.state, report.reason);
            }
        }

        self.nav
            .clear_stale_bypass(ctx.target, ctx.command.leader(), |id| ctx.traffic.get(id).map(|s| s.position()));

        if self.nav.bypass().is_none() {
            if me.weapons
                && let Some(target) = ctx.target_status()
            {
                return self.engage(ctx, &target, intent);
            }
            if mobile
                && let Command::Follow { offset, .. } = ctx.command
                && let Some(leader) = ctx.leader_status()
            {
                return self.follow(ctx, &leader, *offset, intent);
            }
        }

        if mobile && let Some(status) = self.goto(ctx, waypoint, intent, debug) {
            return status;
        }

        intent.direction = me.orientation.nose;
        Status::new(BehaviorState::Idle, "Not doing anything in particular")
    }

    fn engage(&mut self, ctx: &ControlContext<'_>, target: &PublicStatus, intent: &mut Intent) -> Status {
        let me = ctx.me;
        let up = me.up;
        let cfg = &self.cfg;
        let (min, max) = (cfg.min_engagement_range, cfg.max_engagement_range);

        self.nav.mark_left_path();
        if self.avoidance.countdown() == BYPASS_CHECK_TICK {
            self.nav.check_bypass(ctx.terrain, me.position(), target, &mut self.diag);
        }

        // Lead the target by the flight time of a shot.
        let distance = (target.position() - me.position()).length();
        let shot_speed = ctx
            .weapons
            .gun
            .map(|g| g.bullet_velocity)
            .filter(|v| *v > 0.0)
            .unwrap_or(DEFAULT_SHOT_SPEED);
        let lead_time = time_to_cpa(
            me.position() - target.position(),
            me.velocity() + me.orientation.nose * shot_speed - target.velocity(),
            -target.acceleration(),
            max / shot_speed,
        );
        let to_target = target.kinematics.position_at(lead_time) - me.position();

        match cfg.class {
            MovementClass::Stationary => {
                if distance < min || distance > max {
                    return Status::new(BehaviorState::Idle, "On Alert");
                }
                intent.direction = to_target;
                intent.aiming = true;
            }
            _ if cfg.broadside_attack => {
                let mut side = to_target.cross(up);
                if self.avoidance.countdown() == SIDESLIP_CHECK_TICK
                    && !self.nav.is_traversable(
                        ctx.terrain,
                        me.position(),
                        me.kinematics.position_at(SIDESLIP_LOOKAHEAD),
                    )
                {
                    // Running ashore: swap sides.
                    self.side_slip = -sign(me.orientation.nose.dot(side));
                }
                side *= self.side_slip;
                let step = diag_sidestep(cfg, distance, &mut self.diag);
                intent.direction = to_target.normalize_or_zero().lerp(side.normalize_or_zero(), step);
                intent.speed = cfg.max_speed;
            }
            _ => {
                let opposing = target.horizontal_speed(up) < SLOW_TARGET_SPEED
                    || target.nose.dot(me.orientation.nose) < 0.0;
                let too_close = distance < min
                    || (distance < (min * 3.0 + max) / 4.0 && self.extending == Some(target.id));
                if !cfg.maintain_min_range && opposing && too_close {
                    self.extending = Some(target.id);
                    intent.direction = -to_target;
                    intent.speed = cfg.max_speed;
                    return Status::new(BehaviorState::ManeuveringAway, "Extending");
                }
                self.extending = None;

                intent.direction = project_on_plane(to_target, up);
                if ctx.weapons.selected_class().is_some_and(WeaponClass::is_projectile)
                    && let Some(gun) = ctx.weapons.gun
                    && gun.fixed
                    && let Some(solution) = gun.firing_solution
                {
                    intent.aiming = true;
                    if angle_deg(solution, me.orientation.nose) < FIXED_GUN_STEER_DEG {
                        intent.direction = solution;
                    }
                }

                if distance >= max || distance <= min * 1.25 {
                    if distance >= max {
                        intent.speed = cfg.max_speed;
                    }
                    if distance <= min * 1.25 {
                        if cfg.maintain_min_range {
                            let mut status = Status::new(BehaviorState::ManeuveringToward, "Engaging target");
                            if target.velocity().length() < SLOW_TARGET_SPEED {
                                intent.speed = 0.0;
                                status = Status::new(BehaviorState::KillingVelocity, "Braking");
                            }
                            if distance <= min {
                                intent.reversing = true;
                                intent.speed = -cfg.max_speed;
                                return Status::new(BehaviorState::Reversing, "Reversing");
                            }
                            return status;
                        }
                        intent.speed = cfg.max_speed;
                    }
                } else if cfg.maintain_min_range {
                    // Slow down inside the envelope to stretch the shooting window.
                    let floor = cfg.cruise_speed / 10.0;
                    let t = self.diag.finite_or((distance - min) / (max - min), 1.0, "engagement speed schedule");
                    intent.speed = floor + (cfg.max_speed - floor) * t;
                } else {
                    intent.speed = cfg.max_speed;
                }

                let lo = if cfg.powered_steering {
                    cfg.cruise_speed / 5.0
                } else if intent.reversing {
                    -cfg.max_speed
                } else {
                    0.0
                };
                intent.speed = clamp(intent.speed, lo, cfg.max_speed);
            }
        }
        Status::new(BehaviorState::ManeuveringToward, "Engaging target")
    }

    fn follow(&mut self, ctx: &ControlContext<'_>, leader: &PublicStatus, offset: Vec3, intent: &mut Intent) -> Status {
        let me = ctx.me;
        let up = me.up;
        let nose = me.orientation.nose;

        self.nav.mark_left_path();
        if self.avoidance.countdown() == BYPASS_CHECK_TICK {
            self.nav.check_bypass(ctx.terrain, me.position(), leader, &mut self.diag);
        }

        let slot = formation_slot(leader, offset, up);
        let to_slot = slot - me.position();
        let lead_vel = leader.velocity();
        let just_ahead = to_slot.dot(nose) < 0.0
            && project_on_plane(to_slot, up).length_squared() < ARRIVAL_RADIUS * ARRIVAL_RADIUS
            && angle_deg(nose, lead_vel) < 0.8;

        intent.direction = if just_ahead {
            rotate_towards(project_on_plane(lead_vel.normalize_or_zero(), up), to_slot, 0.2, 0.0)
        } else {
            project_on_plane(to_slot, up)
        };
        intent.speed = leader.horizontal_speed(up) + to_slot.length() / 15.0;
        if intent.direction.dot(nose) < 0.0 && !self.cfg.powered_steering {
            intent.speed = 0.0;
        }
        Status::new(BehaviorState::Following, "Following")
    }

    /// Drive toward the commanded point, the active waypoint, or home.
    /// `None` once arrived.
    fn goto(
        &mut self,
        ctx:      &ControlContext<'_>,
        waypoint: Option<Vec3>,
        intent:   &mut Intent,
        debug:    &mut Vec<DebugVector>,
    ) -> Option<Status> {
        let me = ctx.me;
        let here = me.position();
        let goal = match ctx.command {
            Command::MoveTo(p) | Command::Attack(p) => *p,
            Command::RunWaypoints { .. } => waypoint?,
            Command::None | Command::Follow { .. } => self.nav.home(here),
        };

        let point = self.nav.steer_point(ctx.terrain, here, goal, &mut self.diag);
        debug.push(DebugVector { kind: DebugKind::Waypoint, value: point });

        let to_point = project_on_plane(point - here, me.up);
        if to_point.length_squared() <= ARRIVAL_RADIUS * ARRIVAL_RADIUS {
            self.nav.cycle();
            return None;
        }

        let cfg = &self.cfg;
        let bypassing = self.nav.bypass().is_some();
        let hurry = matches!(ctx.command, Command::Attack(_) | Command::RunWaypoints { .. });
        intent.direction = to_point;
        intent.speed = if bypassing {
            cfg.max_speed
        } else if self.nav.has_more_waypoints() {
            if hurry { cfg.max_speed } else { cfg.cruise_speed }
        } else {
            let cap = if matches!(ctx.command, Command::Attack(_)) { cfg.max_speed } else { cfg.cruise_speed };
            clamp((to_point.length() - ARRIVAL_RADIUS / 2.0) / 5.0, 0.0, cap)
        };
        if to_point.dot(me.orientation.nose) < 0.0 && !cfg.powered_steering {
            intent.speed = 0.0;
        }

        let reason = match self.nav.run() {
            Some(run) if run.laps() > 1 => {
                format!("Lap {}, Waypoint {} ({:.0}m)", run.lap(), run.index(), run.range())
            }
            Some(run) => format!("Waypoint {} ({:.0}m)", run.index(), run.range()),
            None if bypassing => "Repositioning".to_owned(),
            None => "Moving".to_owned(),
        };
        Some(Status::new(BehaviorState::Moving, reason))
    }

    // ── Tactical overlay ──────────────────────────────────────────────────

    /// Full speed and weave under threat.  Returns whether auxiliary
    /// thrusters should be on.
    fn tactical(&mut self, ctx: &ControlContext<'_>, intent: &mut Intent) -> bool {
        let me = ctx.me;
        let threat = ctx.threat;
        let cfg = &self.cfg;
        let threatened = threat.under_fire || threat.missile_incoming();

        let in_combat = me.weapons
            && ctx.target_status().is_some_and(|t| {
                ctx.weapons.selected.is_some()
                    || (t.position() - me.position()).length_squared()
                        < cfg.max_engagement_range * cfg.max_engagement_range
            });

        if cfg.class.is_mobile() && threatened {
            if !cfg.maintain_min_range {
                intent.speed = if intent.reversing { -cfg.max_speed } else { cfg.max_speed };
            }
            if threat.under_fire || threat.missile_distance().is_some_and(|d| d < WEAVE_MISSILE_RANGE) {
                self.weave.advance(cfg.weave_factor, ctx.dt);
            } else {
                self.weave.reset();
            }
        } else {
            self.weave.reset();
        }

        in_combat || threatened
    }

    /// Submarine cruising altitude for the current weapon and target.
    fn dive_depth(&self, ctx: &ControlContext<'_>) -> f32 {
        let Some(target) = ctx.target_status() else {
            return self.cfg.combat_altitude;
        };
        match ctx.weapons.selected {
            Some(w) if w.class == WeaponClass::Missile => PERISCOPE_DEPTH,
            Some(w) if w.class.is_projectile() && target.grounded && !ctx.weapons.gun.is_some_and(|g| g.fixed) => {
                // Surface to use turrets on grounded targets once in range.
                let range = (target.position() - ctx.me.position()).length();
                if range > w.engage_max_range { PERISCOPE_DEPTH } else { SURFACED_DEPTH }
            }
            _ => self.cfg.combat_altitude,
        }
    }
}

impl Pilot for SurfacePilot {
    fn step(&mut self, ctx: &ControlContext<'_>) -> TickReport {
        let me = ctx.me;
        let mut intent = Intent::hold(me);
        let mut debug = Vec::new();

        let course = match ctx.command {
            Command::RunWaypoints { points, laps } => Some((points.as_slice(), *laps)),
            _ => None,
        };
        let waypoint = self.nav.update_run(course, me.position(), me.up);

        let panic = if self.cfg.class.is_mobile() { self.panic(me, &mut intent) } else { None };
        let (status, rcs) = match panic {
            Some(status) => (status, false),
            None => {
                let status = self.pilot_logic(ctx, waypoint, &mut intent, &mut debug);
                let rcs = self.tactical(ctx, &mut intent);
                (status, rcs)
            }
        };

        let mut out = SurfaceCommand { target_direction: intent.direction, rcs_enabled: rcs, ..SurfaceCommand::default() };
        let depth = self.dive_depth(ctx);
        self.steering.attitude(
            &self.cfg,
            me,
            ctx.terrain,
            &intent,
            self.weave.adjustment(),
            depth,
            ctx.dt,
            &mut self.diag,
            &mut out,
        );
        steer::throttle(&self.cfg, me, &intent, &mut self.diag, &mut out);

        if status.state != self.state {
            debug!(vessel = %me.id, from = ?self.state, to = ?status.state, reason = %status.reason, "behavior changed");
        }
        self.state = status.state;

        TickReport {
            vessel:  me.id,
            status,
            command: ActuatorCommand::Surface(out),
            debug,
        }
    }

    fn behavior(&self) -> BehaviorState {
        self.state
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    fn variant(&self) -> &'static str {
        "surface"
    }
}

// ── Geometry helpers ──────────────────────────────────────────────────────────

/// World position of the slot at `offset` (`x` right, `y` up, `z` forward)
/// in the leader's level frame.
pub fn formation_slot(leader: &PublicStatus, offset: Vec3, up: Vec3) -> Vec3 {
    let forward = project_on_plane(leader.nose, up)
        .try_normalize()
        .or_else(|| project_on_plane(leader.velocity(), up).try_normalize())
        .unwrap_or_else(|| up.any_orthonormal_vector());
    let right = up.cross(forward);
    leader.position() + right * offset.x + up * offset.y + forward * offset.z
}

/// Blend factor from "straight at the target" (0) to "broadside" (1).
///
/// Beyond max range it closes to [`ATTACK_ANGLE_AT_MAX_RANGE`]; between the
/// ranges it opens to 90°; inside min range it opens further, toward 135°.
pub fn sidestep(cfg: &SurfaceConfig, distance: f32) -> f32 {
    let (min, max) = (cfg.min_engagement_range, cfg.max_engagement_range);
    let attack = ATTACK_ANGLE_AT_MAX_RANGE / 90.0;
    if distance >= max {
        let approach = cfg.cruise_speed * clamp(90.0 / cfg.max_drift, 0.0, 10.0);
        clamp01((max - distance) / approach + 1.0) * attack
    } else if distance <= min {
        1.5 - distance / (min * 2.0)
    } else {
        (max - distance) / (max - min) * (1.0 - attack) + attack
    }
}

fn diag_sidestep(cfg: &SurfaceConfig, distance: f32, diag: &mut Diagnostics) -> f32 {
    diag.finite_or(sidestep(cfg, distance), ATTACK_ANGLE_AT_MAX_RANGE / 90.0, "broadside sidestep")
}

//! The orbital variant: a priority ladder over resumable maneuvers.
//!
//! Every tick the ladder is walked to find the highest-priority applicable
//! behavior.  The maneuver already running keeps authority until it
//! completes, its time limit runs out, or a strictly higher-priority rung
//! becomes applicable.

pub mod ladder;
pub mod maneuver;

use tracing::{debug, trace};

use pilot_agent::BehaviorState;
use pilot_core::{Diagnostics, Vec3, VesselId, VesselRng};

use crate::evasion::{EvasionTuning, GunfireEvasion};
use crate::{
    ActuatorCommand, BehaviorResult, ControlContext, DebugKind, DebugVector, OrbitalCommand, OrbitalConfig, Pilot,
    Status, TickReport,
};

use ladder::{Candidate, Priority};
use maneuver::Maneuver;

/// The maneuver holding authority, with its own clock.
#[derive(Clone, Debug, PartialEq)]
struct Active {
    priority: Priority,
    maneuver: Maneuver,
    elapsed:  f32,
    limit:    f32,
    /// Direction the gunfire overlay jinks along for this maneuver.
    jitter:   Vec3,
}

impl Active {
    /// An already-expired placeholder so the first tick always starts fresh.
    fn expired() -> Self {
        Self {
            priority: Priority::Idle,
            maneuver: Maneuver::Idle { armed: false },
            elapsed:  0.0,
            limit:    0.0,
            jitter:   Vec3::ZERO,
        }
    }

    fn expired_at(&self) -> bool {
        self.elapsed >= self.limit
    }
}

/// Pilot for vessels in orbit.
pub struct OrbitalPilot {
    cfg:     OrbitalConfig,
    tuning:  EvasionTuning,
    rng:     VesselRng,
    evasion: GunfireEvasion,
    active:  Active,
    cmd:     OrbitalCommand,
    state:   BehaviorState,
    diag:    Diagnostics,
}

impl OrbitalPilot {
    /// Build a pilot for `vessel`.  Out-of-range tunables are clamped and
    /// counted; non-positive intervals are rejected.
    pub fn new(cfg: OrbitalConfig, seed: u64, vessel: VesselId) -> BehaviorResult<Self> {
        cfg.validate()?;
        let mut diag = Diagnostics::default();
        let cfg = cfg.clamped(&mut diag);
        Ok(Self {
            tuning: EvasionTuning::from(&cfg),
            cfg,
            rng: VesselRng::new(seed, vessel),
            evasion: GunfireEvasion::new(),
            active: Active::expired(),
            cmd: OrbitalCommand::default(),
            state: BehaviorState::Idle,
            diag,
        })
    }

    #[inline]
    pub fn config(&self) -> &OrbitalConfig {
        &self.cfg
    }

    /// The maneuver currently holding authority.
    #[inline]
    pub fn maneuver(&self) -> &Maneuver {
        &self.active.maneuver
    }

    #[inline]
    pub fn is_evading_gunfire(&self) -> bool {
        self.evasion.is_evading()
    }

    fn interval(&self, ctx: &ControlContext<'_>) -> f32 {
        if ctx.threat.missile_incoming() { self.cfg.emergency_update_interval } else { self.cfg.combat_update_interval }
    }

    fn start(&mut self, candidate: Candidate, ctx: &ControlContext<'_>) {
        debug!(
            vessel = %ctx.me.id,
            from = self.active.maneuver.reason(),
            to = candidate.maneuver.reason(),
            "maneuver started"
        );
        let limit = candidate.maneuver.time_limit(&self.cfg, self.interval(ctx));
        candidate.maneuver.begin(&self.cfg, &mut self.cmd);
        self.active = Active {
            priority: candidate.priority,
            maneuver: candidate.maneuver,
            elapsed:  0.0,
            limit,
            jitter:   self.rng.inside_unit_sphere(),
        };
    }

    fn step_active(&mut self, ctx: &ControlContext<'_>, debug: &mut Vec<DebugVector>) -> bool {
        self.active.maneuver.step(&self.cfg, ctx, &mut self.cmd, debug, &mut self.diag)
    }
}

impl Pilot for OrbitalPilot {
    fn step(&mut self, ctx: &ControlContext<'_>) -> TickReport {
        let evading = self.evasion.update(ctx.me, ctx.threat, ctx.target, &self.tuning, ctx.dt);
        let candidate = ladder::decide(&self.cfg, ctx);
        let mut debug = Vec::new();

        // Preempt only for a strictly higher rung or an expired clock.
        let preempt = candidate.priority < self.active.priority || self.active.expired_at();
        let mut pending = Some(candidate);
        if preempt && let Some(c) = pending.take() {
            self.start(c, ctx);
        }

        self.cmd.rcs_vector = Vec3::ZERO;
        let mut running = self.step_active(ctx, &mut debug);
        if !running && let Some(c) = pending.take() {
            self.start(c, ctx);
            running = self.step_active(ctx, &mut debug);
        }

        if !running {
            // Nothing applicable this tick: coast, pointing where we point.
            trace!(vessel = %ctx.me.id, reason = self.active.maneuver.reason(), "holding");
            self.cmd.throttle = 0.0;
            self.cmd.attitude = ctx.me.orientation.nose;
        }

        let maneuver = &self.active.maneuver;
        if maneuver.takes_evasion_overlay()
            && let Some(rcs) = self.evasion.rcs_overlay(self.active.jitter)
        {
            self.cmd.rcs_enabled = true;
            self.cmd.rcs_vector = rcs;
        }
        if self.cmd.rcs_vector != Vec3::ZERO {
            debug.push(DebugVector { kind: DebugKind::RcsVector, value: self.cmd.rcs_vector });
        }

        self.state = maneuver.state();
        let status = Status::new(self.state, maneuver.reason()).with_evasion(evading && maneuver.shows_evasion());
        self.active.elapsed += ctx.dt;

        TickReport {
            vessel: ctx.me.id,
            status,
            command: ActuatorCommand::Orbital(self.cmd),
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
        "orbital"
    }
}

//! Per-vehicle local avoidance state.

use tracing::debug;

use pilot_agent::{Agent, BehaviorState, TrafficStore};
use pilot_core::math::{clamp, clamp01, project_on_plane, rotate_towards, sign, slerp};
use pilot_core::{Vec3, VesselId};
use pilot_spatial::{ProbeHit, SceneryQuery};

use crate::probe::{ProbeInput, probe_scenery};
use crate::ticker::{CollisionTicker, TickerObservation};
use crate::vessels::scan_vessels;
use crate::AvoidanceConfig;

/// Everything avoidance reads for one tick.
pub struct AvoidanceInput<'a> {
    pub me:               &'a Agent,
    pub traffic:          &'a TrafficStore,
    pub scenery:          &'a dyn SceneryQuery,
    pub incoming_missile: Option<VesselId>,
    pub avoid_mass:       f32,
    pub max_slope_deg:    f32,
    pub max_drift_deg:    f32,
    pub max_speed:        f32,
}

/// Steering override produced while avoiding.
#[derive(Clone, Debug, PartialEq)]
pub struct AvoidanceReport {
    /// Unit direction to steer toward.
    pub direction: Vec3,
    /// Signed target speed; negative when reversing.
    pub speed:     f32,
    pub reversing: bool,
    pub state:     BehaviorState,
    pub reason:    String,
    pub encounter: Option<VesselId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AvoidanceOutcome {
    Clear,
    Avoid(AvoidanceReport),
}

impl AvoidanceOutcome {
    pub fn is_clear(&self) -> bool {
        matches!(self, AvoidanceOutcome::Clear)
    }
}

/// Local avoidance for one vehicle.  Owns the scan countdown, the hysteresis
/// counter and the dodge vector, which persist between ticks.
#[derive(Clone, Debug)]
pub struct LocalAvoidance {
    cfg:          AvoidanceConfig,
    countdown:    u32,
    ticker:       CollisionTicker,
    reversing:    bool,
    avoiding:     bool,
    dodge:        Vec3,
    threat_range: f32,
    contacts:     Vec<ProbeHit>,
}

impl LocalAvoidance {
    pub fn new(cfg: AvoidanceConfig) -> Self {
        Self {
            countdown:    cfg.initial_check_ticks,
            ticker:       CollisionTicker::new(&cfg),
            reversing:    false,
            avoiding:     false,
            dodge:        Vec3::ZERO,
            threat_range: cfg.threat_range_floor,
            contacts:     Vec::new(),
            cfg,
        }
    }

    pub fn config(&self) -> &AvoidanceConfig {
        &self.cfg
    }

    pub fn ticker(&self) -> &CollisionTicker {
        &self.ticker
    }

    /// Ticks until the next scheduled scan.
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    /// Current dodge vector (zero when nothing is being dodged).
    pub fn dodge(&self) -> Vec3 {
        self.dodge
    }

    /// Accepted scenery contacts from the latest scan.
    pub fn contacts(&self) -> &[ProbeHit] {
        &self.contacts
    }

    /// Run one control tick.
    ///
    /// Scans run every `check_interval_ticks` ticks, and every tick while the
    /// previous tick was avoiding.
    pub fn update(&mut self, input: &AvoidanceInput<'_>) -> AvoidanceOutcome {
        let cfg = self.cfg;
        let me = input.me;
        let was_reversing = self.reversing;
        self.reversing = false;

        let probe = ProbeInput::for_agent(me, was_reversing, input.max_slope_deg);
        let travel_dir = probe.direction;
        let nose = me.orientation.nose;

        let mut encounter = None;
        let mut valid_hits = 0;
        let mut alert_distance = self.threat_range;

        if self.countdown == 0 || self.avoiding {
            self.countdown = cfg.check_interval_ticks;
            self.dodge = Vec3::ZERO;

            encounter = scan_vessels(
                me,
                input.traffic,
                input.avoid_mass,
                input.incoming_missile,
                cfg.vessel_horizon(input.max_drift_deg),
                cfg.vessel_step_secs,
            );
            if let Some(e) = &encounter {
                self.dodge = e.dodge;
            }

            let sweep = probe_scenery(input.scenery, &probe, &cfg);
            self.threat_range = sweep.threat_range;
            alert_distance = sweep.alert_distance;
            valid_hits = sweep.valid_hits;
            if valid_hits > 0 {
                let t = alert_distance / sweep.threat_range.max(f32::EPSILON);
                let alert = slerp(sweep.alert_normal.normalize_or_zero(), travel_dir, t);
                self.dodge = if encounter.is_some() { (self.dodge + alert).normalize_or_zero() } else { alert };
            }
            self.contacts = sweep.contacts;

            self.ticker.observe(
                &TickerObservation {
                    blocked: valid_hits > 0,
                    speed: probe.speed,
                    alert_distance,
                    dodge_dot_nose: self.dodge.dot(nose),
                    was_reversing,
                },
                &cfg,
            );

            if self.ticker.wants_reverse() {
                self.reversing = true;
                // Peel away from the obstacle in an arc rather than straight back.
                if valid_hits > 0 && self.dodge.dot(travel_dir) > 0.0 {
                    let side = me.orientation.right * sign(self.dodge.dot(me.orientation.right));
                    let arc = clamp(alert_distance * 2.0, 0.0, 90.0).to_radians();
                    self.dodge = rotate_towards(self.dodge, side, arc, 0.0);
                }
                if !self.ticker.reverse_step(probe.speed, valid_hits > 0, &cfg) {
                    debug!(vessel = %me.id, level = self.ticker.level(), "reverse ended");
                    self.reversing = false;
                }
            } else {
                self.ticker.reset_reverse_timer();
            }
        } else {
            self.countdown -= 1;
        }

        self.avoiding = encounter.is_some() || valid_hits > 0 || self.ticker.is_avoiding(&cfg);
        if !self.avoiding {
            return AvoidanceOutcome::Clear;
        }

        let max = input.max_speed;
        let moving_forward = nose.dot(project_on_plane(me.velocity().normalize_or_zero(), me.up)) > 0.0;
        let speed = if self.reversing && moving_forward {
            -max
        } else {
            // Slow for sharp turns: 25% at 180°, 75% at 90°.
            let heading = if self.reversing { -nose } else { nose };
            clamp01(0.75 + 0.5 * heading.dot(self.dodge)) * if self.reversing { -max } else { max }
        };

        let direction = if encounter.is_some() || valid_hits > 0 { self.dodge } else { travel_dir };
        let reason = match &encounter {
            Some(e) => format!("Avoiding Collision with {}", e.name),
            None => format!("Avoiding Collision ({alert_distance:.0}m)"),
        };
        let state = if self.reversing { BehaviorState::Reversing } else { BehaviorState::AvoidingCollision };

        AvoidanceOutcome::Avoid(AvoidanceReport {
            direction,
            speed,
            reversing: self.reversing,
            state,
            reason,
            encounter: encounter.map(|e| e.with),
        })
    }
}

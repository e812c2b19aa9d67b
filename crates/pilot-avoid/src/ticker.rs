//! Blocked/reverse hysteresis counter.
//!
//! The counter sits at the normal level while driving freely.  Evidence of
//! being blocked drives it down one tick at a time; below zero the vehicle
//! reverses.  Reversing is bounded two ways: stuck at a standstill past the
//! stuck level, or reversing at speed for too long.  Either one jumps the
//! counter above the normal level, from where it drains back to normal.

use crate::AvoidanceConfig;

/// Dot products beyond this count as pointing straight ahead or behind.
const HEAD_ON_DOT: f32 = 0.866;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickerZone {
    /// Above normal: just recovered, early reversing suppressed.
    Recovering,
    Normal,
    Reversing,
    /// Below the stuck level.
    Stuck,
}

/// What a scan saw, fed to [`CollisionTicker::observe`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickerObservation {
    /// At least one accepted scenery contact.
    pub blocked:        bool,
    pub speed:          f32,
    pub alert_distance: f32,
    /// `dodge · nose`.
    pub dodge_dot_nose: f32,
    pub was_reversing:  bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CollisionTicker {
    level:         i32,
    reverse_ticks: u32,
}

impl CollisionTicker {
    pub fn new(cfg: &AvoidanceConfig) -> Self {
        Self { level: cfg.normal_level, reverse_ticks: 0 }
    }

    #[inline]
    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn zone(&self, cfg: &AvoidanceConfig) -> TickerZone {
        if self.level > cfg.normal_level {
            TickerZone::Recovering
        } else if self.level >= 0 {
            TickerZone::Normal
        } else if self.level >= cfg.stuck_level {
            TickerZone::Reversing
        } else {
            TickerZone::Stuck
        }
    }

    /// Outside the normal band, avoidance keeps control even with nothing
    /// detected.
    #[inline]
    pub fn is_avoiding(&self, cfg: &AvoidanceConfig) -> bool {
        self.level < 0 || self.level > cfg.normal_level
    }

    #[inline]
    pub fn wants_reverse(&self) -> bool {
        self.level < 0
    }

    /// Fold one scan into the counter.
    pub fn observe(&mut self, obs: &TickerObservation, cfg: &AvoidanceConfig) {
        let normal = cfg.normal_level;
        if obs.blocked {
            let wall_ahead = obs.dodge_dot_nose < -HEAD_ON_DOT;
            let wall_behind = obs.dodge_dot_nose > HEAD_ON_DOT;
            if !obs.was_reversing
                && self.level < normal
                && (obs.speed < 1.0 || obs.alert_distance < obs.speed)
                && wall_ahead
            {
                // About to hit a wall going forward: reverse early.
                self.level -= 1;
            } else if obs.was_reversing && obs.alert_distance < obs.speed && wall_behind {
                // About to hit a wall in reverse: abort and hold off.
                self.level = cfg.reverse_abort_level;
            } else if obs.was_reversing || obs.speed < 1.0 || obs.alert_distance < 2.0 * obs.speed {
                self.level -= 1;
            } else {
                self.level = self.level.max(normal);
            }
        } else if self.level < 0 || self.level > normal {
            self.level -= 1;
        } else {
            self.level = self.level.max(normal);
        }
    }

    /// Account for one reversing tick.  Returns `false` when reversing must
    /// stop: stuck at a standstill, or the reverse timer ran out.
    pub fn reverse_step(&mut self, speed: f32, blocked: bool, cfg: &AvoidanceConfig) -> bool {
        if self.level < cfg.stuck_level && speed < 1.0 {
            self.level = cfg.stuck_recovery_level;
            self.reverse_ticks = 0;
            return false;
        }
        if speed > 1.0 {
            self.reverse_ticks += 1;
            let limit = if blocked { cfg.reverse_blocked_ticks } else { cfg.reverse_clear_ticks };
            if self.reverse_ticks > limit {
                self.level = cfg.reverse_abort_level;
                self.reverse_ticks = 0;
                return false;
            }
        }
        true
    }

    #[inline]
    pub fn reset_reverse_timer(&mut self) {
        self.reverse_ticks = 0;
    }
}

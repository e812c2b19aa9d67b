//! Control-loop time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter advanced once per physics
//! step.  `ControlClock` maps ticks to seconds with a fixed step `dt`:
//!
//!   elapsed_secs = tick * dt
//!
//! Using an integer tick as the canonical unit keeps cadence arithmetic
//! (check every N ticks, bypass checks on specific tick phases) exact; float
//! seconds are derived only where the control laws need them.

use std::fmt;

use crate::{PilotError, PilotResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute control-loop tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── ControlClock ──────────────────────────────────────────────────────────────

/// Converts between tick counts and simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlClock {
    /// Seconds per physics step.
    pub dt: f32,
    /// The current tick — advanced by `ControlClock::advance()` each step.
    pub current_tick: Tick,
}

impl ControlClock {
    pub fn new(dt: f32) -> Self {
        Self { dt, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f32 {
        self.current_tick.0 as f32 * self.dt
    }

    /// How many ticks span `secs` seconds (rounds up).
    #[inline]
    pub fn ticks_for_secs(&self, secs: f32) -> u64 {
        if self.dt <= 0.0 || secs <= 0.0 {
            return 0;
        }
        (secs / self.dt).ceil() as u64
    }
}

impl fmt::Display for ControlClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s)", self.current_tick, self.elapsed_secs())
    }
}

// ── LoopConfig ────────────────────────────────────────────────────────────────

/// Top-level configuration of the host control loop.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopConfig {
    /// Physics step in seconds.  Default 0.02 (50 steps per second).
    pub dt: f32,

    /// Total ticks to run.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Report to the observer every N ticks.  1 = every tick.
    pub output_interval_ticks: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            dt:                    0.02,
            total_ticks:           3_000,
            seed:                  0,
            output_interval_ticks: 1,
        }
    }
}

impl LoopConfig {
    /// The tick at which the loop ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject a non-positive or non-finite step.
    pub fn validate(&self) -> PilotResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(PilotError::Config(format!("dt must be positive and finite, got {}", self.dt)));
        }
        Ok(())
    }

    pub fn make_clock(&self) -> ControlClock {
        ControlClock::new(self.dt)
    }
}

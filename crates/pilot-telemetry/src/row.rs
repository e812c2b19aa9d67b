//! Plain data row types written by telemetry backends.

use pilot_behavior::{DebugVector, TickReport};
use pilot_core::{Tick, Vec3};

/// One vessel's published status at a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub tick:     u64,
    pub vessel:   u32,
    /// `BehaviorState::as_str()`.
    pub state:    &'static str,
    /// Reason text including the gunfire-evasion suffix, if any.
    pub reason:   String,
    pub throttle: f32,
    /// Commanded attitude (orbital) or steering direction (surface).
    pub attitude: Vec3,
}

impl StatusRow {
    pub fn from_report(tick: Tick, report: &TickReport) -> Self {
        Self {
            tick:     tick.0,
            vessel:   report.vessel.0,
            state:    report.status.state.as_str(),
            reason:   report.status.to_string(),
            throttle: report.command.throttle(),
            attitude: report.command.heading(),
        }
    }
}

/// One debug vector emitted by a pilot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugVectorRow {
    pub tick:   u64,
    pub vessel: u32,
    pub kind:   &'static str,
    pub value:  Vec3,
}

impl DebugVectorRow {
    pub fn new(tick: Tick, vessel: u32, v: &DebugVector) -> Self {
        Self { tick: tick.0, vessel, kind: v.kind.as_str(), value: v.value }
    }
}

/// A committed behavior change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRow {
    pub tick:   u64,
    pub vessel: u32,
    pub from:   &'static str,
    pub to:     &'static str,
}

//! Per-tick output of a pilot: actuator command, status and debug vectors.

use pilot_core::{Vec3, VesselId};

use crate::Status;

// ── Actuator commands ─────────────────────────────────────────────────────────

/// Output of the orbital variant, consumed by an attitude/thrust controller.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitalCommand {
    /// Desired nose direction; zero means "no preference".
    pub attitude:                Vec3,
    /// Main engine throttle in `[0, 1]`.
    pub throttle:                f32,
    /// Translation request for the auxiliary thrusters.
    pub rcs_vector:              Vec3,
    pub rcs_enabled:             bool,
    /// Main engine only fires when within this many degrees of `attitude`.
    pub alignment_tolerance_deg: f32,
    /// Smooth attitude changes; off while aiming.
    pub lerp_attitude:           bool,
}

impl Default for OrbitalCommand {
    fn default() -> Self {
        Self {
            attitude:                Vec3::ZERO,
            throttle:                0.0,
            rcs_vector:              Vec3::ZERO,
            rcs_enabled:             false,
            alignment_tolerance_deg: 5.0,
            lerp_attitude:           true,
        }
    }
}

/// Output of the surface variant.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceCommand {
    /// Direction the controller is steering for.
    pub target_direction: Vec3,
    /// Signed commanded speed; negative when reversing.
    pub target_speed:     f32,
    /// Drive throttle in `[-1, 1]`; negative drives in reverse.
    pub throttle:         f32,
    pub brakes:           bool,
    pub pitch:            f32,
    pub yaw:              f32,
    pub roll:             f32,
    pub wheel_steer:      f32,
    pub rcs_enabled:      bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActuatorCommand {
    Orbital(OrbitalCommand),
    Surface(SurfaceCommand),
}

impl ActuatorCommand {
    pub fn throttle(&self) -> f32 {
        match self {
            ActuatorCommand::Orbital(c) => c.throttle,
            ActuatorCommand::Surface(c) => c.throttle,
        }
    }

    /// Commanded attitude (orbital) or steering direction (surface).
    pub fn heading(&self) -> Vec3 {
        match self {
            ActuatorCommand::Orbital(c) => c.attitude,
            ActuatorCommand::Surface(c) => c.target_direction,
        }
    }

    pub fn rcs_enabled(&self) -> bool {
        match self {
            ActuatorCommand::Orbital(c) => c.rcs_enabled,
            ActuatorCommand::Surface(c) => c.rcs_enabled,
        }
    }
}

// ── Debug vectors ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugKind {
    /// Combined avoidance dodge direction.
    AvoidanceNormal,
    /// Accepted scenery contact point.
    AvoidanceContact,
    /// Intercept lead point, relative to the vessel.
    AimPoint,
    /// Path waypoint, world space.
    Waypoint,
    /// Auxiliary thruster request.
    RcsVector,
}

impl DebugKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DebugKind::AvoidanceNormal  => "avoidance_normal",
            DebugKind::AvoidanceContact => "avoidance_contact",
            DebugKind::AimPoint         => "aim_point",
            DebugKind::Waypoint         => "waypoint",
            DebugKind::RcsVector        => "rcs_vector",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugVector {
    pub kind:  DebugKind,
    pub value: Vec3,
}

// ── TickReport ────────────────────────────────────────────────────────────────

/// Everything one pilot produced for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub vessel:  VesselId,
    pub status:  Status,
    pub command: ActuatorCommand,
    /// Read-only visualisation aids; never fed back into control.
    pub debug:   Vec<DebugVector>,
}

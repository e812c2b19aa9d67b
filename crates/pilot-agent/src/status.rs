//! Behavior tags and the public read-only view of a vessel.

use std::fmt;

use pilot_core::math::project_on_plane;
use pilot_core::{Vec3, VesselId};

use crate::Kinematics;

// ── BehaviorState ─────────────────────────────────────────────────────────────

/// The single top-level behavior a controller is in for one tick.
///
/// Variants are coarse on purpose; the human-readable reason string carried
/// next to it distinguishes sub-cases ("Kill Velocity", "Extending", ...).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorState {
    #[default]
    Idle,
    /// Dodging an incoming missile.
    Evading,
    CorrectingOrbit,
    AvoidingCollision,
    Withdrawing,
    Reversing,
    ManeuveringToward,
    ManeuveringAway,
    KillingVelocity,
    KillingAngularVelocity,
    Drifting,
    Firing,
    Following,
    Moving,
    Stranded,
    Custom,
}

impl BehaviorState {
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorState::Idle                   => "idle",
            BehaviorState::Evading                => "evading",
            BehaviorState::CorrectingOrbit        => "correcting_orbit",
            BehaviorState::AvoidingCollision      => "avoiding_collision",
            BehaviorState::Withdrawing            => "withdrawing",
            BehaviorState::Reversing              => "reversing",
            BehaviorState::ManeuveringToward      => "maneuvering_toward",
            BehaviorState::ManeuveringAway        => "maneuvering_away",
            BehaviorState::KillingVelocity        => "killing_velocity",
            BehaviorState::KillingAngularVelocity => "killing_angular_velocity",
            BehaviorState::Drifting               => "drifting",
            BehaviorState::Firing                 => "firing",
            BehaviorState::Following              => "following",
            BehaviorState::Moving                 => "moving",
            BehaviorState::Stranded               => "stranded",
            BehaviorState::Custom                 => "custom",
        }
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PublicStatus ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PeerKind {
    #[default]
    Vessel,
    Missile,
    /// Wreckage and other uncontrolled objects; always avoided.
    Debris,
}

/// What any vessel exposes to others: kinematics, size and its current
/// behavior tag.  Never a handle into another controller's internals.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PublicStatus {
    pub id:         VesselId,
    pub kinematics: Kinematics,
    pub nose:       Vec3,
    pub radius:     f32,
    pub mass:       f32,
    pub kind:       PeerKind,
    /// Landed or splashed.
    pub grounded:   bool,
    /// `None` for vessels without a controller.
    pub behavior:   Option<BehaviorState>,
    /// Formation leader this vessel follows, if any.
    pub leader:     Option<VesselId>,
    /// What this vessel is currently targeting, if known.
    pub target:     Option<VesselId>,
}

impl PublicStatus {
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.kinematics.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.kinematics.velocity
    }

    #[inline]
    pub fn acceleration(&self) -> Vec3 {
        self.kinematics.acceleration
    }

    pub fn horizontal_speed(&self, up: Vec3) -> f32 {
        project_on_plane(self.kinematics.velocity, up).length()
    }

    #[inline]
    pub fn is_withdrawing(&self) -> bool {
        self.behavior == Some(BehaviorState::Withdrawing)
    }
}

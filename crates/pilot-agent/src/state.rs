//! The controlled vehicle's own per-tick snapshot.

use pilot_core::math::project_on_plane;
use pilot_core::{Orientation, Vec3, VesselId};

use crate::{BehaviorState, PeerKind, PublicStatus};

// ── Kinematics ────────────────────────────────────────────────────────────────

/// Position, velocity and acceleration of a point body.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kinematics {
    pub position:     Vec3,
    pub velocity:     Vec3,
    pub acceleration: Vec3,
}

impl Kinematics {
    pub fn new(position: Vec3, velocity: Vec3, acceleration: Vec3) -> Self {
        Self { position, velocity, acceleration }
    }

    /// Position after `t` seconds under constant acceleration.
    #[inline]
    pub fn position_at(&self, t: f32) -> Vec3 {
        self.position + self.velocity * t + 0.5 * self.acceleration * t * t
    }
}

// ── Situation ─────────────────────────────────────────────────────────────────

/// Contact state with the ground or sea surface.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Situation {
    pub landed:         bool,
    pub splashed:       bool,
    /// Fully below the sea surface.
    pub submerged:      bool,
    /// Height above sea level.
    pub altitude:       f32,
    /// Height above the terrain directly below.
    pub radar_altitude: f32,
}

impl Situation {
    #[inline]
    pub fn grounded(&self) -> bool {
        self.landed || self.splashed
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// Everything a controller reads about its own vessel for one tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id:                       VesselId,
    pub kinematics:               Kinematics,
    /// Body-frame angular velocity `(pitch, roll, yaw)` in rad/s.
    pub angular_velocity:         Vec3,
    pub orientation:              Orientation,
    /// Local "up" (away from the gravity source).
    pub up:                       Vec3,
    /// Linear acceleration available at full throttle.
    pub max_acceleration:         f32,
    /// Angular acceleration available at full control authority (rad/s²).
    pub max_angular_acceleration: f32,
    pub radius:                   f32,
    /// Half of the lateral extent, used by side probes.
    pub half_width:               f32,
    pub mass:                     f32,
    pub propulsion:               bool,
    pub weapons:                  bool,
    pub situation:                Situation,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            id:                       VesselId::INVALID,
            kinematics:               Kinematics::default(),
            angular_velocity:         Vec3::ZERO,
            orientation:              Orientation::default(),
            up:                       Vec3::Y,
            max_acceleration:         0.0,
            max_angular_acceleration: 0.0,
            radius:                   1.0,
            half_width:               1.0,
            mass:                     1.0,
            propulsion:               false,
            weapons:                  false,
            situation:                Situation::default(),
        }
    }
}

impl Agent {
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.kinematics.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.kinematics.velocity
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.kinematics.velocity.length()
    }

    #[inline]
    pub fn horizontal_velocity(&self) -> Vec3 {
        project_on_plane(self.kinematics.velocity, self.up)
    }

    /// The read-only view other controllers get of this vessel.
    pub fn public_status(&self, behavior: Option<BehaviorState>) -> PublicStatus {
        PublicStatus {
            id:         self.id,
            kinematics: self.kinematics,
            nose:       self.orientation.nose,
            radius:     self.radius,
            mass:       self.mass,
            kind:       PeerKind::Vessel,
            grounded:   self.situation.grounded(),
            behavior,
            leader:     None,
            target:     None,
        }
    }
}

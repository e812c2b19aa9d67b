//! Orbital elements and local frame for the orbital variant.

use pilot_core::Vec3;

/// Seconds past periapsis on a hyperbolic path after which the vessel is
/// treated as escaping.
pub const ESCAPE_PAST_PERIAPSIS_SECS: f32 = -60.0;

/// Snapshot of the controlled vessel's orbit, supplied by the host.
///
/// Altitudes are above the body's reference radius.  `apoapsis` is negative
/// on hyperbolic (escape) trajectories.  Direction vectors are unit length,
/// in the same world frame as the vessel's kinematics.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitState {
    pub periapsis:          f32,
    pub apoapsis:           f32,
    pub time_to_periapsis:  f32,
    pub time_to_apoapsis:   f32,
    pub altitude:           f32,
    /// Distance from the body's centre.
    pub radius:             f32,
    /// Gravitational parameter μ of the body.
    pub gravity_param:      f32,
    pub atmosphere_depth:   f32,
    /// Highest terrain on the body, when known.
    pub max_terrain_height: Option<f32>,

    /// Unit prograde (along orbital velocity).
    pub prograde:   Vec3,
    /// Unit horizontal component of prograde.
    pub horizontal: Vec3,
    /// Unit radial-out.
    pub radial:     Vec3,
    /// Unit orbit normal.
    pub normal:     Vec3,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            periapsis:          100_000.0,
            apoapsis:           100_000.0,
            time_to_periapsis:  600.0,
            time_to_apoapsis:   1200.0,
            altitude:           100_000.0,
            radius:             700_000.0,
            gravity_param:      3.5316e12,
            atmosphere_depth:   70_000.0,
            max_terrain_height: Some(6_800.0),
            prograde:           Vec3::Z,
            horizontal:         Vec3::Z,
            radial:             Vec3::Y,
            normal:             Vec3::X,
        }
    }
}

impl OrbitState {
    /// Lowest altitude with no terrain or atmosphere to worry about.
    pub fn min_safe_altitude(&self, default_terrain_height: f32) -> f32 {
        self.max_terrain_height.unwrap_or(default_terrain_height).max(self.atmosphere_depth)
    }

    /// Periapsis dips below `safe` and is reached before apoapsis, or the
    /// whole orbit is below it, or we are escaping.
    pub fn is_unsafe(&self, safe: f32) -> bool {
        (self.periapsis < safe && self.time_to_periapsis < self.time_to_apoapsis)
            || (self.apoapsis < safe && (self.apoapsis >= 0.0 || self.is_escaping()))
    }

    /// Hyperbolic and well past periapsis.
    #[inline]
    pub fn is_escaping(&self) -> bool {
        self.apoapsis < 0.0 && self.time_to_periapsis < ESCAPE_PAST_PERIAPSIS_SECS
    }

    /// Velocity of a circular orbit at the current radius.
    pub fn circular_velocity(&self) -> Vec3 {
        (self.gravity_param / self.radius.max(1.0)).sqrt() * self.horizontal
    }
}

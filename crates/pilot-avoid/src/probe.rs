//! Scenery probe along the direction of travel.
//!
//! Only buildings are avoided here; terrain relief is left to the pathfinder.
//! Surfaces flatter than the slope limit are ignored (they can be driven on),
//! as are back-facing contacts.

use pilot_agent::Agent;
use pilot_core::math::{angle_deg, clamp, reflect};
use pilot_core::Vec3;
use pilot_spatial::{ProbeHit, SceneryQuery};

use crate::AvoidanceConfig;

/// Turning circle assumed when deciding whether a wall ahead must be
/// steered away from now or can wait.
const TURN_RADIUS: f32 = 100.0;

/// Contacts this close to dead-ahead keep full weight.
const DEAD_AHEAD_DEG: f32 = 15.0;

/// Probe geometry for one vehicle and tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProbeInput {
    /// Centre of mass.
    pub origin:           Vec3,
    /// Unit direction of travel.
    pub direction:        Vec3,
    pub nose:             Vec3,
    pub right:            Vec3,
    pub up:               Vec3,
    /// Probe sphere radius.
    pub detection_radius: f32,
    pub half_width:       f32,
    pub speed:            f32,
    pub was_reversing:    bool,
    pub max_slope_deg:    f32,
}

impl ProbeInput {
    /// Probe for `me`: travel direction is the velocity when moving, else the
    /// nose (reversed while reversing).  The sphere is twice the vehicle radius.
    pub fn for_agent(me: &Agent, was_reversing: bool, max_slope_deg: f32) -> Self {
        let speed = me.speed();
        let nose = me.orientation.nose;
        let direction = if speed > 1.0 {
            me.velocity() / speed
        } else if was_reversing {
            -nose
        } else {
            nose
        };
        Self {
            origin: me.position(),
            direction,
            nose,
            right: me.orientation.right,
            up: me.up,
            detection_radius: 2.0 * me.radius,
            half_width: me.half_width,
            speed,
            was_reversing,
            max_slope_deg,
        }
    }

    /// Range scales with ten seconds of travel within
    /// `[2·r, max(floor, 10·r)]` for detection radius `r`.
    pub fn threat_range(&self, cfg: &AvoidanceConfig) -> f32 {
        let r = self.detection_radius;
        clamp(self.speed * cfg.threat_range_secs, 2.0 * r, cfg.threat_range_floor.max(10.0 * r))
    }

    /// `|n·up|` at or above this means the surface is flat enough to ignore.
    fn max_slope_dot(&self) -> f32 {
        self.max_slope_deg.to_radians().cos()
    }

    /// Strictly steeper than the slope limit; a surface right at the limit
    /// can still be driven on.
    fn is_steep(&self, normal: Vec3) -> bool {
        normal.dot(self.up).abs() < self.max_slope_dot()
    }
}

/// Everything one probe found.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScenerySweep {
    pub threat_range:   f32,
    /// Nearest accepted contact, or the threat range when there is none.
    pub alert_distance: f32,
    /// Weighted sum of accepted contact normals (not normalised).
    pub alert_normal:   Vec3,
    pub valid_hits:     u32,
    /// Accepted contacts, for debug output.
    pub contacts:       Vec<ProbeHit>,
}

impl ScenerySweep {
    fn accept(&mut self, hit: ProbeHit, weighted_normal: Vec3) {
        self.alert_distance = self.alert_distance.min(hit.distance);
        self.alert_normal += weighted_normal;
        self.valid_hits += 1;
        self.contacts.push(hit);
    }
}

/// Sweep a sphere along the direction of travel and fold the accepted
/// contacts into a single weighted avoidance normal.
///
/// * A contact ahead that cannot wait for a 100 m turning circle is replaced
///   by the travel direction reflected off it.
/// * Weights fall off with distance squared, and faster for contacts to the
///   side than for contacts within 15° of dead ahead.
/// * A contact already inside the starting sphere has no usable geometry, so
///   two short rays from either side of the hull are cast instead.
/// * While reversing, a short ray along the nose keeps tracking the obstacle
///   being backed away from.
pub fn probe_scenery(scenery: &dyn SceneryQuery, input: &ProbeInput, cfg: &AvoidanceConfig) -> ScenerySweep {
    let threat_range = input.threat_range(cfg);
    let det_r = input.detection_radius;
    let dir = input.direction;

    let mut sweep = ScenerySweep { threat_range, alert_distance: threat_range, ..ScenerySweep::default() };
    let hits = scenery.sphere_cast(input.origin, dir, det_r, threat_range);
    if hits.is_empty() {
        return sweep;
    }

    let mut proximity_check = false;
    for hit in hits {
        if !hit.is_building || hit.normal.dot(dir) > 0.0 || !input.is_steep(hit.normal) {
            continue;
        }
        if hit.distance > 0.0 {
            let collision_angle = angle_deg(dir, -hit.normal);
            let must_turn_by = TURN_RADIUS - TURN_RADIUS * (collision_angle - 90.0).to_radians().cos() + det_r * 0.5;
            let normal = if hit.distance < must_turn_by { reflect(dir, hit.normal) } else { hit.normal };
            let falloff = if collision_angle < DEAD_AHEAD_DEG { 1.0 } else { collision_angle / 90.0 * 18.0 };
            sweep.accept(hit, normal / (1.0 + hit.distance * hit.distance * falloff));
        } else {
            proximity_check = true;
        }
    }

    if proximity_check {
        for side in [1.0, -1.0] {
            let origin = input.origin + input.right * (input.half_width * side);
            if let Some(hit) = scenery.raycast(origin, dir, det_r + input.half_width)
                && hit.is_building
                && hit.normal.dot(dir) < 0.0
                && input.is_steep(hit.normal)
            {
                sweep.accept(hit, hit.normal / (1.0 + hit.distance * hit.distance));
            }
        }
    }

    if input.was_reversing {
        let range = clamp(0.5 * threat_range, 2.0 * det_r, 5.0 * det_r);
        if let Some(hit) = scenery.raycast(input.origin, input.nose, range)
            && hit.is_building
            && hit.normal.dot(input.nose) < 0.0
            && input.is_steep(hit.normal)
        {
            sweep.accept(hit, hit.normal / (1.0 + hit.distance * hit.distance));
        }
    }

    sweep
}

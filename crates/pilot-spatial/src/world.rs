//! The world query interface the core consumes but does not implement.
//!
//! Hosts implement [`TerrainQuery`] (heights, water, static obstacles) and
//! [`SceneryQuery`] (volumetric and ray probes).  The simple implementations
//! here back tests and the demo.

use pilot_core::Vec3;

// ── Terrain ───────────────────────────────────────────────────────────────────

/// A static obstacle footprint used by the traversability grid.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticObstacle {
    pub position: Vec3,
    pub radius:   f32,
    pub mass:     f32,
}

pub trait TerrainQuery: Send + Sync {
    /// Terrain height at `(x, z)`; may be below sea level.
    fn height(&self, x: f32, z: f32) -> f32;

    fn sea_level(&self) -> f32 {
        0.0
    }

    fn is_water(&self, x: f32, z: f32) -> bool {
        self.height(x, z) < self.sea_level()
    }

    /// Static obstacles to index when building a graph.
    fn obstacles(&self) -> &[StaticObstacle] {
        &[]
    }
}

/// Constant-height ground with optional obstacles.
#[derive(Clone, Debug, Default)]
pub struct FlatTerrain {
    pub height:    f32,
    pub obstacles: Vec<StaticObstacle>,
}

impl TerrainQuery for FlatTerrain {
    fn height(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }

    fn obstacles(&self) -> &[StaticObstacle] {
        &self.obstacles
    }
}

// ── Scenery probes ────────────────────────────────────────────────────────────

/// One probe contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProbeHit {
    pub point:       Vec3,
    /// Surface normal at the contact (unit length).
    pub normal:      Vec3,
    /// Distance along the probe; `0` means the contact was already inside the
    /// probe volume at its origin and has no usable point or normal.
    pub distance:    f32,
    /// Only building hits are avoided locally; terrain is the pathfinder's job.
    pub is_building: bool,
}

pub trait SceneryQuery: Send + Sync {
    /// All contacts of a sphere of `radius` swept from `origin` along the unit
    /// `direction` for `max_distance`.
    fn sphere_cast(&self, origin: Vec3, direction: Vec3, radius: f32, max_distance: f32) -> Vec<ProbeHit>;

    /// Nearest contact of a ray.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit>;
}

/// Scenery with nothing in it.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoScenery;

impl SceneryQuery for NoScenery {
    fn sphere_cast(&self, _: Vec3, _: Vec3, _: f32, _: f32) -> Vec<ProbeHit> {
        Vec::new()
    }

    fn raycast(&self, _: Vec3, _: Vec3, _: f32) -> Option<ProbeHit> {
        None
    }
}

/// Buildings modelled as spheres.
#[derive(Clone, Debug, Default)]
pub struct SphereScenery {
    pub buildings: Vec<StaticObstacle>,
}

impl SphereScenery {
    /// Entry distance of a ray into the sphere `(center, radius)`, `Some(0)`
    /// when the origin is already inside.
    fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
        let oc = origin - center;
        let c = oc.length_squared() - radius * radius;
        if c <= 0.0 {
            return Some(0.0);
        }
        let b = oc.dot(direction);
        if b > 0.0 {
            return None;
        }
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        Some(-b - disc.sqrt())
    }

    fn hit(origin: Vec3, direction: Vec3, probe_radius: f32, b: &StaticObstacle, max_distance: f32) -> Option<ProbeHit> {
        let t = Self::ray_sphere(origin, direction, b.position, b.radius + probe_radius)?;
        if t > max_distance {
            return None;
        }
        if t == 0.0 {
            return Some(ProbeHit {
                point:       Vec3::ZERO,
                normal:      -direction,
                distance:    0.0,
                is_building: true,
            });
        }
        let centre = origin + direction * t;
        let normal = (centre - b.position).normalize_or_zero();
        Some(ProbeHit {
            point:       b.position + normal * b.radius,
            normal,
            distance:    t,
            is_building: true,
        })
    }
}

impl SceneryQuery for SphereScenery {
    fn sphere_cast(&self, origin: Vec3, direction: Vec3, radius: f32, max_distance: f32) -> Vec<ProbeHit> {
        self.buildings
            .iter()
            .filter_map(|b| Self::hit(origin, direction, radius, b, max_distance))
            .collect()
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<ProbeHit> {
        self.buildings
            .iter()
            .filter_map(|b| Self::hit(origin, direction, 0.0, b, max_distance))
            .filter(|h| h.distance > 0.0)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

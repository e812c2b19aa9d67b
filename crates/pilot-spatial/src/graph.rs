//! Lazily evaluated traversability grid.
//!
//! # Data layout
//!
//! A square grid of `cells_per_side²` cells centred on a world point, laid out
//! row-major over `(x, z)`:
//!
//! ```text
//! CellId = row * cells_per_side + col      col ↔ x, row ↔ z
//! ```
//!
//! A cell is evaluated the first time a query touches it and the verdict is
//! cached until the grid is re-centred.  Neighbours are implicit (8-connected)
//! so there is no adjacency storage.
//!
//! # Obstacle index
//!
//! Static obstacles heavier than the profile's `min_obstacle_mass` are
//! bulk-loaded into an R-tree (via `rstar`) keyed by their `(x, z)` footprint.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use pilot_core::{CellId, MovementClass, Vec3};

use crate::world::TerrainQuery;
use crate::{SpatialError, SpatialResult};

// ── Profile & grid spec ───────────────────────────────────────────────────────

/// What a graph is built for.  Two vehicles with equal profiles can share a
/// graph; a differing profile means rebuilding it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraversalProfile {
    pub class:             MovementClass,
    /// Steepest ground a land vehicle may climb, in degrees.
    pub max_slope_deg:     f32,
    /// Obstacles lighter than this are driven over.
    pub min_obstacle_mass: f32,
}

impl Default for TraversalProfile {
    fn default() -> Self {
        Self { class: MovementClass::Land, max_slope_deg: 30.0, min_obstacle_mass: 2.0 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSpec {
    /// Cell edge length in metres.
    pub cell_size:      f32,
    pub cells_per_side: u32,
}

impl GridSpec {
    pub const MAX_CELLS_PER_SIDE: u32 = 4096;

    #[inline]
    pub fn extent(&self) -> f32 {
        self.cell_size * self.cells_per_side as f32
    }

    pub fn validate(&self) -> SpatialResult<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(SpatialError::InvalidGrid(format!("cell_size must be positive, got {}", self.cell_size)));
        }
        if !(2..=Self::MAX_CELLS_PER_SIDE).contains(&self.cells_per_side) {
            return Err(SpatialError::InvalidGrid(format!(
                "cells_per_side must be in 2..={}, got {}",
                Self::MAX_CELLS_PER_SIDE,
                self.cells_per_side
            )));
        }
        Ok(())
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { cell_size: 20.0, cells_per_side: 128 }
    }
}

// ── R-tree obstacle entry ─────────────────────────────────────────────────────

#[derive(Clone)]
struct ObstacleEntry {
    point:  [f32; 2], // [x, z]
    radius: f32,
}

impl RTreeObject for ObstacleEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for ObstacleEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dz = self.point[1] - point[1];
        dx * dx + dz * dz
    }
}

// ── Cells ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Cell {
    Unknown,
    Open,
    Blocked,
}

/// Result of evaluating one cell; kept alongside the verdict so step checks
/// can compare neighbouring heights without re-querying terrain.
#[derive(Copy, Clone, Debug)]
struct Surface {
    height: f32,
    water:  bool,
}

const UNKNOWN_SURFACE: Surface = Surface { height: 0.0, water: false };

// ── TraversabilityGraph ───────────────────────────────────────────────────────

pub struct TraversabilityGraph {
    profile: TraversalProfile,
    spec:    GridSpec,
    /// World `(x, z)` of the grid's minimum corner.
    origin:  [f32; 2],
    cells:   Vec<Cell>,
    surface: Vec<Surface>,

    obstacle_idx:        RTree<ObstacleEntry>,
    max_obstacle_radius: f32,
}

impl TraversabilityGraph {
    /// Build an empty (all-unknown) grid centred on `center`.
    pub fn new(
        profile: TraversalProfile,
        spec: GridSpec,
        center: Vec3,
        terrain: &dyn TerrainQuery,
    ) -> SpatialResult<Self> {
        spec.validate()?;

        let entries: Vec<ObstacleEntry> = terrain
            .obstacles()
            .iter()
            .filter(|o| o.mass >= profile.min_obstacle_mass)
            .map(|o| ObstacleEntry { point: [o.position.x, o.position.z], radius: o.radius.max(0.0) })
            .collect();
        let max_obstacle_radius = entries.iter().map(|e| e.radius).fold(0.0, f32::max);

        let n = (spec.cells_per_side * spec.cells_per_side) as usize;
        let mut graph = Self {
            profile,
            spec,
            origin: [0.0, 0.0],
            cells: vec![Cell::Unknown; n],
            surface: vec![UNKNOWN_SURFACE; n],
            obstacle_idx: RTree::bulk_load(entries),
            max_obstacle_radius,
        };
        graph.recenter(center);
        Ok(graph)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn profile(&self) -> TraversalProfile {
        self.profile
    }

    #[inline]
    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn center(&self) -> Vec3 {
        let half = self.spec.extent() * 0.5;
        Vec3::new(self.origin[0] + half, 0.0, self.origin[1] + half)
    }

    /// Move the grid so it is centred on `center`, discarding cached cells.
    pub fn recenter(&mut self, center: Vec3) {
        let half = self.spec.extent() * 0.5;
        self.origin = [center.x - half, center.z - half];
        self.cells.fill(Cell::Unknown);
        self.surface.fill(UNKNOWN_SURFACE);
    }

    pub fn contains(&self, pos: Vec3) -> bool {
        self.cell_at(pos).is_some()
    }

    /// Cell containing `pos`, or `None` outside the grid.
    pub fn cell_at(&self, pos: Vec3) -> Option<CellId> {
        let fx = (pos.x - self.origin[0]) / self.spec.cell_size;
        let fz = (pos.z - self.origin[1]) / self.spec.cell_size;
        let side = self.spec.cells_per_side as f32;
        if !(fx >= 0.0 && fz >= 0.0 && fx < side && fz < side) {
            return None;
        }
        Some(self.id(fx as u32, fz as u32))
    }

    #[inline]
    fn id(&self, col: u32, row: u32) -> CellId {
        CellId(row * self.spec.cells_per_side + col)
    }

    #[inline]
    fn coords(&self, cell: CellId) -> (u32, u32) {
        (cell.0 % self.spec.cells_per_side, cell.0 / self.spec.cells_per_side)
    }

    /// `(col, row)` distance between two cells.
    pub fn offset(&self, a: CellId, b: CellId) -> (u32, u32) {
        let (ac, ar) = self.coords(a);
        let (bc, br) = self.coords(b);
        (ac.abs_diff(bc), ar.abs_diff(br))
    }

    /// World position of the cell centre.  The height is the evaluated
    /// surface height, or zero for a cell not yet evaluated.
    pub fn cell_center(&self, cell: CellId) -> Vec3 {
        let (col, row) = self.coords(cell);
        let (x, z) = self.centre_xz(col, row);
        Vec3::new(x, self.surface[cell.index()].height, z)
    }

    #[inline]
    fn centre_xz(&self, col: u32, row: u32) -> (f32, f32) {
        (
            self.origin[0] + (col as f32 + 0.5) * self.spec.cell_size,
            self.origin[1] + (row as f32 + 0.5) * self.spec.cell_size,
        )
    }

    /// 8-connected neighbours of `cell` inside the grid.
    pub fn neighbors(&self, cell: CellId) -> impl Iterator<Item = CellId> + '_ {
        let (col, row) = self.coords(cell);
        let side = self.spec.cells_per_side as i64;
        (-1i64..=1)
            .flat_map(|dz| (-1i64..=1).map(move |dx| (dx, dz)))
            .filter(|&(dx, dz)| dx != 0 || dz != 0)
            .filter_map(move |(dx, dz)| {
                let c = col as i64 + dx;
                let r = row as i64 + dz;
                (c >= 0 && r >= 0 && c < side && r < side).then(|| self.id(c as u32, r as u32))
            })
    }

    // ── Evaluation ────────────────────────────────────────────────────────

    /// `true` if a vehicle with this graph's profile may occupy `cell`.
    pub fn is_open(&mut self, terrain: &dyn TerrainQuery, cell: CellId) -> bool {
        let i = cell.index();
        if self.cells[i] == Cell::Unknown {
            let (col, row) = self.coords(cell);
            let (verdict, surface) = self.evaluate(terrain, col, row);
            self.cells[i] = verdict;
            self.surface[i] = surface;
        }
        self.cells[i] == Cell::Open
    }

    fn evaluate(&self, terrain: &dyn TerrainQuery, col: u32, row: u32) -> (Cell, Surface) {
        let (x, z) = self.centre_xz(col, row);
        let water = terrain.is_water(x, z);
        let height = if water { terrain.sea_level() } else { terrain.height(x, z) };
        let surface = Surface { height, water };

        let class = self.profile.class;
        let allowed = class.is_mobile()
            && if water { class.crosses_water() } else { class.crosses_land() };
        if !allowed {
            return (Cell::Blocked, surface);
        }

        if !water && self.local_slope_deg(terrain, x, z) > self.profile.max_slope_deg {
            return (Cell::Blocked, surface);
        }

        if self.obstructed(x, z) {
            return (Cell::Blocked, surface);
        }

        (Cell::Open, surface)
    }

    /// Terrain slope at `(x, z)` from central differences over one cell.
    fn local_slope_deg(&self, terrain: &dyn TerrainQuery, x: f32, z: f32) -> f32 {
        let h = self.spec.cell_size * 0.5;
        let dx = (terrain.height(x + h, z) - terrain.height(x - h, z)) / (2.0 * h);
        let dz = (terrain.height(x, z + h) - terrain.height(x, z - h)) / (2.0 * h);
        let grad = (dx * dx + dz * dz).sqrt();
        if grad.is_finite() { grad.atan().to_degrees() } else { 90.0 }
    }

    fn obstructed(&self, x: f32, z: f32) -> bool {
        if self.obstacle_idx.size() == 0 {
            return false;
        }
        let half = self.spec.cell_size * 0.5;
        let reach = self.max_obstacle_radius + half;
        self.obstacle_idx
            .locate_within_distance([x, z], reach * reach)
            .any(|o| o.distance_2(&[x, z]) < (o.radius + half) * (o.radius + half))
    }

    /// May a vehicle move from `a` into the adjacent cell `b`?
    ///
    /// Both cells must be open, the climb between them must respect the slope
    /// limit on land, and a diagonal step may not cut a blocked corner.
    pub fn can_step(&mut self, terrain: &dyn TerrainQuery, a: CellId, b: CellId) -> bool {
        if !self.is_open(terrain, a) || !self.is_open(terrain, b) {
            return false;
        }
        let (ac, ar) = self.coords(a);
        let (bc, br) = self.coords(b);
        let diagonal = ac != bc && ar != br;
        if diagonal && !(self.is_open(terrain, self.id(bc, ar)) && self.is_open(terrain, self.id(ac, br))) {
            return false;
        }

        let sa = self.surface[a.index()];
        let sb = self.surface[b.index()];
        if sa.water || sb.water {
            return true;
        }
        let run = self.spec.cell_size * if diagonal { std::f32::consts::SQRT_2 } else { 1.0 };
        (sb.height - sa.height).abs().atan2(run).to_degrees() <= self.profile.max_slope_deg
    }

    /// Sample the straight line `from → to` at half-cell spacing and check
    /// every cell transition.
    ///
    /// The grid is re-centred on the segment when either end lies outside it.
    /// A segment longer than the grid can hold is reported as not traversable.
    pub fn is_direct_path_traversable(&mut self, terrain: &dyn TerrainQuery, from: Vec3, to: Vec3) -> bool {
        if !(self.contains(from) && self.contains(to)) {
            self.recenter((from + to) * 0.5);
        }
        let (Some(start), Some(_)) = (self.cell_at(from), self.cell_at(to)) else {
            return false;
        };
        if !self.is_open(terrain, start) {
            return false;
        }

        let flat = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
        let spacing = self.spec.cell_size * 0.5;
        let steps = (flat.length() / spacing).ceil() as u32;

        let mut prev = start;
        for k in 1..=steps {
            let p = from + flat * (k as f32 / steps as f32);
            let Some(cell) = self.cell_at(p) else {
                return false;
            };
            if cell == prev {
                continue;
            }
            let (dc, dr) = self.offset(prev, cell);
            let ok = if dc <= 1 && dr <= 1 {
                self.can_step(terrain, prev, cell)
            } else {
                self.is_open(terrain, cell)
            };
            if !ok {
                return false;
            }
            prev = cell;
        }
        true
    }
}

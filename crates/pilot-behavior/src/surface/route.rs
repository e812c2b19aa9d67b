//! Route keeping for the surface variant: the lazily built traversability
//! graph, the current waypoint path, bypass bookkeeping and waypoint courses.

use tracing::{debug, warn};

use pilot_agent::PublicStatus;
use pilot_core::math::project_on_plane;
use pilot_core::{Diagnostics, Vec3, VesselId};
use pilot_spatial::{
    AStarPathfinder, GridSpec, Pathfinder, TerrainQuery, TraversabilityGraph, TraversalProfile, WaypointPath, plan_route,
};

/// A goal this close (horizontally) counts as reached.
pub const ARRIVAL_RADIUS: f32 = 250.0;

/// A bypass path ends this far short of the vessel it routes around.
pub const BYPASS_STOP_SHORT: f32 = 200.0;

/// A bypassed vessel that moves this far from where the bypass was planned
/// needs a new route.
pub const BYPASS_STALE_DISTANCE_SQR: f32 = 500_000.0;

/// A vessel currently routed around rather than approached directly.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bypass {
    pub target:   VesselId,
    /// Where the vessel was when the bypass was planned.
    pub recorded: Vec3,
}

// ── Waypoint courses ──────────────────────────────────────────────────────────

/// Progress round a `RunWaypoints` course.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointRun {
    points: Vec<Vec3>,
    laps:   u32,
    index:  usize,
    lap:    u32,
    range:  f32,
}

impl WaypointRun {
    pub fn new(points: Vec<Vec3>, laps: u32) -> Self {
        Self { points, laps: laps.max(1), index: 0, lap: 1, range: f32::INFINITY }
    }

    /// Whether this run was started for the given course.
    pub fn matches(&self, points: &[Vec3], laps: u32) -> bool {
        self.points == points && self.laps == laps.max(1)
    }

    /// Advance past every waypoint already within [`ARRIVAL_RADIUS`] of
    /// `here`.  Returns the active waypoint, or `None` once the course is done.
    pub fn update(&mut self, here: Vec3, up: Vec3) -> Option<Vec3> {
        while !self.is_finished() {
            let p = self.points[self.index];
            self.range = project_on_plane(p - here, up).length();
            if self.range > ARRIVAL_RADIUS {
                return Some(p);
            }
            self.index += 1;
            if self.index == self.points.len() {
                self.index = 0;
                self.lap += 1;
            }
        }
        None
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.points.is_empty() || self.lap > self.laps
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn lap(&self) -> u32 {
        self.lap
    }

    #[inline]
    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// Horizontal distance to the active waypoint at the last update.
    #[inline]
    pub fn range(&self) -> f32 {
        self.range
    }
}

// ── Navigator ─────────────────────────────────────────────────────────────────

/// Per-vehicle route state.  The graph is built on first use, centred on the
/// vehicle, and re-centred by the pathfinder as needed.
pub struct Navigator {
    profile:    TraversalProfile,
    spec:       GridSpec,
    graph:      Option<TraversabilityGraph>,
    pathfinder: Box<dyn Pathfinder>,
    path:       Option<WaypointPath>,
    bypass:     Option<Bypass>,
    /// Set whenever something pulled us off the current path; the next goto
    /// replans.
    left_path:  bool,
    home:       Option<Vec3>,
    run:        Option<WaypointRun>,
}

impl Navigator {
    pub fn new(profile: TraversalProfile, spec: GridSpec) -> Self {
        Self::with_pathfinder(profile, spec, Box::new(AStarPathfinder::default()))
    }

    pub fn with_pathfinder(profile: TraversalProfile, spec: GridSpec, pathfinder: Box<dyn Pathfinder>) -> Self {
        Self {
            profile,
            spec,
            graph: None,
            pathfinder,
            path: None,
            bypass: None,
            left_path: true,
            home: None,
            run: None,
        }
    }

    #[inline]
    pub fn bypass(&self) -> Option<Bypass> {
        self.bypass
    }

    #[inline]
    pub fn path(&self) -> Option<&WaypointPath> {
        self.path.as_ref()
    }

    #[inline]
    pub fn run(&self) -> Option<&WaypointRun> {
        self.run.as_ref()
    }

    #[inline]
    pub fn mark_left_path(&mut self) {
        self.left_path = true;
    }

    /// Where an uncommanded vehicle returns to: its first observed position.
    pub fn home(&mut self, here: Vec3) -> Vec3 {
        *self.home.get_or_insert(here)
    }

    /// Straight-line traversability.  Without a graph every line is open.
    pub fn is_traversable(&mut self, terrain: &dyn TerrainQuery, from: Vec3, to: Vec3) -> bool {
        match ensure_graph(&mut self.graph, self.profile, self.spec, terrain, from) {
            Some(g) => g.is_direct_path_traversable(terrain, from, to),
            None => true,
        }
    }

    fn plan(&mut self, terrain: &dyn TerrainQuery, from: Vec3, to: Vec3, diag: &mut Diagnostics) -> WaypointPath {
        let Some(graph) = ensure_graph(&mut self.graph, self.profile, self.spec, terrain, from) else {
            diag.path_fallbacks += 1;
            return WaypointPath::direct(to);
        };
        plan_route(self.pathfinder.as_ref(), graph, terrain, from, to, diag)
    }

    /// Replace the current path with a fresh route to `to`.
    pub fn pathfind(&mut self, terrain: &dyn TerrainQuery, from: Vec3, to: Vec3, diag: &mut Diagnostics) {
        self.path = Some(self.plan(terrain, from, to, diag));
    }

    /// If the straight line to `target` is blocked, start routing around it.
    /// The route stops short of the target itself.
    pub fn check_bypass(
        &mut self,
        terrain: &dyn TerrainQuery,
        here:    Vec3,
        target:  &PublicStatus,
        diag:    &mut Diagnostics,
    ) {
        let there = target.position();
        if self.is_traversable(terrain, here, there) {
            return;
        }
        let route = self.plan(terrain, here, there, diag);
        let mut points = route.points().to_vec();
        if points.last().is_some_and(|p| p.distance(there) < BYPASS_STOP_SHORT) {
            points.pop();
        }
        match points.last().copied() {
            Some(last) => {
                debug!(target = %target.id, waypoints = points.len(), "bypassing");
                self.path = Some(WaypointPath::new(points, last));
                self.bypass = Some(Bypass { target: target.id, recorded: there });
            }
            None => self.bypass = None,
        }
    }

    /// Drop the bypass once its vessel is neither the target nor the leader,
    /// has gone, or has moved well away from where the bypass was planned.
    pub fn clear_stale_bypass(
        &mut self,
        target:  Option<VesselId>,
        leader:  Option<VesselId>,
        current: impl FnOnce(VesselId) -> Option<Vec3>,
    ) {
        let Some(b) = self.bypass else {
            return;
        };
        let relevant = Some(b.target) == target || Some(b.target) == leader;
        let stale = match current(b.target) {
            Some(p) => (b.recorded - p).length_squared() > BYPASS_STALE_DISTANCE_SQR,
            None => true,
        };
        if !relevant || stale {
            debug!(target = %b.target, "bypass cleared");
            self.bypass = None;
        }
    }

    /// Sync the waypoint course with the current command.  Returns the
    /// active waypoint, or `None` when no course is running or it is done.
    pub fn update_run(&mut self, course: Option<(&[Vec3], u32)>, here: Vec3, up: Vec3) -> Option<Vec3> {
        let Some((points, laps)) = course else {
            self.run = None;
            return None;
        };
        if !self.run.as_ref().is_some_and(|r| r.matches(points, laps)) {
            self.run = Some(WaypointRun::new(points.to_vec(), laps));
            self.left_path = true;
        }
        self.run.as_mut().and_then(|r| r.update(here, up))
    }

    /// The point to steer for on the way to `goal`, replanning when we have
    /// left the path or the goal moved.  A bypass keeps its own path.
    pub fn steer_point(&mut self, terrain: &dyn TerrainQuery, here: Vec3, goal: Vec3, diag: &mut Diagnostics) -> Vec3 {
        if self.bypass.is_none() {
            let stale = self.path.as_ref().is_none_or(|p| p.destination() != goal);
            if self.left_path || stale {
                self.pathfind(terrain, here, goal, diag);
                self.left_path = false;
            }
        }
        self.path.as_ref().map_or(goal, WaypointPath::current)
    }

    /// More than one waypoint left on the current path.
    pub fn has_more_waypoints(&self) -> bool {
        self.path.as_ref().is_some_and(|p| p.remaining() > 1)
    }

    /// Move on to the next waypoint.  At the end of a bypass route the bypass
    /// is dropped and the next goto replans.
    pub fn cycle(&mut self) {
        if self.path.as_mut().is_some_and(WaypointPath::advance) {
            return;
        }
        if self.bypass.take().is_some() {
            self.path = None;
            self.left_path = true;
        }
    }
}

/// Build the graph on first use.  A grid that fails to build leaves every
/// route direct.
fn ensure_graph<'g>(
    slot:    &'g mut Option<TraversabilityGraph>,
    profile: TraversalProfile,
    spec:    GridSpec,
    terrain: &dyn TerrainQuery,
    center:  Vec3,
) -> Option<&'g mut TraversabilityGraph> {
    if slot.is_none() {
        match TraversabilityGraph::new(profile, spec, center, terrain) {
            Ok(g) => *slot = Some(g),
            Err(e) => {
                warn!(error = %e, "traversability graph unavailable");
                return None;
            }
        }
    }
    slot.as_mut()
}

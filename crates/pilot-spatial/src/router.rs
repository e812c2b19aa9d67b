//! Pathfinding trait and default A* implementation.
//!
//! # Pluggability
//!
//! Controllers call pathfinding via the [`Pathfinder`] trait so hosts can
//! swap in their own planner.  [`plan_route`] wraps any implementation with
//! the fallback the controllers rely on: a failed query degrades to a single
//! direct waypoint, so a path is never empty.
//!
//! # Cost units
//!
//! Step costs are integer tenths of a cell: 10 straight, 14 diagonal.  The
//! octile heuristic uses the same units, so it is admissible and consistent.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::debug;

use pilot_core::{CellId, Diagnostics, Vec3};

use crate::graph::TraversabilityGraph;
use crate::path::WaypointPath;
use crate::world::TerrainQuery;
use crate::{SpatialError, SpatialResult};

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

// ── Pathfinder trait ──────────────────────────────────────────────────────────

/// Pluggable path planner.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one planner can be shared by
/// controllers running on Rayon worker threads.
pub trait Pathfinder: Send + Sync {
    /// Waypoints from `from` to `to`, ending exactly at `to`.
    ///
    /// The graph may be re-centred if either end lies outside it.
    fn find_path(
        &self,
        graph: &mut TraversabilityGraph,
        terrain: &dyn TerrainQuery,
        from: Vec3,
        to: Vec3,
    ) -> SpatialResult<Vec<Vec3>>;
}

/// Plan a route, falling back to a straight line when the planner fails.
///
/// Each fallback is logged at `debug` and counted in `diag.path_fallbacks`.
pub fn plan_route(
    pathfinder: &dyn Pathfinder,
    graph: &mut TraversabilityGraph,
    terrain: &dyn TerrainQuery,
    from: Vec3,
    to: Vec3,
    diag: &mut Diagnostics,
) -> WaypointPath {
    match pathfinder.find_path(graph, terrain, from, to) {
        Ok(points) => WaypointPath::new(points, to),
        Err(e) => {
            debug!(error = %e, ?from, ?to, "pathfinding failed, steering direct");
            diag.path_fallbacks += 1;
            WaypointPath::direct(to)
        }
    }
}

// ── AStarPathfinder ───────────────────────────────────────────────────────────

/// A* over the 8-connected traversability grid, followed by line-of-sight
/// smoothing so the returned waypoints are the corners of the route rather
/// than every cell centre.
#[derive(Copy, Clone, Debug)]
pub struct AStarPathfinder {
    /// Node expansions before giving up with `NoRoute`.
    pub max_expansions: usize,
}

impl Default for AStarPathfinder {
    fn default() -> Self {
        Self { max_expansions: 65_536 }
    }
}

impl Pathfinder for AStarPathfinder {
    fn find_path(
        &self,
        graph: &mut TraversabilityGraph,
        terrain: &dyn TerrainQuery,
        from: Vec3,
        to: Vec3,
    ) -> SpatialResult<Vec<Vec3>> {
        if !(graph.contains(from) && graph.contains(to)) {
            graph.recenter((from + to) * 0.5);
        }
        let start = graph.cell_at(from).ok_or(SpatialError::OutOfBounds { x: from.x, z: from.z })?;
        let goal = graph.cell_at(to).ok_or(SpatialError::OutOfBounds { x: to.x, z: to.z })?;

        if start == goal || graph.is_direct_path_traversable(terrain, from, to) {
            return Ok(vec![to]);
        }
        if !graph.is_open(terrain, goal) {
            return Err(SpatialError::NoRoute { from: start, to: goal });
        }

        let cells = self.search(graph, terrain, start, goal)?;
        Ok(smooth(graph, terrain, from, to, &cells))
    }
}

impl AStarPathfinder {
    fn search(
        &self,
        graph: &mut TraversabilityGraph,
        terrain: &dyn TerrainQuery,
        start: CellId,
        goal: CellId,
    ) -> SpatialResult<Vec<CellId>> {
        let n = graph.cell_count();
        // g[v] = best known cost to reach v.
        let mut g    = vec![u32::MAX; n];
        // prev[v] = cell that reached v; CellId::INVALID for unreached cells.
        let mut prev = vec![CellId::INVALID; n];

        let h = |graph: &TraversabilityGraph, c: CellId| {
            let (dc, dr) = graph.offset(c, goal);
            STRAIGHT_COST * dc.max(dr) + (DIAGONAL_COST - STRAIGHT_COST) * dc.min(dr)
        };

        g[start.index()] = 0;
        // Min-heap on f = g + h; CellId breaks ties deterministically.
        let mut heap: BinaryHeap<Reverse<(u32, CellId)>> = BinaryHeap::new();
        heap.push(Reverse((h(graph, start), start)));

        let mut expansions = 0usize;
        let mut scratch: Vec<CellId> = Vec::with_capacity(8);

        while let Some(Reverse((f, cell))) = heap.pop() {
            if cell == goal {
                return Ok(reconstruct(&prev, goal));
            }
            // Skip stale heap entries.
            if f > g[cell.index()].saturating_add(h(graph, cell)) {
                continue;
            }
            expansions += 1;
            if expansions > self.max_expansions {
                break;
            }

            scratch.clear();
            scratch.extend(graph.neighbors(cell));
            for &next in &scratch {
                if !graph.can_step(terrain, cell, next) {
                    continue;
                }
                let (dc, dr) = graph.offset(cell, next);
                let step = if dc == 1 && dr == 1 { DIAGONAL_COST } else { STRAIGHT_COST };
                let cost = g[cell.index()].saturating_add(step);
                if cost < g[next.index()] {
                    g[next.index()] = cost;
                    prev[next.index()] = cell;
                    heap.push(Reverse((cost.saturating_add(h(graph, next)), next)));
                }
            }
        }

        Err(SpatialError::NoRoute { from: start, to: goal })
    }
}

fn reconstruct(prev: &[CellId], goal: CellId) -> Vec<CellId> {
    let mut cells = vec![goal];
    let mut cur = goal;
    while prev[cur.index()].is_valid() {
        cur = prev[cur.index()];
        cells.push(cur);
    }
    cells.reverse();
    cells
}

/// Greedy string pulling: from each anchor jump to the farthest later
/// waypoint still in direct line of travel.
fn smooth(
    graph: &mut TraversabilityGraph,
    terrain: &dyn TerrainQuery,
    from: Vec3,
    to: Vec3,
    cells: &[CellId],
) -> Vec<Vec3> {
    let mut pts: Vec<Vec3> = cells.iter().skip(1).map(|&c| graph.cell_center(c)).collect();
    match pts.last_mut() {
        Some(last) => *last = to,
        None => pts.push(to),
    }

    let mut out = Vec::new();
    let mut anchor = from;
    let mut i = 0;
    while i < pts.len() {
        let mut j = pts.len() - 1;
        while j > i && !graph.is_direct_path_traversable(terrain, anchor, pts[j]) {
            j -= 1;
        }
        out.push(pts[j]);
        anchor = pts[j];
        i = j + 1;
    }
    out
}

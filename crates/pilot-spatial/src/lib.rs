//! `pilot-spatial` — world queries, traversability and pathfinding.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`world`]    | `TerrainQuery`, `SceneryQuery`, `ProbeHit`, simple worlds   |
//! | [`graph`]    | `TraversabilityGraph` (lazy grid + R-tree of obstacles)     |
//! | [`router`]   | `Pathfinder` trait, `AStarPathfinder`, `plan_route`         |
//! | [`path`]     | `WaypointPath` (consumed one point at a time)               |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                          |
//!
//! Surface coordinates: `x`/`z` span the ground plane, `y` is up.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod graph;
pub mod path;
pub mod router;
pub mod world;


pub use error::{SpatialError, SpatialResult};
pub use graph::{GridSpec, TraversabilityGraph, TraversalProfile};
pub use path::WaypointPath;
pub use router::{AStarPathfinder, Pathfinder, plan_route};
pub use world::{
    FlatTerrain, NoScenery, ProbeHit, SceneryQuery, SphereScenery, StaticObstacle, TerrainQuery,
};

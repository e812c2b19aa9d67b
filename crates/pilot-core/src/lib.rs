//! `pilot-core` — foundational types for the vehicle autopilot workspace.
//!
//! This crate is a dependency of every other `pilot-*` crate.  It has no
//! `pilot-*` dependencies and few external ones (`glam`, `rand`, `thiserror`,
//! `tracing`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VesselId`, `CellId`                                  |
//! | [`math`]        | `Vec3` helpers, `Orientation` basis                   |
//! | [`time`]        | `Tick`, `ControlClock`, `LoopConfig`                  |
//! | [`rng`]         | `VesselRng`, one stream per vehicle                   |
//! | [`movement`]    | `MovementClass` enum                                  |
//! | [`diag`]        | `Diagnostics` counters for degraded numerics          |
//! | [`error`]       | `PilotError`, `PilotResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod diag;
pub mod error;
pub mod ids;
pub mod math;
pub mod movement;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use glam::{Quat, Vec3};

pub use diag::Diagnostics;
pub use error::{PilotError, PilotResult};
pub use ids::{CellId, VesselId};
pub use math::Orientation;
pub use movement::MovementClass;
pub use rng::VesselRng;
pub use time::{ControlClock, LoopConfig, Tick};

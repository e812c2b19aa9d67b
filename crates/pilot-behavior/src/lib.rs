//! `pilot-behavior` — per-vehicle behavior selection and actuator commands.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                           |
//! |--------------|--------------------------------------------------------------------|
//! | [`context`]  | `ControlContext<'a>`: read-only tick snapshot for one controller   |
//! | [`command`]  | `Command` directives from the command layer                        |
//! | [`threat`]   | `ThreatSignal`, `IncomingMissile`                                  |
//! | [`weapons`]  | `WeaponContext`, gun and missile state, `WeaponClass`              |
//! | [`orbit`]    | `OrbitState` orbital elements and safety predicates                |
//! | [`config`]   | `OrbitalConfig`, `SurfaceConfig`, two-tier `Bounds`                |
//! | [`status`]   | `Status`: committed state plus human-readable reason               |
//! | [`report`]   | Actuator commands, debug vectors and `TickReport`                  |
//! | [`evasion`]  | Gunfire evasion debounce and the surface weave                     |
//! | [`model`]    | `Pilot` trait                                                      |
//! | [`idle`]     | `IdlePilot`: placeholder that never acts                           |
//! | [`orbital`]  | `OrbitalPilot`: priority ladder over resumable maneuvers           |
//! | [`surface`]  | `SurfacePilot`: avoidance, engagement, formation and path driving  |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`                               |
//!
//! # Design notes
//!
//! A pilot is stepped once per physics tick.  Everything it reads arrives in
//! the [`ControlContext`]; everything it remembers between ticks (timers,
//! hysteresis counters, paths, RNG) lives inside the pilot.  A step commits
//! to exactly one [`BehaviorState`][pilot_agent::BehaviorState] and returns
//! one actuator command, so the host can step different vehicles' pilots in
//! parallel without sharing anything mutable.

pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod evasion;
pub mod idle;
pub mod model;
pub mod orbit;
pub mod orbital;
pub mod report;
pub mod status;
pub mod surface;
pub mod threat;
pub mod weapons;

#[cfg(test)]
mod tests;

pub use command::Command;
pub use config::{Bounds, OrbitDirection, OrbitalConfig, SurfaceConfig};
pub use context::ControlContext;
pub use error::{BehaviorError, BehaviorResult};
pub use evasion::{EvasionTuning, GunfireEvasion, Weave};
pub use idle::IdlePilot;
pub use model::Pilot;
pub use orbit::OrbitState;
pub use orbital::OrbitalPilot;
pub use report::{ActuatorCommand, DebugKind, DebugVector, OrbitalCommand, SurfaceCommand, TickReport};
pub use status::{EVASION_SUFFIX, Status};
pub use surface::SurfacePilot;
pub use threat::{IncomingMissile, ThreatSignal};
pub use weapons::{GunState, MissileState, SelectedWeapon, WeaponClass, WeaponContext};

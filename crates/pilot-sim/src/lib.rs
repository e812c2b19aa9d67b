//! `pilot-sim` — fixed-timestep host loop over many controlled vessels.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Inputs   — WorldView::inputs for each vessel, ascending VesselId;
//!                a vessel whose snapshot is gone is dropped from the loop.
//!   ② Control  — Pilot::step for each vessel against a ControlContext
//!                (parallel with the `parallel` feature).
//!   ③ Apply    — WorldView::apply(report, behavior), ascending VesselId;
//!                behavior transitions are recorded with their dwell time.
//!   ④ Advance  — WorldView::advance(tick, dt).
//! ```
//!
//! Vessels never share mutable state: everything a pilot reads is a
//! read-only snapshot and everything it writes goes back through its
//! report, so the control phase is free to run on several threads.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the control phase on Rayon's thread pool.         |
//! | `fx-hash`  | FxHash for the traffic store's vessel-id index.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pilot_behavior::{OrbitalConfig, SurfaceConfig};
//! use pilot_core::{LoopConfig, VesselId};
//! use pilot_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(LoopConfig::default(), world)
//!     .orbital(VesselId(0), OrbitalConfig::default())
//!     .surface(VesselId(1), SurfaceConfig::default())
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod world;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use world::{VesselInputs, WorldView};

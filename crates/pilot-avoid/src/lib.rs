//! `pilot-avoid` — local collision avoidance for surface vehicles.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`config`]    | `AvoidanceConfig` cadences, horizons and hysteresis levels |
//! | [`vessels`]   | Pairwise encounter prediction and lateral dodge            |
//! | [`probe`]     | Scenery probe along the direction of travel                |
//! | [`ticker`]    | `CollisionTicker` blocked/reverse hysteresis counter       |
//! | [`avoider`]   | `LocalAvoidance`: per-vehicle state combining the above    |
//!
//! # Per-tick flow
//!
//! ```text
//! scan due?  ── yes ──► vessels::scan ─► probe::probe_scenery ─► ticker.observe
//!     │                                                              │
//!     no (countdown)                                                 ▼
//!     └──────────────────────────────────────────────► ticker.reverse_step
//!                                                                    │
//!                                            AvoidanceOutcome::{Clear, Avoid}
//! ```

pub mod avoider;
pub mod config;
pub mod probe;
pub mod ticker;
pub mod vessels;


pub use avoider::{AvoidanceInput, AvoidanceOutcome, AvoidanceReport, LocalAvoidance};
pub use config::AvoidanceConfig;
pub use probe::{ProbeInput, ScenerySweep, probe_scenery};
pub use ticker::{CollisionTicker, TickerObservation, TickerZone};
pub use vessels::{Encounter, predict_collision, scan_vessels};

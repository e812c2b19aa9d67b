//! `pilot-agent` — what a controller knows about itself and about others.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`state`]     | `Kinematics`, `Situation`, `Agent` (own per-tick snapshot) |
//! | [`status`]    | `BehaviorState`, `PeerKind`, `PublicStatus`                |
//! | [`traffic`]   | `TrafficStore` (SoA of observed vessels)                   |
//! | [`builder`]   | `TrafficStoreBuilder`                                      |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                             |
//!
//! An `Agent` is rebuilt from the world every tick and never persisted by the
//! controller.  Other vessels are seen only through `PublicStatus`, a small
//! read-only view that every vessel exposes.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `fx-hash` | FxHash for the `VesselId → row` index.                    |
//! | `serde`   | Derives `Serialize`/`Deserialize` on all public types.    |

pub mod builder;
pub mod error;
pub mod state;
pub mod status;
pub mod traffic;

#[cfg(test)]
mod tests;

pub use builder::TrafficStoreBuilder;
pub use error::{AgentError, AgentResult};
pub use state::{Agent, Kinematics, Situation};
pub use status::{BehaviorState, PeerKind, PublicStatus};
pub use traffic::TrafficStore;

//! `pilot-predict` — pure trajectory prediction functions.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`motion`]      | `displacement`, `predict_position`, `solve_time`          |
//! | [`cpa`]         | `time_to_cpa`, `closing_time`                             |
//! | [`intercept`]   | `Geometry`, `BurnEstimate`, near-intercept, lead point, escape check |
//!
//! Nothing here holds state or fails.  Degenerate denominators map to
//! [`NO_SOLUTION_TIME`] and diverging pairs to "no approach".
//!
//! # Conventions
//!
//! `to_target = target.position - my.position` and, unless stated otherwise,
//! `rel_vel = my.velocity - target.velocity` (positive along `to_target`
//! means closing).

pub mod cpa;
pub mod intercept;
pub mod motion;

#[cfg(test)]
mod tests;

/// Horizon cap for closest-approach searches (seconds).
pub const MAX_CPA_HORIZON: f32 = 9_999.0;

/// Stand-in for "never": returned instead of dividing by ~zero.
pub const NO_SOLUTION_TIME: f32 = 1.0e6;

/// Closing speed (u/s) below which a pair is treated as not approaching.
pub const MIN_CLOSING_SPEED: f32 = 10.0;

pub use cpa::{closing_time, time_to_cpa};
pub use intercept::{
    BurnEstimate, Geometry, angular_velocity_deg, away_check, burn_estimate, can_intercept,
    closest_approach_point, is_near_intercept, near_intercept,
};
pub use motion::{displacement, predict_position, solve_time};

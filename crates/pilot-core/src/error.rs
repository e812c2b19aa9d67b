//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `PilotError` as one
//! variant where they need to.  Errors only arise at construction and I/O
//! boundaries; the per-tick control path degrades instead of failing.

use thiserror::Error;

use crate::VesselId;

#[derive(Debug, Error)]
pub enum PilotError {
    #[error("vessel {0} not found")]
    VesselNotFound(VesselId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for the `pilot-*` crates.
pub type PilotResult<T> = Result<T, PilotError>;

use pilot_behavior::BehaviorError;
use pilot_core::{PilotError, VesselId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("vessel {0} registered more than once")]
    DuplicateVessel(VesselId),

    #[error(transparent)]
    Core(#[from] PilotError),

    #[error("pilot construction failed: {0}")]
    Behavior(#[from] BehaviorError),

    /// Raised by a [`WorldView`][crate::WorldView] that cannot continue.
    #[error("world error: {0}")]
    World(String),
}

pub type SimResult<T> = Result<T, SimError>;

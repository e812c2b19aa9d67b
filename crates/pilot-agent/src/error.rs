use pilot_core::VesselId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("vessel {0} registered twice in traffic store")]
    DuplicateVessel(VesselId),
}

pub type AgentResult<T> = Result<T, AgentError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("behavior configuration error: {0}")]
    Config(String),

    #[error("pathfinding grid error: {0}")]
    Spatial(#[from] pilot_spatial::SpatialError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;

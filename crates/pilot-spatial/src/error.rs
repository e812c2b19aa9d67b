//! Spatial-subsystem error type.

use thiserror::Error;

use pilot_core::CellId;

#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: CellId, to: CellId },

    #[error("point ({x:.1}, {z:.1}) lies outside the traversability grid")]
    OutOfBounds { x: f32, z: f32 },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

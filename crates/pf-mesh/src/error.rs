//! Mesh construction errors.

use pf_core::PfError;
use thiserror::Error;

pub type MeshResult<T> = Result<T, MeshError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Invalid mesh dimension {what}: {value}")]
    InvalidDimension { what: &'static str, value: f64 },

    #[error("Cell count {what} must be at least 1")]
    ZeroCount { what: &'static str },

    #[error("Grid data length {actual} does not match {expected} cells")]
    GridSize { expected: usize, actual: usize },
}

impl From<MeshError> for PfError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::InvalidDimension { what, .. } => PfError::InvalidArg { what },
            MeshError::ZeroCount { what } => PfError::InvalidArg { what },
            MeshError::GridSize { .. } => PfError::Invariant {
                what: "grid size matches mesh",
            },
        }
    }
}

//! Source configuration errors.

use pf_core::PfError;
use thiserror::Error;

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Invalid torch parameter {what}: {value}")]
    InvalidTorch { what: &'static str, value: f64 },

    #[error("Torch {index} at r={r} m, z={z} m lies outside the furnace")]
    TorchOutsideDomain { index: usize, r: f64, z: f64 },

    #[error("Invalid boundary parameter {what}: {value}")]
    InvalidBoundary { what: &'static str, value: f64 },
}

impl From<SourceError> for PfError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidTorch { what, .. } => PfError::InvalidArg { what },
            SourceError::TorchOutsideDomain { .. } => PfError::InvalidArg {
                what: "torch position",
            },
            SourceError::InvalidBoundary { what, .. } => PfError::InvalidArg { what },
        }
    }
}

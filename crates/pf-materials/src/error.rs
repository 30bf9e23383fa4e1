//! Material property errors.

use pf_core::PfError;
use thiserror::Error;

/// Result type for material operations.
pub type MaterialResult<T> = Result<T, MaterialError>;

/// Errors raised while building or querying a material.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialError {
    /// Scalar property outside its physical range.
    #[error("Invalid material property {what}: {value}")]
    InvalidProperty { what: &'static str, value: f64 },

    /// Property curve that is malformed or non-physical somewhere in the valid range.
    #[error("Invalid {what} curve: {reason}")]
    InvalidCurve {
        what: &'static str,
        reason: &'static str,
    },

    /// Melting must happen below vaporization.
    #[error("Melting temperature {melt} K must be below vaporization temperature {vap} K")]
    TransitionOrder { melt: f64, vap: f64 },

    /// Catalog lookup failed.
    #[error("Unknown material: {name}")]
    UnknownMaterial { name: String },
}

impl From<MaterialError> for PfError {
    fn from(err: MaterialError) -> Self {
        match err {
            MaterialError::InvalidProperty { what, value } => PfError::OutOfRange {
                what,
                value,
                min: 0.0,
                max: f64::INFINITY,
            },
            MaterialError::InvalidCurve { what, .. } => PfError::InvalidArg { what },
            MaterialError::TransitionOrder { .. } => PfError::Invariant {
                what: "melting below vaporization",
            },
            MaterialError::UnknownMaterial { .. } => PfError::InvalidArg { what: "material" },
        }
    }
}

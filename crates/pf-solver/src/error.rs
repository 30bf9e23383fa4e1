//! Error types for the thermal solver.

use pf_core::PfError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Residual blew up or turned non-finite during SOR.
    #[error("Linear solve diverged after {iterations} sweeps (relative residual {residual:e})")]
    Diverged { iterations: usize, residual: f64 },

    #[error("Invalid solver setting {what}: {value}")]
    InvalidConfig { what: &'static str, value: f64 },

    #[error("Field length {actual} does not match {expected} cells")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Time step must be positive and finite, got {dt}")]
    InvalidTimeStep { dt: f64 },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for PfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Diverged { residual, .. } => PfError::NonFinite {
                what: "linear residual",
                value: residual,
            },
            SolverError::InvalidConfig { what, .. } => PfError::InvalidArg { what },
            SolverError::DimensionMismatch { .. } => PfError::Invariant {
                what: "field length matches mesh",
            },
            SolverError::InvalidTimeStep { .. } => PfError::InvalidArg { what: "dt" },
        }
    }
}

//! Error types for simulation runs.

use crate::run::RunStatus;
use thiserror::Error;

/// Errors that stop a run or reject a request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid {what}: {value}")]
    Validation { what: &'static str, value: f64 },

    /// A committed step would have produced a non-physical field. `step` and
    /// the state of the run are those of the last valid step.
    #[error(
        "Numerical instability after step {step} at t = {time} s: cell {cell} has {reason} ({value})"
    )]
    NumericalInstability {
        step: usize,
        time: f64,
        cell: usize,
        value: f64,
        reason: &'static str,
    },

    /// `step` is the last valid step; `time` is where the rejected step was headed.
    #[error("Linear solve diverged after step {step} at t = {time} s: residual {residual} after {iterations} sweeps")]
    Diverged {
        step: usize,
        time: f64,
        iterations: usize,
        residual: f64,
    },

    #[error("Cannot {action} a run that is {from}")]
    InvalidTransition {
        from: RunStatus,
        action: &'static str,
    },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<pf_solver::SolverError> for SimError {
    fn from(e: pf_solver::SolverError) -> Self {
        match e {
            pf_solver::SolverError::InvalidConfig { what, value } => {
                SimError::Validation { what, value }
            }
            other => SimError::Backend {
                message: other.to_string(),
            },
        }
    }
}

impl From<pf_mesh::MeshError> for SimError {
    fn from(e: pf_mesh::MeshError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<pf_core::PfError> for SimError {
    fn from(e: pf_core::PfError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

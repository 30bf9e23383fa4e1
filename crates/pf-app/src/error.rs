//! Error types for the pf-app service layer.

use pf_sim::SimError;

/// Application error type that wraps errors from the backend crates and
/// gives front ends a single error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Runtime compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(SimError),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run worker {run} stopped unexpectedly")]
    WorkerGone { run: String },
}

/// Result type for pf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<pf_project::ProjectError> for AppError {
    fn from(err: pf_project::ProjectError) -> Self {
        match err {
            pf_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<pf_project::ValidationError> for AppError {
    fn from(err: pf_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<pf_mesh::MeshError> for AppError {
    fn from(err: pf_mesh::MeshError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<pf_sources::SourceError> for AppError {
    fn from(err: pf_sources::SourceError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        AppError::Simulation(err)
    }
}

impl From<pf_results::ResultsError> for AppError {
    fn from(err: pf_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

//! pf-results: run manifests, result bundles and content digests.

pub mod hash;
pub mod types;

pub use hash::{compute_run_id, field_digest};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

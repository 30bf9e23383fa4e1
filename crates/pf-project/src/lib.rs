//! pf-project: furnace run parameter bundles and their validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{LATEST_VERSION, MAX_CELLS, ValidationError, build_material, validate_params};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn params_from_yaml_str(content: &str) -> ProjectResult<RunParams> {
    let params: RunParams = serde_yaml::from_str(content)?;
    validate_params(&params)?;
    Ok(params)
}

pub fn params_from_json_str(content: &str) -> ProjectResult<RunParams> {
    let params: RunParams = serde_json::from_str(content)?;
    validate_params(&params)?;
    Ok(params)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<RunParams> {
    let content = std::fs::read_to_string(path)?;
    params_from_yaml_str(&content)
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<RunParams> {
    let content = std::fs::read_to_string(path)?;
    params_from_json_str(&content)
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load_params(path: &std::path::Path) -> ProjectResult<RunParams> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}

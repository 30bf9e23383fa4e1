//! Parameter validation.

use crate::schema::{BoundaryDef, MaterialDef, RunParams, SolverDef, TimeDef, TorchDef};
use pf_core::{ensure_finite, ensure_in_range, ensure_non_negative, ensure_positive};
use pf_materials::{MaterialModel, PhaseChangeMaterial};

pub const LATEST_VERSION: u32 = 1;

/// Largest mesh accepted for a single run.
pub const MAX_CELLS: usize = 20_000_000;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

/// Check a parameter bundle, returning the first problem found.
pub fn validate_params(params: &RunParams) -> Result<(), ValidationError> {
    if params.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: params.version,
        });
    }

    validate_positive_finite("furnace.radius_m", params.furnace.radius_m)?;
    validate_positive_finite("furnace.height_m", params.furnace.height_m)?;

    for (field, n) in [
        ("mesh.nr", params.mesh.nr),
        ("mesh.ntheta", params.mesh.ntheta),
        ("mesh.nz", params.mesh.nz),
    ] {
        if n == 0 {
            return Err(invalid(field, n, "must be at least 1"));
        }
    }
    let cells = params.mesh.cell_count();
    if cells > MAX_CELLS {
        return Err(invalid(
            "mesh",
            cells,
            &format!("more than {MAX_CELLS} cells"),
        ));
    }

    for (idx, torch) in params.torches.iter().enumerate() {
        validate_torch(idx, torch, params)?;
    }

    let material = build_material(&params.material)?;
    validate_boundary(&params.boundary)?;
    validate_time(&params.time)?;
    validate_solver(&params.solver)?;

    let t0 = params.initial_temperature_k;
    let t_max = material.max_temperature();
    if !t0.is_finite() || t0 <= 0.0 || t0 > t_max {
        return Err(invalid(
            "initial_temperature_k",
            t0,
            &format!("must be in (0, {t_max}] K for {}", material.name()),
        ));
    }

    Ok(())
}

/// Build the charge material, reporting a bad custom description as a
/// validation failure.
pub fn build_material(def: &MaterialDef) -> Result<PhaseChangeMaterial, ValidationError> {
    let (field, name, built) = match def {
        MaterialDef::Catalog(id) => ("material.catalog", id.key().to_string(), id.build()),
        MaterialDef::Custom(spec) => (
            "material.custom",
            spec.name.clone(),
            PhaseChangeMaterial::new(spec.clone()),
        ),
    };
    built.map_err(|e| invalid(field, name, &e.to_string()))
}

fn validate_torch(idx: usize, torch: &TorchDef, params: &RunParams) -> Result<(), ValidationError> {
    let field = |name: &str| format!("torches[{idx}].{name}");
    validate_non_negative_finite(&field("power_w"), torch.power_w)?;
    if !(torch.efficiency > 0.0 && torch.efficiency <= 1.0) {
        return Err(invalid(&field("efficiency"), torch.efficiency, "must be in (0, 1]"));
    }
    validate_positive_finite(&field("sigma_m"), torch.sigma_m)?;
    if ensure_finite(torch.theta_rad, "theta_rad").is_err() {
        return Err(invalid(&field("theta_rad"), torch.theta_rad, "must be finite"));
    }
    let radius = params.furnace.radius_m;
    if !(torch.r_m >= 0.0 && torch.r_m <= radius) {
        return Err(invalid(
            &field("r_m"),
            torch.r_m,
            &format!("must lie inside the furnace (0..={radius} m)"),
        ));
    }
    let height = params.furnace.height_m;
    if !(torch.z_m >= 0.0 && torch.z_m <= height) {
        return Err(invalid(
            &field("z_m"),
            torch.z_m,
            &format!("must lie inside the furnace (0..={height} m)"),
        ));
    }
    Ok(())
}

fn validate_boundary(boundary: &BoundaryDef) -> Result<(), ValidationError> {
    validate_positive_finite("boundary.ambient_k", boundary.ambient_k)?;
    validate_non_negative_finite("boundary.h_w_m2k", boundary.h_w_m2k)?;
    if let Some(eps) = boundary.wall_emissivity {
        if ensure_in_range(eps, 0.0, 1.0, "wall_emissivity").is_err() {
            return Err(invalid("boundary.wall_emissivity", eps, "must be in [0, 1]"));
        }
    }
    Ok(())
}

fn validate_time(time: &TimeDef) -> Result<(), ValidationError> {
    validate_positive_finite("time.dt_s", time.dt_s)?;
    validate_non_negative_finite("time.total_time_s", time.total_time_s)?;
    if time.record_every == 0 {
        return Err(invalid("time.record_every", 0, "must be at least 1"));
    }
    let steps = (time.total_time_s / time.dt_s).ceil();
    if steps > time.max_steps as f64 {
        return Err(invalid(
            "time.dt_s",
            time.dt_s,
            &format!("needs {steps} steps, more than max_steps = {}", time.max_steps),
        ));
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    if !(solver.relaxation > 1.0 && solver.relaxation < 2.0) {
        return Err(invalid("solver.relaxation", solver.relaxation, "must be in (1, 2)"));
    }
    validate_positive_finite("solver.tolerance", solver.tolerance)?;
    validate_positive_finite("solver.picard_tolerance", solver.picard_tolerance)?;
    validate_positive_finite("solver.divergence_threshold", solver.divergence_threshold)?;
    if solver.max_iterations == 0 {
        return Err(invalid("solver.max_iterations", 0, "must be at least 1"));
    }
    if solver.max_picard_iterations == 0 {
        return Err(invalid("solver.max_picard_iterations", 0, "must be at least 1"));
    }
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_positive_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    ensure_positive(value, "value")
        .map(drop)
        .map_err(|_| invalid(field, value, "must be positive and finite"))
}

fn validate_non_negative_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    ensure_non_negative(value, "value")
        .map(drop)
        .map_err(|_| invalid(field, value, "must be non-negative and finite"))
}

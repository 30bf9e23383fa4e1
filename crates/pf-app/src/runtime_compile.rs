//! Runtime compilation of `RunParams` into an executable furnace model.

use std::sync::Arc;

use pf_core::units::{k, m, rad, unitless, w, w_per_m2k};
use pf_materials::{MaterialModel, PhaseChangeMaterial};
use pf_mesh::CylindricalMesh;
use pf_project::schema::{BoundaryDef, RunParams, SolverDef, TimeDef, TorchDef};
use pf_sim::{InitialTemperature, SimOptions, Simulation};
use pf_solver::{SolverConfig, SorConfig};
use pf_sources::{BoundaryConfig, FurnaceSources, PlasmaTorch};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Runtime representation of one parameter bundle.
#[derive(Debug, Clone)]
pub struct FurnaceRuntime {
    pub mesh: CylindricalMesh,
    pub material: Arc<PhaseChangeMaterial>,
    pub sources: Arc<FurnaceSources>,
    pub solver: SolverConfig,
    pub options: SimOptions,
    pub initial_temperature: f64,
}

impl FurnaceRuntime {
    /// Build the simulation; the runtime can be reused for further runs.
    pub fn simulation(&self) -> AppResult<Simulation> {
        let material: Arc<dyn MaterialModel> = self.material.clone();
        Ok(Simulation::new(
            self.mesh.clone(),
            material,
            self.sources.clone(),
            self.solver,
            self.options.clone(),
            InitialTemperature::Uniform(self.initial_temperature),
        )?)
    }
}

/// Validate `params` and compile them into runtime structures.
pub fn compile_params(params: &RunParams) -> AppResult<FurnaceRuntime> {
    pf_project::validate_params(params)?;

    let mesh = build_mesh(params)?;
    let material = Arc::new(pf_project::build_material(&params.material)?);
    let torches = build_torches(&params.torches)?;
    let boundary = build_boundary(&params.boundary)?;
    let sources = FurnaceSources::new(torches, boundary, material.as_ref());
    sources.check_inside(&mesh)?;

    debug!(
        cells = mesh.len(),
        material = material.name(),
        torches = sources.torches().len(),
        absorbed_power = sources.absorbed_power(),
        "compiled run parameters"
    );

    Ok(FurnaceRuntime {
        mesh,
        material,
        sources: Arc::new(sources),
        solver: build_solver_config(&params.solver),
        options: build_sim_options(&params.time),
        initial_temperature: params.initial_temperature_k,
    })
}

pub fn build_mesh(params: &RunParams) -> AppResult<CylindricalMesh> {
    let furnace = &params.furnace;
    let dims = &params.mesh;
    Ok(CylindricalMesh::new(
        m(furnace.radius_m),
        m(furnace.height_m),
        dims.nr,
        dims.ntheta,
        dims.nz,
    )?)
}

pub fn build_torches(defs: &[TorchDef]) -> AppResult<Vec<PlasmaTorch>> {
    defs.iter()
        .enumerate()
        .map(|(idx, t)| {
            PlasmaTorch::new(
                w(t.power_w),
                unitless(t.efficiency),
                m(t.r_m),
                rad(t.theta_rad),
                m(t.z_m),
                m(t.sigma_m),
            )
            .map_err(|e| AppError::Validation(format!("torches[{idx}]: {e}")))
        })
        .collect()
}

pub fn build_boundary(def: &BoundaryDef) -> AppResult<BoundaryConfig> {
    let mut boundary = BoundaryConfig::new(k(def.ambient_k), w_per_m2k(def.h_w_m2k))?;
    if let Some(emissivity) = def.wall_emissivity {
        boundary = boundary.with_wall_emissivity(unitless(emissivity))?;
    }
    Ok(boundary.with_walls(def.walls))
}

pub fn build_solver_config(def: &SolverDef) -> SolverConfig {
    SolverConfig {
        sor: SorConfig {
            relaxation: def.relaxation,
            tolerance: def.tolerance,
            max_iterations: def.max_iterations,
            divergence_threshold: def.divergence_threshold,
            parallel_min_cells: def.parallel_min_cells,
        },
        max_picard_iterations: def.max_picard_iterations,
        picard_tolerance: def.picard_tolerance,
    }
}

pub fn build_sim_options(def: &TimeDef) -> SimOptions {
    SimOptions {
        total_time: def.total_time_s,
        dt: def.dt_s,
        max_steps: def.max_steps,
        record_every: def.record_every,
    }
}

//! Run parameter schema.

use pf_materials::{MaterialId, MaterialSpec};
use pf_sources::WallSet;
use serde::{Deserialize, Serialize};

/// Everything needed to start one furnace run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunParams {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    pub furnace: FurnaceDef,
    pub mesh: MeshDef,
    #[serde(default)]
    pub torches: Vec<TorchDef>,
    pub material: MaterialDef,
    pub boundary: BoundaryDef,
    pub time: TimeDef,
    #[serde(default)]
    pub solver: SolverDef,
    pub initial_temperature_k: f64,
}

fn default_version() -> u32 {
    crate::validate::LATEST_VERSION
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FurnaceDef {
    pub radius_m: f64,
    pub height_m: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MeshDef {
    pub nr: usize,
    pub ntheta: usize,
    pub nz: usize,
}

impl MeshDef {
    pub fn cell_count(&self) -> usize {
        self.nr.saturating_mul(self.ntheta).saturating_mul(self.nz)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TorchDef {
    pub power_w: f64,
    pub efficiency: f64,
    pub r_m: f64,
    #[serde(default)]
    pub theta_rad: f64,
    pub z_m: f64,
    pub sigma_m: f64,
}

/// Charge material: a catalog entry or a full custom description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MaterialDef {
    Catalog(MaterialId),
    Custom(MaterialSpec),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundaryDef {
    pub ambient_k: f64,
    pub h_w_m2k: f64,
    /// Defaults to the material emissivity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_emissivity: Option<f64>,
    #[serde(default)]
    pub walls: WallSet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeDef {
    pub total_time_s: f64,
    pub dt_s: f64,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_record_every() -> usize {
    10
}

fn default_max_steps() -> usize {
    100_000
}

/// Linear and nonlinear solver settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub relaxation: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub max_picard_iterations: usize,
    pub picard_tolerance: f64,
    pub divergence_threshold: f64,
    pub parallel_min_cells: usize,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            relaxation: 1.5,
            tolerance: 1e-10,
            max_iterations: 5000,
            max_picard_iterations: 10,
            picard_tolerance: 1e-3,
            divergence_threshold: 1e8,
            parallel_min_cells: 4096,
        }
    }
}

//! Source strategy trait and the standard torch + wall implementation.

use crate::boundary::{BoundaryConfig, convective_flux, radiative_flux};
use crate::error::{SourceError, SourceResult};
use crate::torch::PlasmaTorch;
use nalgebra::Point3;
use pf_core::numeric::deterministic_sum;
use pf_materials::MaterialModel;
use pf_mesh::{CylindricalMesh, Grid, Wall};
use std::fmt::Debug;

/// Heat deposition inside the domain and losses through its walls.
///
/// Implementations must be thread-safe: the solver evaluates them from a
/// worker thread.
pub trait SourceModel: Send + Sync + Debug {
    /// Volumetric heat deposition at a Cartesian point [W/m³].
    fn volumetric_heat(&self, x: &Point3<f64>) -> f64;

    /// Heat flux leaving the domain through `wall` at surface temperature `t`
    /// [W/m²]. Positive values are losses.
    fn boundary_flux(&self, wall: Wall, t: f64) -> f64;

    /// Ambient temperature the walls exchange with [K].
    fn ambient_temperature(&self) -> f64;

    /// `Q` evaluated at every cell center.
    fn heat_field(&self, mesh: &CylindricalMesh) -> Grid<f64> {
        Grid::from_fn(mesh, |c| self.volumetric_heat(&mesh.position(c)))
    }

    /// Total deposited power `Σ Q·V` over the mesh [W].
    fn deposited_power(&self, mesh: &CylindricalMesh) -> f64 {
        let field = self.heat_field(mesh);
        let per_cell: Vec<f64> = mesh
            .cells()
            .zip(field.iter())
            .map(|(c, q)| q * mesh.volume(c))
            .collect();
        deterministic_sum(&per_cell)
    }
}

/// Plasma torches plus radiative/convective wall losses.
#[derive(Debug, Clone)]
pub struct FurnaceSources {
    torches: Vec<PlasmaTorch>,
    boundary: BoundaryConfig,
    emissivity: f64,
}

impl FurnaceSources {
    /// Wall emissivity falls back to the material's when the boundary does
    /// not override it.
    pub fn new(
        torches: Vec<PlasmaTorch>,
        boundary: BoundaryConfig,
        material: &dyn MaterialModel,
    ) -> Self {
        let emissivity = boundary
            .wall_emissivity()
            .unwrap_or_else(|| material.emissivity());
        Self {
            torches,
            boundary,
            emissivity,
        }
    }

    pub fn torches(&self) -> &[PlasmaTorch] {
        &self.torches
    }

    pub fn boundary(&self) -> &BoundaryConfig {
        &self.boundary
    }

    pub fn emissivity(&self) -> f64 {
        self.emissivity
    }

    /// Total `P·η` of all torches [W].
    pub fn absorbed_power(&self) -> f64 {
        self.torches.iter().map(PlasmaTorch::absorbed_power).sum()
    }

    /// Reject torches whose tip lies outside the closed cylinder.
    pub fn check_inside(&self, mesh: &CylindricalMesh) -> SourceResult<()> {
        for (index, torch) in self.torches.iter().enumerate() {
            if !mesh.contains(&torch.position()) {
                let loc = torch.location();
                return Err(SourceError::TorchOutsideDomain {
                    index,
                    r: loc.r,
                    z: loc.z,
                });
            }
        }
        Ok(())
    }
}

impl SourceModel for FurnaceSources {
    fn volumetric_heat(&self, x: &Point3<f64>) -> f64 {
        // Superposition in list order.
        self.torches
            .iter()
            .fold(0.0, |acc, torch| acc + torch.power_density(x))
    }

    fn boundary_flux(&self, wall: Wall, t: f64) -> f64 {
        if !self.boundary.walls().contains(wall) {
            return 0.0;
        }
        let t_amb = self.boundary.ambient();
        radiative_flux(self.emissivity, t, t_amb)
            + convective_flux(self.boundary.convection(), t, t_amb)
    }

    fn ambient_temperature(&self) -> f64 {
        self.boundary.ambient()
    }
}

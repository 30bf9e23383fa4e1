#![allow(dead_code)]

use pf_core::units::{k, m, rad, unitless, w, w_per_m2k};
use pf_materials::{MaterialId, MaterialModel};
use pf_mesh::CylindricalMesh;
use pf_sim::{CancelToken, InitialTemperature, SimOptions, Simulation};
use pf_solver::SolverConfig;
use pf_sources::{BoundaryConfig, FurnaceSources, PlasmaTorch};
use std::sync::Arc;

/// `(power W, efficiency, r m, theta rad, z m, sigma m)`
pub type TorchSpec = (f64, f64, f64, f64, f64, f64);

pub struct Case {
    pub mesh: CylindricalMesh,
    pub material: MaterialId,
    pub torches: Vec<TorchSpec>,
    pub boundary: BoundaryConfig,
    pub solver: SolverConfig,
    pub options: SimOptions,
    pub initial_temperature: f64,
}

impl Case {
    pub fn new(mesh: CylindricalMesh, material: MaterialId) -> Self {
        Self {
            mesh,
            material,
            torches: Vec::new(),
            boundary: BoundaryConfig::adiabatic(),
            solver: SolverConfig::default(),
            options: SimOptions::default(),
            initial_temperature: 300.0,
        }
    }

    pub fn with_losses(mut self, ambient: f64, h: f64) -> Self {
        self.boundary = BoundaryConfig::new(k(ambient), w_per_m2k(h)).unwrap();
        self
    }

    pub fn build(&self) -> Simulation {
        let material: Arc<dyn MaterialModel> = Arc::new(self.material.build().unwrap());
        let torches = self
            .torches
            .iter()
            .map(|&(p, eta, r, theta, z, sigma)| {
                PlasmaTorch::new(w(p), unitless(eta), m(r), rad(theta), m(z), m(sigma)).unwrap()
            })
            .collect();
        let sources = Arc::new(FurnaceSources::new(
            torches,
            self.boundary.clone(),
            material.as_ref(),
        ));
        Simulation::new(
            self.mesh.clone(),
            material,
            sources,
            self.solver,
            self.options.clone(),
            InitialTemperature::Uniform(self.initial_temperature),
        )
        .unwrap()
    }
}

pub fn mesh(radius: f64, height: f64, nr: usize, ntheta: usize, nz: usize) -> CylindricalMesh {
    CylindricalMesh::new(m(radius), m(height), nr, ntheta, nz).unwrap()
}

/// Run to the end, collecting the maximum temperature after every step.
pub fn run_collecting_max(sim: &mut Simulation) -> Vec<f64> {
    let mut maxima = Vec::new();
    sim.run_to_completion(&CancelToken::new(), |event| maxima.push(event.stats.max))
        .unwrap();
    maxima
}

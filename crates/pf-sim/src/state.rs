//! Simulation state: the per-cell fields of the latest committed step.

use crate::metrics::{StateMetrics, TemperatureStats};
use pf_core::numeric::{deterministic_dot, deterministic_sum};
use pf_mesh::{CylindricalMesh, Grid, MeshResult};
use pf_solver::StepFields;
use std::sync::Arc;

/// Fields of a run at `current_time`.
///
/// Only the run itself mutates a state; everything else reads it or works on a
/// [`snapshot`](Self::snapshot).
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    enthalpy: Grid<f64>,
    temperature: Grid<f64>,
    phase_fraction: Grid<f64>,
    vapor_fraction: Grid<f64>,
    volumes: Arc<[f64]>,
    current_time: f64,
    step_index: usize,
}

impl SimulationState {
    pub(crate) fn new(mesh: &CylindricalMesh, fields: StepFields) -> MeshResult<Self> {
        let (nr, ntheta, nz) = mesh.counts();
        let volumes: Vec<f64> = mesh.cells().map(|c| mesh.volume(c)).collect();
        Ok(Self {
            enthalpy: Grid::from_vec(nr, ntheta, nz, fields.enthalpy)?,
            temperature: Grid::from_vec(nr, ntheta, nz, fields.temperature)?,
            phase_fraction: Grid::from_vec(nr, ntheta, nz, fields.phase_fraction)?,
            vapor_fraction: Grid::from_vec(nr, ntheta, nz, fields.vapor_fraction)?,
            volumes: volumes.into(),
            current_time: 0.0,
            step_index: 0,
        })
    }

    /// Replace the fields with those of a completed step.
    pub(crate) fn commit(&mut self, fields: &StepFields, time: f64) {
        self.enthalpy.as_mut_slice().copy_from_slice(&fields.enthalpy);
        self.temperature.as_mut_slice().copy_from_slice(&fields.temperature);
        self.phase_fraction
            .as_mut_slice()
            .copy_from_slice(&fields.phase_fraction);
        self.vapor_fraction
            .as_mut_slice()
            .copy_from_slice(&fields.vapor_fraction);
        self.current_time = time;
        self.step_index += 1;
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Volumetric enthalpy [J/m³]
    pub fn enthalpy(&self) -> &Grid<f64> {
        &self.enthalpy
    }

    /// Temperature [K]
    pub fn temperature(&self) -> &Grid<f64> {
        &self.temperature
    }

    /// Melt fraction in `[0, 1]`
    pub fn phase_fraction(&self) -> &Grid<f64> {
        &self.phase_fraction
    }

    pub fn vapor_fraction(&self) -> &Grid<f64> {
        &self.vapor_fraction
    }

    /// Cell volumes [m³] in linear order.
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Independent copy of the state.
    pub fn snapshot(&self) -> SimulationState {
        self.clone()
    }

    pub fn temperature_stats(&self) -> TemperatureStats {
        TemperatureStats::from_field(self.temperature.as_slice(), &self.volumes)
    }

    /// Stored energy `Σ E·V` [J].
    pub fn total_energy(&self) -> f64 {
        deterministic_dot(self.enthalpy.as_slice(), &self.volumes)
    }

    /// Melted volume `Σ f·V` [m³]; a cell halfway through its plateau counts
    /// half.
    pub fn melted_volume(&self) -> f64 {
        deterministic_dot(self.phase_fraction.as_slice(), &self.volumes)
    }

    pub fn vaporized_volume(&self) -> f64 {
        deterministic_dot(self.vapor_fraction.as_slice(), &self.volumes)
    }

    pub fn metrics(&self) -> StateMetrics {
        let melted_volume = self.melted_volume();
        StateMetrics {
            current_time: self.current_time,
            step_index: self.step_index,
            temperature: self.temperature_stats(),
            total_energy: self.total_energy(),
            melted_volume,
            vaporized_volume: self.vaporized_volume(),
            melt_fraction: melted_volume / deterministic_sum(&self.volumes),
        }
    }
}

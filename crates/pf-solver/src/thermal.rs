//! Time-step driver: explicit sources, Picard loop, SOR, inversion.

use crate::assembly::{
    assemble, cell_conductivity, conductive_balance, explicit_rhs, explicit_source,
    face_conductance, linearize,
};
use crate::config::SolverConfig;
use crate::error::{SolverError, SolverResult};
use crate::sor::RedBlackSor;
use crate::stencil::Stencil;
use crate::system::{LinearSystem, fill};
use pf_core::numeric::{deterministic_sum, ensure_positive, max_abs};
use pf_core::timing::{Timer, solver_timing};
use pf_materials::MaterialModel;
use pf_mesh::{ColorClasses, CylindricalMesh};
use pf_sources::SourceModel;
use std::sync::Arc;
use tracing::debug;

/// Per-cell fields of one time level, in mesh linear order.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFields {
    /// Volumetric enthalpy [J/m³]
    pub enthalpy: Vec<f64>,
    /// Temperature [K]
    pub temperature: Vec<f64>,
    /// Melt fraction in `[0, 1]`
    pub phase_fraction: Vec<f64>,
    /// Vaporized fraction in `[0, 1]`
    pub vapor_fraction: Vec<f64>,
}

/// Convergence record of one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepDiagnostics {
    pub picard_iterations: usize,
    pub picard_converged: bool,
    /// Largest temperature change of the last Picard pass [K].
    pub picard_change: f64,
    /// Sweeps over all linear solves of the step.
    pub sor_sweeps: usize,
    /// Sweeps of the last linear solve.
    pub last_sor_sweeps: usize,
    /// Every linear solve reached its tolerance.
    pub sor_converged: bool,
    /// Worst final relative residual over the step's linear solves.
    pub max_residual: f64,
}

/// Crank-Nicolson enthalpy solver bound to one mesh, material and source set.
#[derive(Debug)]
pub struct ThermalSolver {
    stencil: Stencil,
    colors: ColorClasses,
    material: Arc<dyn MaterialModel>,
    sources: Arc<dyn SourceModel>,
    config: SolverConfig,
    /// Torch power deposited in every cell, `Q·V` [W].
    heat: Vec<f64>,
    system: LinearSystem,
    sor: RedBlackSor,
    work: Workspace,
}

#[derive(Debug, Clone, Default)]
struct Workspace {
    conductivity: Vec<f64>,
    conductance: Vec<f64>,
    balance: Vec<f64>,
    source: Vec<f64>,
    explicit: Vec<f64>,
    beta: Vec<f64>,
    tau: Vec<f64>,
}

impl Workspace {
    fn sized(cells: usize, entries: usize) -> Self {
        Self {
            conductivity: vec![0.0; cells],
            conductance: vec![0.0; entries],
            balance: vec![0.0; cells],
            source: vec![0.0; cells],
            explicit: vec![0.0; cells],
            beta: vec![0.0; cells],
            tau: vec![0.0; cells],
        }
    }
}

impl ThermalSolver {
    pub fn new(
        mesh: &CylindricalMesh,
        material: Arc<dyn MaterialModel>,
        sources: Arc<dyn SourceModel>,
        config: SolverConfig,
    ) -> SolverResult<Self> {
        config.validate()?;
        let stencil = Stencil::new(mesh);
        let colors = ColorClasses::for_mesh(mesh);
        let heat = sources
            .heat_field(mesh)
            .into_vec()
            .into_iter()
            .zip(stencil.volumes())
            .map(|(q, v)| q * v)
            .collect();
        let system = LinearSystem::new(&stencil);
        let work = Workspace::sized(stencil.len(), stencil.nnz());
        debug!(
            cells = stencil.len(),
            entries = stencil.nnz(),
            colors = colors.num_colors(),
            "thermal solver ready"
        );
        Ok(Self {
            stencil,
            colors,
            material,
            sources,
            config,
            heat,
            system,
            sor: RedBlackSor::new(config.sor),
            work,
        })
    }

    pub fn len(&self) -> usize {
        self.stencil.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stencil.is_empty()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn material(&self) -> &Arc<dyn MaterialModel> {
        &self.material
    }

    pub fn sources(&self) -> &Arc<dyn SourceModel> {
        &self.sources
    }

    pub fn stencil(&self) -> &Stencil {
        &self.stencil
    }

    /// Torch power per cell [W].
    pub fn heat_input(&self) -> &[f64] {
        &self.heat
    }

    /// Total torch power deposited in the mesh [W].
    pub fn total_heat_input(&self) -> f64 {
        deterministic_sum(&self.heat)
    }

    /// Net wall loss [W] at the given temperatures.
    pub fn boundary_loss(&self, temperature: &[f64]) -> f64 {
        let per_cell: Vec<f64> = (0..self.stencil.len())
            .map(|p| {
                self.stencil
                    .wall_faces(p)
                    .iter()
                    .map(|&(wall, area)| area * self.sources.boundary_flux(wall, temperature[p]))
                    .sum()
            })
            .collect();
        deterministic_sum(&per_cell)
    }

    fn parallel(&self) -> bool {
        self.stencil.len() >= self.config.sor.parallel_min_cells
    }

    fn check_len(&self, field: &[f64]) -> SolverResult<()> {
        if field.len() != self.stencil.len() {
            return Err(SolverError::DimensionMismatch {
                expected: self.stencil.len(),
                actual: field.len(),
            });
        }
        Ok(())
    }

    /// Fields of a charge at the given temperatures. The temperatures are
    /// kept as given; enthalpy and fractions are derived from them.
    pub fn initial_fields(&self, temperature: Vec<f64>) -> SolverResult<StepFields> {
        self.check_len(&temperature)?;
        let parallel = self.parallel();
        let material = self.material.as_ref();
        let mut enthalpy = vec![0.0; temperature.len()];
        fill(&mut enthalpy, parallel, |p| material.enthalpy(temperature[p]));
        let (phase_fraction, vapor_fraction) = self.fractions(&enthalpy);
        Ok(StepFields {
            enthalpy,
            temperature,
            phase_fraction,
            vapor_fraction,
        })
    }

    /// Invert an enthalpy field to temperature and phase fractions.
    pub fn invert(&self, enthalpy: Vec<f64>) -> StepFields {
        let timer = Timer::start();
        let mut temperature = vec![0.0; enthalpy.len()];
        self.invert_temperature(&enthalpy, &mut temperature);
        let (phase_fraction, vapor_fraction) = self.fractions(&enthalpy);
        timer.stop_into(&solver_timing::INVERSION);
        StepFields {
            enthalpy,
            temperature,
            phase_fraction,
            vapor_fraction,
        }
    }

    fn invert_temperature(&self, enthalpy: &[f64], out: &mut [f64]) {
        let material = self.material.as_ref();
        fill(out, self.parallel(), |p| material.temperature(enthalpy[p]));
    }

    fn fractions(&self, enthalpy: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let parallel = self.parallel();
        let material = self.material.as_ref();
        let mut melt = vec![0.0; enthalpy.len()];
        let mut vapor = vec![0.0; enthalpy.len()];
        fill(&mut melt, parallel, |p| material.phase_fraction(enthalpy[p]));
        fill(&mut vapor, parallel, |p| material.vapor_fraction(enthalpy[p]));
        (melt, vapor)
    }

    /// Advance one time level of length `dt` from the given fields.
    ///
    /// Sources and wall losses are evaluated at the old temperature. The
    /// conductivities and `T(E)` of the new level are lagged at the Picard
    /// iterate and refreshed until the temperature change drops below the
    /// Picard tolerance or the pass limit is reached. Neither limit is an
    /// error; the diagnostics report them.
    pub fn advance(
        &mut self,
        enthalpy: &[f64],
        temperature: &[f64],
        dt: f64,
    ) -> SolverResult<(StepFields, StepDiagnostics)> {
        ensure_positive(dt, "dt").map_err(|_| SolverError::InvalidTimeStep { dt })?;
        self.check_len(enthalpy)?;
        self.check_len(temperature)?;
        let step_timer = Timer::start();
        let parallel = self.parallel();
        let material = Arc::clone(&self.material);
        let sources = Arc::clone(&self.sources);
        let n = self.stencil.len();

        let timer = Timer::start();
        {
            let w = &mut self.work;
            cell_conductivity(material.as_ref(), temperature, &mut w.conductivity, parallel);
            face_conductance(&self.stencil, &w.conductivity, &mut w.conductance, parallel);
            conductive_balance(
                &self.stencil,
                &w.conductance,
                temperature,
                &mut w.balance,
                parallel,
            );
            explicit_source(
                &self.stencil,
                sources.as_ref(),
                &self.heat,
                temperature,
                &mut w.source,
                parallel,
            );
            explicit_rhs(
                &self.stencil,
                dt,
                enthalpy,
                &w.balance,
                &w.source,
                &mut w.explicit,
                parallel,
            );
        }
        timer.stop_into(&solver_timing::ASSEMBLY);

        let mut e_star = enthalpy.to_vec();
        let mut t_star = temperature.to_vec();
        let mut t_next = vec![0.0; n];
        let mut delta = vec![0.0; n];
        let mut diag = StepDiagnostics {
            sor_converged: true,
            ..StepDiagnostics::default()
        };

        for pass in 1..=self.config.max_picard_iterations {
            let timer = Timer::start();
            {
                let w = &mut self.work;
                // The first pass linearizes around the old level, whose
                // conductances are already in the workspace.
                if pass > 1 {
                    cell_conductivity(material.as_ref(), &t_star, &mut w.conductivity, parallel);
                    face_conductance(&self.stencil, &w.conductivity, &mut w.conductance, parallel);
                }
                linearize(material.as_ref(), &e_star, &t_star, &mut w.beta, &mut w.tau, parallel);
                assemble(
                    &self.stencil,
                    dt,
                    &w.conductance,
                    &w.beta,
                    &w.tau,
                    &w.explicit,
                    &mut self.system,
                    parallel,
                );
            }
            timer.stop_into(&solver_timing::ASSEMBLY);

            let timer = Timer::start();
            let outcome = self
                .sor
                .solve(&self.stencil, &self.system, &self.colors, &mut e_star)?;
            timer.stop_into(&solver_timing::SOR_SOLVE);
            diag.sor_sweeps += outcome.iterations;
            diag.last_sor_sweeps = outcome.iterations;
            diag.sor_converged &= outcome.converged;
            diag.max_residual = diag.max_residual.max(outcome.residual);

            let timer = Timer::start();
            self.invert_temperature(&e_star, &mut t_next);
            timer.stop_into(&solver_timing::INVERSION);
            {
                let (t_next, t_star) = (&t_next, &t_star);
                fill(&mut delta, parallel, |p| t_next[p] - t_star[p]);
            }
            std::mem::swap(&mut t_star, &mut t_next);

            diag.picard_iterations = pass;
            diag.picard_change = max_abs(&delta);
            if diag.picard_change < self.config.picard_tolerance {
                diag.picard_converged = true;
                break;
            }
        }

        let (phase_fraction, vapor_fraction) = self.fractions(&e_star);
        step_timer.stop_into(&solver_timing::STEP);
        debug!(
            picard = diag.picard_iterations,
            sweeps = diag.sor_sweeps,
            residual = diag.max_residual,
            change = diag.picard_change,
            "step solved"
        );
        Ok((
            StepFields {
                enthalpy: e_star,
                temperature: t_star,
                phase_fraction,
                vapor_fraction,
            },
            diag,
        ))
    }
}

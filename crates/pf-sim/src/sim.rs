//! Time stepping of one furnace run.

use crate::error::{SimError, SimResult};
use crate::metrics::StateMetrics;
use crate::progress::{ConvergenceWarning, ProgressEvent, WarningKind};
use crate::run::{CancelToken, RunStatus};
use crate::state::SimulationState;
use pf_core::{ensure_non_negative, ensure_positive};
use pf_materials::MaterialModel;
use pf_mesh::{CylindricalMesh, Grid};
use pf_solver::{SolverConfig, SolverError, StepDiagnostics, StepFields, ThermalSolver};
use pf_sources::SourceModel;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Final simulation time (seconds)
    pub total_time: f64,
    /// Fixed time step (seconds). The last step is shortened to land on
    /// `total_time`.
    pub dt: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            total_time: 60.0,
            dt: 0.5,
            max_steps: 100_000,
            record_every: 10,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.dt, "dt").map_err(|_| SimError::Validation {
            what: "dt",
            value: self.dt,
        })?;
        ensure_non_negative(self.total_time, "total_time").map_err(|_| SimError::Validation {
            what: "total_time",
            value: self.total_time,
        })?;
        if self.record_every == 0 {
            return Err(SimError::Validation {
                what: "record_every",
                value: 0.0,
            });
        }
        let steps = self.step_count();
        if steps > self.max_steps {
            return Err(SimError::Validation {
                what: "step count (exceeds max_steps)",
                value: steps as f64,
            });
        }
        Ok(())
    }

    /// Number of steps needed to reach `total_time`.
    pub fn step_count(&self) -> usize {
        let ratio = self.total_time / self.dt;
        let whole = ratio.floor();
        // A remainder below the landing tolerance does not get its own step.
        if ratio - whole > LANDING_TOLERANCE {
            whole as usize + 1
        } else {
            whole as usize
        }
    }

    fn landing_slack(&self) -> f64 {
        LANDING_TOLERANCE * self.dt
    }
}

/// Remaining time below this share of `dt` counts as arrival.
const LANDING_TOLERANCE: f64 = 1e-9;

/// Starting temperature of the charge.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialTemperature {
    Uniform(f64),
    Field(Grid<f64>),
}

/// Everything a finished (or abandoned) run leaves behind.
#[derive(Debug, Clone, PartialEq)]
pub struct SimRecord {
    pub status: RunStatus,
    /// Time of every recorded frame [s].
    pub times: Vec<f64>,
    /// Step index of every recorded frame.
    pub steps: Vec<usize>,
    pub temperature_frames: Vec<Grid<f64>>,
    pub phase_fraction_frames: Vec<Grid<f64>>,
    pub final_metrics: StateMetrics,
    pub warnings: Vec<ConvergenceWarning>,
    pub error: Option<SimError>,
}

#[derive(Debug, Clone, Default)]
struct Frames {
    times: Vec<f64>,
    steps: Vec<usize>,
    temperature: Vec<Grid<f64>>,
    phase_fraction: Vec<Grid<f64>>,
}

impl Frames {
    fn push(&mut self, state: &SimulationState) {
        self.times.push(state.current_time());
        self.steps.push(state.step_index());
        self.temperature.push(state.temperature().clone());
        self.phase_fraction.push(state.phase_fraction().clone());
    }
}

/// A run of the furnace model, advanced one step at a time.
#[derive(Debug)]
pub struct Simulation {
    mesh: CylindricalMesh,
    solver: ThermalSolver,
    state: SimulationState,
    options: SimOptions,
    status: RunStatus,
    temperature_ceiling: f64,
    warnings: Vec<ConvergenceWarning>,
    recent_warnings: Vec<ConvergenceWarning>,
    last_diagnostics: StepDiagnostics,
    frames: Frames,
    error: Option<SimError>,
}

impl Simulation {
    pub fn new(
        mesh: CylindricalMesh,
        material: Arc<dyn MaterialModel>,
        sources: Arc<dyn SourceModel>,
        solver_config: SolverConfig,
        options: SimOptions,
        initial: InitialTemperature,
    ) -> SimResult<Self> {
        options.validate()?;
        let temperature = match initial {
            InitialTemperature::Uniform(t) => vec![t; mesh.len()],
            InitialTemperature::Field(grid) => {
                if !grid.matches(&mesh) {
                    return Err(SimError::Validation {
                        what: "initial temperature field size",
                        value: grid.len() as f64,
                    });
                }
                grid.into_vec()
            }
        };
        let t_max = material.max_temperature();
        if let Some(&bad) = temperature
            .iter()
            .find(|t| !(t.is_finite() && **t >= 0.0 && **t <= t_max))
        {
            return Err(SimError::Validation {
                what: "initial temperature",
                value: bad,
            });
        }

        let temperature_ceiling = material.temperature_ceiling();
        let solver = ThermalSolver::new(&mesh, material, sources, solver_config)?;
        let fields = solver.initial_fields(temperature)?;
        let state = SimulationState::new(&mesh, fields)?;
        let mut frames = Frames::default();
        frames.push(&state);

        Ok(Self {
            mesh,
            solver,
            state,
            options,
            status: RunStatus::Idle,
            temperature_ceiling,
            warnings: Vec::new(),
            recent_warnings: Vec::new(),
            last_diagnostics: StepDiagnostics::default(),
            frames,
            error: None,
        })
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn mesh(&self) -> &CylindricalMesh {
        &self.mesh
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    pub fn solver(&self) -> &ThermalSolver {
        &self.solver
    }

    /// Every convergence warning raised so far.
    pub fn warnings(&self) -> &[ConvergenceWarning] {
        &self.warnings
    }

    /// The error that failed the run, if it failed.
    pub fn error(&self) -> Option<&SimError> {
        self.error.as_ref()
    }

    /// Progress report of the current state.
    pub fn progress(&self) -> ProgressEvent {
        ProgressEvent {
            current_time: self.state.current_time(),
            step_index: self.state.step_index(),
            total_time: self.options.total_time,
            status: self.status,
            stats: self.state.temperature_stats(),
            warnings: self.recent_warnings.clone(),
            sor_sweeps: self.last_diagnostics.sor_sweeps,
            picard_iterations: self.last_diagnostics.picard_iterations,
        }
    }

    /// Advance by one time step and report progress.
    ///
    /// The first call starts the run. A run that reached `total_time` is
    /// completed; a numerical failure leaves the state at the last valid step
    /// and fails the run. Terminal runs reject further steps.
    pub fn advance_one_step(&mut self) -> SimResult<ProgressEvent> {
        match self.status {
            status if status.is_terminal() => {
                return Err(SimError::InvalidTransition {
                    from: status,
                    action: "advance",
                });
            }
            RunStatus::Idle => {
                self.status = RunStatus::Running;
                info!(
                    cells = self.mesh.len(),
                    steps = self.options.step_count(),
                    dt = self.options.dt,
                    total_time = self.options.total_time,
                    "run started"
                );
            }
            _ => {}
        }
        self.recent_warnings.clear();
        self.last_diagnostics = StepDiagnostics::default();

        let now = self.state.current_time();
        let remaining = self.options.total_time - now;
        let slack = self.options.landing_slack();
        if remaining <= slack {
            self.complete();
            return Ok(self.progress());
        }
        let last = remaining <= self.options.dt + slack;
        let dt = if last { remaining } else { self.options.dt };
        let time = if last { self.options.total_time } else { now + dt };
        let step = self.state.step_index() + 1;

        let outcome = self.solver.advance(
            self.state.enthalpy().as_slice(),
            self.state.temperature().as_slice(),
            dt,
        );
        let (fields, diagnostics) = match outcome {
            Ok(solved) => solved,
            Err(SolverError::Diverged {
                iterations,
                residual,
            }) => {
                return Err(self.fail(SimError::Diverged {
                    step: self.state.step_index(),
                    time,
                    iterations,
                    residual,
                }));
            }
            Err(other) => return Err(self.fail(other.into())),
        };

        if let Some(err) = self.check_fields(&fields, time) {
            return Err(self.fail(err));
        }
        self.state.commit(&fields, time);
        self.record_warnings(step, time, &diagnostics);
        self.last_diagnostics = diagnostics;

        if last {
            self.complete();
        }
        if step % self.options.record_every == 0 || last {
            self.frames.push(&self.state);
        }
        Ok(self.progress())
    }

    /// Step until the run is terminal or `cancel` is raised, reporting every
    /// step to `on_progress`. Cancellation is observed between steps.
    pub fn run_to_completion(
        &mut self,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(&ProgressEvent),
    ) -> SimResult<RunStatus> {
        while !self.status.is_terminal() {
            if cancel.is_cancelled() {
                self.cancel()?;
                break;
            }
            let event = self.advance_one_step()?;
            on_progress(&event);
        }
        Ok(self.status)
    }

    /// Stop the run at the current step. Cancelling twice is a no-op.
    pub fn cancel(&mut self) -> SimResult<()> {
        match self.status {
            RunStatus::Idle | RunStatus::Running => {
                self.status = RunStatus::Cancelled;
                info!(
                    step = self.state.step_index(),
                    time = self.state.current_time(),
                    "run cancelled"
                );
                Ok(())
            }
            RunStatus::Cancelled => Ok(()),
            from => Err(SimError::InvalidTransition {
                from,
                action: "cancel",
            }),
        }
    }

    /// Recorded frames, metrics and warnings of the run.
    pub fn into_results(mut self) -> SimRecord {
        let recorded = self.frames.steps.last() == Some(&self.state.step_index());
        if !recorded {
            self.frames.push(&self.state);
        }
        SimRecord {
            status: self.status,
            final_metrics: self.state.metrics(),
            times: self.frames.times,
            steps: self.frames.steps,
            temperature_frames: self.frames.temperature,
            phase_fraction_frames: self.frames.phase_fraction,
            warnings: self.warnings,
            error: self.error,
        }
    }

    fn complete(&mut self) {
        self.status = RunStatus::Completed;
        let stats = self.state.temperature_stats();
        info!(
            steps = self.state.step_index(),
            time = self.state.current_time(),
            t_max = stats.max,
            warnings = self.warnings.len(),
            "run completed"
        );
    }

    fn fail(&mut self, err: SimError) -> SimError {
        self.status = RunStatus::Failed;
        error!(
            step = self.state.step_index(),
            time = self.state.current_time(),
            "run failed: {err}"
        );
        self.error = Some(err.clone());
        err
    }

    /// First cell of a solved step that is non-finite or outside
    /// `[0, ceiling]`.
    fn check_fields(&self, fields: &StepFields, time: f64) -> Option<SimError> {
        let ceiling = self.temperature_ceiling;
        let unstable = |cell: usize, value: f64, reason: &'static str| {
            Some(SimError::NumericalInstability {
                step: self.state.step_index(),
                time,
                cell,
                value,
                reason,
            })
        };
        for (cell, (&t, &e)) in fields.temperature.iter().zip(&fields.enthalpy).enumerate() {
            if !e.is_finite() {
                return unstable(cell, e, "non-finite enthalpy");
            }
            if !t.is_finite() {
                return unstable(cell, t, "non-finite temperature");
            }
            if t < 0.0 {
                return unstable(cell, t, "negative temperature");
            }
            if t > ceiling {
                return unstable(cell, t, "temperature above the validity ceiling");
            }
        }
        None
    }

    fn record_warnings(&mut self, step: usize, time: f64, diagnostics: &StepDiagnostics) {
        if !diagnostics.sor_converged {
            warn!(
                step,
                time,
                sweeps = diagnostics.sor_sweeps,
                residual = diagnostics.max_residual,
                "SOR stopped at the sweep limit"
            );
            self.recent_warnings.push(ConvergenceWarning {
                step,
                time,
                iterations: diagnostics.sor_sweeps,
                residual: diagnostics.max_residual,
                kind: WarningKind::SorSweepLimit,
            });
        }
        if !diagnostics.picard_converged {
            warn!(
                step,
                time,
                passes = diagnostics.picard_iterations,
                change = diagnostics.picard_change,
                "coefficient iteration stopped at the pass limit"
            );
            self.recent_warnings.push(ConvergenceWarning {
                step,
                time,
                iterations: diagnostics.picard_iterations,
                residual: diagnostics.picard_change,
                kind: WarningKind::PicardLimit,
            });
        }
        self.warnings.extend_from_slice(&self.recent_warnings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use pf_core::units::m;
    use pf_materials::MaterialId;
    use pf_mesh::Wall;

    /// Uniform volumetric heating, no wall exchange.
    #[derive(Debug)]
    struct UniformHeat(f64);

    impl SourceModel for UniformHeat {
        fn volumetric_heat(&self, _x: &Point3<f64>) -> f64 {
            self.0
        }

        fn boundary_flux(&self, _wall: Wall, _t: f64) -> f64 {
            0.0
        }

        fn ambient_temperature(&self) -> f64 {
            300.0
        }
    }

    fn simulation(heat: f64, options: SimOptions) -> Simulation {
        simulation_with(heat, options, SolverConfig::default())
    }

    fn simulation_with(heat: f64, options: SimOptions, config: SolverConfig) -> Simulation {
        let mesh = CylindricalMesh::new(m(0.2), m(0.2), 3, 2, 3).unwrap();
        let material = Arc::new(MaterialId::Aluminum.build().unwrap());
        Simulation::new(
            mesh,
            material,
            Arc::new(UniformHeat(heat)),
            config,
            options,
            InitialTemperature::Uniform(400.0),
        )
        .unwrap()
    }

    fn short_run() -> SimOptions {
        SimOptions {
            total_time: 1.0,
            dt: 0.3,
            max_steps: 100,
            record_every: 2,
        }
    }

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.total_time, 60.0);
        assert_eq!(opts.dt, 0.5);
        assert_eq!(opts.step_count(), 120);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn sim_options_invalid() {
        let bad_dt = SimOptions {
            dt: 0.0,
            ..SimOptions::default()
        };
        assert!(matches!(
            bad_dt.validate(),
            Err(SimError::Validation { what: "dt", .. })
        ));
        let too_many = SimOptions {
            max_steps: 10,
            ..SimOptions::default()
        };
        assert!(too_many.validate().is_err());
        let no_record = SimOptions {
            record_every: 0,
            ..SimOptions::default()
        };
        assert!(no_record.validate().is_err());
        let nan_total = SimOptions {
            total_time: f64::NAN,
            ..SimOptions::default()
        };
        assert!(matches!(
            nan_total.validate(),
            Err(SimError::Validation { what: "total_time", .. })
        ));
    }

    #[test]
    fn last_step_lands_on_total_time() {
        let mut sim = simulation(1e5, short_run());
        assert_eq!(sim.options().step_count(), 4);
        let mut times = Vec::new();
        while !sim.status().is_terminal() {
            times.push(sim.advance_one_step().unwrap().current_time);
        }
        assert_eq!(times.len(), 4);
        assert_eq!(*times.last().unwrap(), 1.0);
        assert!((times[2] - 0.9).abs() < 1e-12);
        assert_eq!(sim.status(), RunStatus::Completed);
    }

    #[test]
    fn lifecycle_rejects_steps_after_completion() {
        let mut sim = simulation(0.0, short_run());
        assert_eq!(sim.status(), RunStatus::Idle);
        sim.advance_one_step().unwrap();
        assert_eq!(sim.status(), RunStatus::Running);
        let status = sim.run_to_completion(&CancelToken::new(), |_| {}).unwrap();
        assert_eq!(status, RunStatus::Completed);
        assert_eq!(
            sim.advance_one_step(),
            Err(SimError::InvalidTransition {
                from: RunStatus::Completed,
                action: "advance"
            })
        );
        assert!(sim.cancel().is_err());
    }

    #[test]
    fn zero_duration_completes_without_a_step() {
        let opts = SimOptions {
            total_time: 0.0,
            ..short_run()
        };
        let mut sim = simulation(1e5, opts);
        let event = sim.advance_one_step().unwrap();
        assert_eq!(event.step_index, 0);
        assert_eq!(event.status, RunStatus::Completed);
        assert_eq!(event.fraction_complete(), 1.0);
    }

    #[test]
    fn cancellation_is_seen_between_steps() {
        let mut sim = simulation(1e5, SimOptions::default());
        let cancel = CancelToken::new();
        let mut seen = 0;
        let status = sim
            .run_to_completion(&cancel, |event| {
                seen += 1;
                if event.step_index == 3 {
                    cancel.cancel();
                }
            })
            .unwrap();
        assert_eq!(status, RunStatus::Cancelled);
        assert_eq!(seen, 3);
        assert_eq!(sim.state().step_index(), 3);
        assert!(sim.cancel().is_ok());
        assert!(matches!(
            sim.advance_one_step(),
            Err(SimError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn runaway_heating_fails_and_keeps_the_last_valid_state() {
        let mut sim = simulation(1e14, short_run());
        let before = sim.state().snapshot();
        let err = sim.advance_one_step().unwrap_err();
        assert!(
            matches!(err, SimError::NumericalInstability { step: 0, .. }),
            "{err:?}"
        );
        assert_eq!(sim.status(), RunStatus::Failed);
        assert_eq!(sim.state(), &before);
        assert_eq!(sim.error(), Some(&err));
        let record = sim.into_results();
        assert_eq!(record.status, RunStatus::Failed);
        assert_eq!(record.error, Some(err));
        assert_eq!(record.steps, vec![0]);
    }

    fn sor_limit_count(warnings: &[ConvergenceWarning]) -> usize {
        warnings
            .iter()
            .filter(|w| w.kind == WarningKind::SorSweepLimit)
            .count()
    }

    #[test]
    fn sweep_limit_warns_and_the_run_continues() {
        let mut config = SolverConfig::default();
        config.sor.max_iterations = 1;
        config.sor.tolerance = 1e-15;
        let mut sim = simulation_with(1e5, short_run(), config);

        let event = sim.advance_one_step().unwrap();
        assert_eq!(event.status, RunStatus::Running);
        assert_eq!(sim.status(), RunStatus::Running);
        assert_eq!(event.step_index, 1);
        assert_eq!(sor_limit_count(&event.warnings), 1);
        assert!(event.warnings.iter().all(|w| w.step == 1));
        assert!(event.sor_sweeps >= 1);

        let status = sim.run_to_completion(&CancelToken::new(), |_| {}).unwrap();
        assert_eq!(status, RunStatus::Completed);
        assert_eq!(sor_limit_count(sim.warnings()), 4);
        let record = sim.into_results();
        assert_eq!(sor_limit_count(&record.warnings), 4);
        let steps: Vec<usize> = record
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::SorSweepLimit)
            .map(|w| w.step)
            .collect();
        assert_eq!(steps, vec![1, 2, 3, 4]);
        assert!(record.error.is_none());
    }

    #[test]
    fn divergence_fails_the_run_at_the_last_valid_step() {
        let mut config = SolverConfig::default();
        config.sor.tolerance = 1e-15;
        config.sor.divergence_threshold = 1e-14;
        let mut sim = simulation_with(1e5, short_run(), config);
        let before = sim.state().snapshot();

        let err = sim.advance_one_step().unwrap_err();
        assert!(
            matches!(err, SimError::Diverged { step: 0, iterations: 1, .. }),
            "{err:?}"
        );
        assert_eq!(sim.status(), RunStatus::Failed);
        assert_eq!(sim.state(), &before);
        assert!(matches!(
            sim.advance_one_step(),
            Err(SimError::InvalidTransition { from: RunStatus::Failed, .. })
        ));
        let record = sim.into_results();
        assert_eq!(record.status, RunStatus::Failed);
        assert_eq!(record.error, Some(err));
        assert_eq!(record.steps, vec![0]);
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn initial_temperature_is_validated() {
        let mesh = CylindricalMesh::new(m(0.2), m(0.2), 2, 1, 2).unwrap();
        let material = Arc::new(MaterialId::Aluminum.build().unwrap());
        let build = |initial| {
            Simulation::new(
                mesh.clone(),
                material.clone(),
                Arc::new(UniformHeat(0.0)),
                SolverConfig::default(),
                SimOptions::default(),
                initial,
            )
        };
        assert!(matches!(
            build(InitialTemperature::Uniform(5000.0)),
            Err(SimError::Validation {
                what: "initial temperature",
                ..
            })
        ));
        assert!(build(InitialTemperature::Uniform(f64::NAN)).is_err());
        let wrong = Grid::filled(2, 2, 2, 300.0);
        assert!(build(InitialTemperature::Field(wrong)).is_err());
        let field = Grid::for_mesh(&mesh, 350.0);
        assert!(build(InitialTemperature::Field(field)).is_ok());
    }

    #[test]
    fn frames_follow_record_every() {
        let mut sim = simulation(1e5, short_run());
        sim.run_to_completion(&CancelToken::new(), |_| {}).unwrap();
        let record = sim.into_results();
        assert_eq!(record.steps, vec![0, 2, 4]);
        assert_eq!(record.times.len(), record.temperature_frames.len());
        assert_eq!(record.phase_fraction_frames.len(), 3);
        assert_eq!(record.final_metrics.step_index, 4);
        assert!(record.error.is_none());
    }
}

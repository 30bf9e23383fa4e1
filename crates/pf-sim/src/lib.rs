//! Transient furnace runs.
//!
//! Provides:
//! - `SimulationState`, the per-cell enthalpy, temperature and phase fields of
//!   the latest committed step, with read-only metrics
//! - `Simulation`, the run state machine that drives the thermal solver one
//!   step at a time, checks every step for non-physical values and records
//!   frames
//! - progress events, convergence warnings and cooperative cancellation

pub mod error;
pub mod metrics;
pub mod progress;
pub mod run;
pub mod sim;
pub mod state;

pub use error::{SimError, SimResult};
pub use metrics::{StateMetrics, TemperatureStats};
pub use progress::{ConvergenceWarning, ProgressEvent, WarningKind};
pub use run::{CancelToken, RunStatus};
pub use sim::{InitialTemperature, SimOptions, SimRecord, Simulation};
pub use state::SimulationState;

//! Per-step progress reports and convergence warnings.

use crate::metrics::TemperatureStats;
use crate::run::RunStatus;
use serde::{Deserialize, Serialize};

/// Which iteration stopped at its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A linear solve hit its sweep limit; the last iterate was kept.
    SorSweepLimit,
    /// The coefficient re-linearization hit its pass limit.
    PicardLimit,
}

/// Non-fatal convergence shortfall of one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceWarning {
    pub step: usize,
    pub time: f64,
    pub iterations: usize,
    /// Relative residual for [`WarningKind::SorSweepLimit`], largest
    /// temperature change [K] for [`WarningKind::PicardLimit`].
    pub residual: f64,
    pub kind: WarningKind,
}

/// Emitted after every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub current_time: f64,
    pub step_index: usize,
    pub total_time: f64,
    pub status: RunStatus,
    pub stats: TemperatureStats,
    /// Warnings raised by this step.
    pub warnings: Vec<ConvergenceWarning>,
    /// SOR sweeps spent on this step, summed over Picard passes.
    pub sor_sweeps: usize,
    pub picard_iterations: usize,
}

impl ProgressEvent {
    /// Share of the simulated interval covered so far, in `[0, 1]`.
    pub fn fraction_complete(&self) -> f64 {
        if self.total_time > 0.0 {
            (self.current_time / self.total_time).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

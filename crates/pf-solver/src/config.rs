//! Solver settings.

use crate::error::{SolverError, SolverResult};
use pf_core::ensure_positive;
use serde::{Deserialize, Serialize};

fn positive(value: f64, what: &'static str) -> SolverResult<f64> {
    ensure_positive(value, what).map_err(|_| SolverError::InvalidConfig { what, value })
}

/// Red-black SOR settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorConfig {
    /// Over-relaxation factor ω, strictly inside `(1, 2)`.
    pub relaxation: f64,
    /// Stop when `‖A·x - b‖∞ / ‖b‖∞` falls below this.
    pub tolerance: f64,
    /// Sweep limit per linear solve. Hitting it is a warning, not an error.
    pub max_iterations: usize,
    /// Relative residual above which the solve is declared divergent.
    pub divergence_threshold: f64,
    /// Below this many cells the sweeps run on the calling thread.
    pub parallel_min_cells: usize,
}

impl Default for SorConfig {
    fn default() -> Self {
        Self {
            relaxation: 1.5,
            tolerance: 1e-10,
            max_iterations: 5000,
            divergence_threshold: 1e8,
            parallel_min_cells: 4096,
        }
    }
}

impl SorConfig {
    pub fn validate(&self) -> SolverResult<()> {
        if !(self.relaxation > 1.0 && self.relaxation < 2.0) {
            return Err(SolverError::InvalidConfig {
                what: "relaxation",
                value: self.relaxation,
            });
        }
        positive(self.tolerance, "tolerance")?;
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig {
                what: "max_iterations",
                value: 0.0,
            });
        }
        if !(self.divergence_threshold > self.tolerance) {
            return Err(SolverError::InvalidConfig {
                what: "divergence_threshold",
                value: self.divergence_threshold,
            });
        }
        Ok(())
    }
}

/// Time-step solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub sor: SorConfig,
    /// Re-linearizations of `T(E)` and `k(T)` per step.
    pub max_picard_iterations: usize,
    /// Picard loop stops once the largest temperature change is below this [K].
    pub picard_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sor: SorConfig::default(),
            max_picard_iterations: 10,
            picard_tolerance: 1e-3,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> SolverResult<()> {
        self.sor.validate()?;
        if self.max_picard_iterations == 0 {
            return Err(SolverError::InvalidConfig {
                what: "max_picard_iterations",
                value: 0.0,
            });
        }
        positive(self.picard_tolerance, "picard_tolerance")?;
        Ok(())
    }
}

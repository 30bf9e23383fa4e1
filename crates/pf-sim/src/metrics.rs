//! Read-only field statistics.

use pf_core::numeric::{deterministic_dot, deterministic_sum, finite_min_max};
use serde::{Deserialize, Serialize};

/// Temperature summary of one field [K].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    pub min: f64,
    pub max: f64,
    /// Arithmetic mean over cells.
    pub mean: f64,
    /// Mean weighted by cell volume.
    pub volume_mean: f64,
}

impl TemperatureStats {
    /// Statistics of `temperature` with cell `volumes`. Min and max are NaN if
    /// the field holds a non-finite value.
    pub fn from_field(temperature: &[f64], volumes: &[f64]) -> Self {
        let (min, max) = finite_min_max(temperature).unwrap_or((f64::NAN, f64::NAN));
        let n = temperature.len().max(1) as f64;
        let total_volume = deterministic_sum(volumes);
        Self {
            min,
            max,
            mean: deterministic_sum(temperature) / n,
            volume_mean: deterministic_dot(temperature, volumes) / total_volume,
        }
    }
}

/// Global quantities of one simulation state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateMetrics {
    pub current_time: f64,
    pub step_index: usize,
    pub temperature: TemperatureStats,
    /// `Σ E·V` [J], latent heat included.
    pub total_energy: f64,
    /// `Σ f·V` over the melt fraction [m³].
    pub melted_volume: f64,
    /// `Σ f_v·V` over the vapor fraction [m³].
    pub vaporized_volume: f64,
    /// Melted share of the charge volume.
    pub melt_fraction: f64,
}

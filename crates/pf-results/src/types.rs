//! Result data types.

use crate::hash::field_digest;
use pf_mesh::Grid;
use pf_sim::{ConvergenceWarning, RunStatus, SimRecord, StateMetrics};
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub name: String,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    pub solver_version: String,
    pub mesh: MeshSummary,
    pub dt_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshSummary {
    pub nr: usize,
    pub ntheta: usize,
    pub nz: usize,
    pub cells: usize,
}

/// Frames and metrics of one run, in recording order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub run_id: RunId,
    pub started_at: String,
    pub status: RunStatus,
    /// Time of every frame [s].
    pub time_steps: Vec<f64>,
    pub step_indices: Vec<usize>,
    pub temperature_fields: Vec<Grid<f64>>,
    pub phase_fraction_fields: Vec<Grid<f64>>,
    pub final_metrics: StateMetrics,
    pub warnings: Vec<ConvergenceWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub manifest: RunManifest,
}

impl ResultBundle {
    pub fn from_record(manifest: RunManifest, record: SimRecord) -> Self {
        Self {
            run_id: manifest.run_id.clone(),
            started_at: manifest.started_at.clone(),
            status: record.status,
            time_steps: record.times,
            step_indices: record.steps,
            temperature_fields: record.temperature_frames,
            phase_fraction_fields: record.phase_fraction_frames,
            final_metrics: record.final_metrics,
            warnings: record.warnings,
            error: record.error.map(|e| e.to_string()),
            manifest,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.time_steps.len()
    }

    /// Last recorded temperature field.
    pub fn final_temperature(&self) -> Option<&Grid<f64>> {
        self.temperature_fields.last()
    }

    /// Compact report without the fields.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id.clone(),
            name: self.manifest.name.clone(),
            status: self.status,
            steps: self.final_metrics.step_index,
            frames: self.frame_count(),
            final_metrics: self.final_metrics,
            warnings: self.warnings.len(),
            error: self.error.clone(),
            temperature_digest: field_digest(&self.temperature_fields),
        }
    }

    pub fn to_json(&self) -> crate::ResultsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(content: &str) -> crate::ResultsResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub name: String,
    pub status: RunStatus,
    pub steps: usize,
    pub frames: usize,
    pub final_metrics: StateMetrics,
    pub warnings: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// SHA-256 over the recorded temperature frames.
    pub temperature_digest: String,
}

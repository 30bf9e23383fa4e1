//! Shared application service layer for the furnace simulator.
//!
//! Turns validated run parameters into a runnable model and drives each run
//! on its own worker thread, so front ends only deal with handles, progress
//! snapshots and result bundles.

pub mod error;
pub mod run_service;
pub mod runtime_compile;

pub use error::{AppError, AppResult};
pub use run_service::{RunHandle, SOLVER_VERSION, start};
pub use runtime_compile::{
    FurnaceRuntime, build_boundary, build_mesh, build_sim_options, build_solver_config,
    build_torches, compile_params,
};

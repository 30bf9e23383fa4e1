//! Implicit heat-conduction solver for the cylindrical furnace.
//!
//! The unknown is the volumetric enthalpy `E` of every cell. One time step
//! solves the finite-volume Crank-Nicolson balance
//!
//! ```text
//! V·(E' - E)/Δt = ½·[L(T) + L(T')] + S
//! ```
//!
//! where `L` is the conductive flux balance and `S` the explicit torch and
//! wall terms. The nonlinear `T(E)` and `k(T)` are linearized around the
//! current iterate (lagged coefficients) and the resulting sparse system is
//! solved with red-black SOR inside an outer Picard loop.

pub mod assembly;
pub mod config;
pub mod error;
pub mod sor;
pub mod stencil;
pub mod system;
pub mod thermal;

pub use config::{SolverConfig, SorConfig};
pub use error::{SolverError, SolverResult};
pub use sor::{RedBlackSor, SorOutcome};
pub use stencil::Stencil;
pub use system::LinearSystem;
pub use thermal::{StepDiagnostics, StepFields, ThermalSolver};

//! pf-materials: temperature-dependent solid/liquid/vapor material properties.
//!
//! Provides:
//! - `PropertyCurve` for k(T) and cp(T) (constant, linear, tabulated)
//! - the `MaterialModel` trait the solver depends on
//! - `PhaseChangeMaterial`, the enthalpy-method implementation with flat
//!   latent-heat plateaus at the melting and vaporization temperatures
//! - a small catalog of furnace charge materials
//!
//! # Enthalpy convention
//!
//! Enthalpy is volumetric (J/m³) and referenced to `H(0 K) = 0`. The mapping
//! `H(T)` is strictly increasing except on the two plateaus
//! `[H_s, H_s + ρ·L_fusion]` at `T_melt` and `[H_v, H_v + ρ·L_vap]` at `T_vap`,
//! where `T(H)` returns the transition temperature exactly.
//!
//! # Example
//!
//! ```
//! use pf_materials::{MaterialId, MaterialModel};
//!
//! let steel = MaterialId::Steel.build().unwrap();
//! let t_melt = steel.melting().temperature;
//! let bounds = steel.enthalpy_bounds();
//! let mid_plateau = 0.5 * (bounds.melt_start + bounds.melt_end);
//! assert_eq!(steel.temperature(mid_plateau), t_melt);
//! assert!((steel.phase_fraction(mid_plateau) - 0.5).abs() < 1e-12);
//! ```

pub mod catalog;
pub mod curve;
pub mod error;
pub mod model;
pub mod phase_change;

pub use catalog::{
    MaterialCatalogEntry, MaterialId, filter_material_catalog, material_catalog,
};
pub use curve::PropertyCurve;
pub use error::{MaterialError, MaterialResult};
pub use model::{EnthalpyBounds, MaterialModel, Phase, PhaseTransition};
pub use phase_change::{MaterialSpec, PhaseChangeMaterial};

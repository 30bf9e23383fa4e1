//! pf-sources: heat sources and boundary sinks of the furnace.
//!
//! Provides:
//! - `PlasmaTorch`, a Gaussian volumetric heat source evaluated with full 3-D
//!   Cartesian distances
//! - `BoundaryConfig` for radiative and convective losses at the side wall,
//!   floor and roof
//! - the `SourceModel` strategy trait the solver depends on, and
//!   `FurnaceSources`, its standard implementation

pub mod boundary;
pub mod error;
pub mod model;
pub mod torch;

pub use boundary::{BoundaryConfig, WallSet, convective_flux, radiative_flux};
pub use error::{SourceError, SourceResult};
pub use model::{FurnaceSources, SourceModel};
pub use torch::PlasmaTorch;

//! Discretized cylindrical furnace domain.
//!
//! Provides the finite-volume mesh of a cylinder of radius `R` and height `H`
//! split into `nr × nθ × nz` wedge cells, a dense [`Grid`] container for
//! per-cell fields, and the independent-set coloring used by the red-black
//! SOR sweeps.

pub mod coloring;
pub mod error;
pub mod grid;
pub mod mesh;

pub use coloring::ColorClasses;
pub use error::{MeshError, MeshResult};
pub use grid::Grid;
pub use mesh::{CellIndex, CylCoord, CylindricalMesh, Face, Neighbor, Wall};

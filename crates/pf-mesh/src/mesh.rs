//! Cylindrical finite-volume mesh.
//!
//! Cells are wedges `[i·Δr, (i+1)·Δr] × [j·Δθ, (j+1)·Δθ] × [k·Δz, (k+1)·Δz]`.
//! Volumes and face areas use the exact wedge geometry, so the innermost ring
//! needs no `1/r` evaluation: its inner face collapses onto the axis with zero
//! area and is reported as [`Neighbor::Axis`].

use crate::error::{MeshError, MeshResult};
use nalgebra::Point3;
use pf_core::ensure_positive;
use pf_core::units::Length;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// (i, j, k) = (radial, angular, axial) cell index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl CellIndex {
    pub const fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }
}

/// Cylindrical coordinate (r [m], θ [rad], z [m]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylCoord {
    pub r: f64,
    pub theta: f64,
    pub z: f64,
}

impl CylCoord {
    pub fn to_cartesian(&self) -> Point3<f64> {
        Point3::new(self.r * self.theta.cos(), self.r * self.theta.sin(), self.z)
    }
}

/// Outer boundaries of the furnace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wall {
    /// Cylindrical wall at r = R
    Side,
    /// Floor at z = 0
    Bottom,
    /// Roof at z = H
    Top,
}

/// The six faces of a wedge cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    RadialInner,
    RadialOuter,
    AngularMinus,
    AngularPlus,
    AxialBottom,
    AxialTop,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::RadialInner,
        Face::RadialOuter,
        Face::AngularMinus,
        Face::AngularPlus,
        Face::AxialBottom,
        Face::AxialTop,
    ];
}

/// What lies across a cell face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Neighbor {
    /// Interior face shared with another cell.
    Cell {
        index: usize,
        /// Face area [m²]
        area: f64,
        /// Center-to-center distance [m]
        distance: f64,
    },
    /// Degenerate inner face of the innermost ring (r = 0). Zero area, zero flux.
    Axis,
    /// Domain boundary.
    Wall {
        wall: Wall,
        /// Face area [m²]
        area: f64,
        /// Center-to-face distance [m]
        distance: f64,
    },
    /// No face: angular faces of a closed ring when nθ = 1.
    None,
}

fn dimension(value: f64, what: &'static str) -> MeshResult<f64> {
    ensure_positive(value, what).map_err(|_| MeshError::InvalidDimension { what, value })
}

/// Immutable cylindrical mesh of the furnace interior.
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalMesh {
    radius: f64,
    height: f64,
    nr: usize,
    ntheta: usize,
    nz: usize,
    dr: f64,
    dtheta: f64,
    dz: f64,
}

impl CylindricalMesh {
    /// Build a mesh of `nr × ntheta × nz` cells.
    pub fn new(
        radius: Length,
        height: Length,
        nr: usize,
        ntheta: usize,
        nz: usize,
    ) -> MeshResult<Self> {
        let radius = dimension(radius.value, "radius")?;
        let height = dimension(height.value, "height")?;
        for (what, n) in [("nr", nr), ("ntheta", ntheta), ("nz", nz)] {
            if n == 0 {
                return Err(MeshError::ZeroCount { what });
            }
        }
        Ok(Self {
            radius,
            height,
            nr,
            ntheta,
            nz,
            dr: radius / nr as f64,
            dtheta: 2.0 * PI / ntheta as f64,
            dz: height / nz as f64,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// (nr, nθ, nz)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.nr, self.ntheta, self.nz)
    }

    /// (Δr, Δθ, Δz)
    pub fn spacing(&self) -> (f64, f64, f64) {
        (self.dr, self.dtheta, self.dz)
    }

    /// True when angular cells collapse into closed rings (axisymmetric case).
    pub fn is_axisymmetric(&self) -> bool {
        self.ntheta == 1
    }

    pub fn len(&self) -> usize {
        self.nr * self.ntheta * self.nz
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn index(&self, c: CellIndex) -> usize {
        debug_assert!(c.i < self.nr && c.j < self.ntheta && c.k < self.nz);
        c.i + self.nr * (c.j + self.ntheta * c.k)
    }

    #[inline]
    pub fn cell(&self, index: usize) -> CellIndex {
        debug_assert!(index < self.len());
        let i = index % self.nr;
        let rest = index / self.nr;
        CellIndex {
            i,
            j: rest % self.ntheta,
            k: rest / self.ntheta,
        }
    }

    /// All cells in linear (lexicographic) order.
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.len()).map(move |idx| self.cell(idx))
    }

    /// Cell-center coordinate.
    pub fn center(&self, c: CellIndex) -> CylCoord {
        CylCoord {
            r: (c.i as f64 + 0.5) * self.dr,
            theta: (c.j as f64 + 0.5) * self.dtheta,
            z: (c.k as f64 + 0.5) * self.dz,
        }
    }

    /// Cartesian position of the cell center, used for torch distances.
    pub fn position(&self, c: CellIndex) -> Point3<f64> {
        self.center(c).to_cartesian()
    }

    /// Cell containing a cylindrical coordinate, if it lies inside the furnace.
    pub fn locate(&self, p: CylCoord) -> Option<CellIndex> {
        if !(0.0..=self.radius).contains(&p.r) || !(0.0..=self.height).contains(&p.z) {
            return None;
        }
        let i = ((p.r / self.dr) as usize).min(self.nr - 1);
        let k = ((p.z / self.dz) as usize).min(self.nz - 1);
        let theta = p.theta.rem_euclid(2.0 * PI);
        let j = ((theta / self.dtheta) as usize).min(self.ntheta - 1);
        Some(CellIndex { i, j, k })
    }

    /// True if a Cartesian point lies inside the closed cylinder.
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        let r = p.x.hypot(p.y);
        r <= self.radius && (0.0..=self.height).contains(&p.z)
    }

    /// The cell rotated by `shift` angular steps about the axis.
    pub fn rotate(&self, c: CellIndex, shift: usize) -> CellIndex {
        CellIndex {
            j: (c.j + shift) % self.ntheta,
            ..c
        }
    }

    /// Cell volume [m³]: ½(r_o² - r_i²)·Δθ·Δz = r_c·Δr·Δθ·Δz.
    #[inline]
    pub fn volume(&self, c: CellIndex) -> f64 {
        (c.i as f64 + 0.5) * self.dr * self.dr * self.dtheta * self.dz
    }

    pub fn total_volume(&self) -> f64 {
        PI * self.radius * self.radius * self.height
    }

    /// Area [m²] of a face.
    pub fn face_area(&self, c: CellIndex, face: Face) -> f64 {
        match face {
            Face::RadialInner => c.i as f64 * self.dr * self.dtheta * self.dz,
            Face::RadialOuter => (c.i + 1) as f64 * self.dr * self.dtheta * self.dz,
            Face::AngularMinus | Face::AngularPlus => self.dr * self.dz,
            Face::AxialBottom | Face::AxialTop => self.volume(c) / self.dz,
        }
    }

    /// Resolve what lies across `face` of cell `c`.
    pub fn neighbor(&self, c: CellIndex, face: Face) -> Neighbor {
        let area = self.face_area(c, face);
        match face {
            Face::RadialInner => {
                if c.i == 0 {
                    Neighbor::Axis
                } else {
                    Neighbor::Cell {
                        index: self.index(CellIndex { i: c.i - 1, ..c }),
                        area,
                        distance: self.dr,
                    }
                }
            }
            Face::RadialOuter => {
                if c.i + 1 == self.nr {
                    Neighbor::Wall {
                        wall: Wall::Side,
                        area,
                        distance: 0.5 * self.dr,
                    }
                } else {
                    Neighbor::Cell {
                        index: self.index(CellIndex { i: c.i + 1, ..c }),
                        area,
                        distance: self.dr,
                    }
                }
            }
            Face::AngularMinus | Face::AngularPlus => {
                if self.ntheta == 1 {
                    return Neighbor::None;
                }
                let j = if face == Face::AngularPlus {
                    (c.j + 1) % self.ntheta
                } else {
                    (c.j + self.ntheta - 1) % self.ntheta
                };
                Neighbor::Cell {
                    index: self.index(CellIndex { j, ..c }),
                    area,
                    distance: self.center(c).r * self.dtheta,
                }
            }
            Face::AxialBottom => {
                if c.k == 0 {
                    Neighbor::Wall {
                        wall: Wall::Bottom,
                        area,
                        distance: 0.5 * self.dz,
                    }
                } else {
                    Neighbor::Cell {
                        index: self.index(CellIndex { k: c.k - 1, ..c }),
                        area,
                        distance: self.dz,
                    }
                }
            }
            Face::AxialTop => {
                if c.k + 1 == self.nz {
                    Neighbor::Wall {
                        wall: Wall::Top,
                        area,
                        distance: 0.5 * self.dz,
                    }
                } else {
                    Neighbor::Cell {
                        index: self.index(CellIndex { k: c.k + 1, ..c }),
                        area,
                        distance: self.dz,
                    }
                }
            }
        }
    }

    /// All six neighbors in [`Face::ALL`] order.
    pub fn neighbors(&self, c: CellIndex) -> [Neighbor; 6] {
        Face::ALL.map(|face| self.neighbor(c, face))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use pf_core::units::m;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn index_is_a_bijection(nr in 1usize..8, ntheta in 1usize..8, nz in 1usize..8, seed in 0usize..10_000) {
            let mesh = CylindricalMesh::new(m(1.0), m(1.0), nr, ntheta, nz).unwrap();
            let idx = seed % mesh.len();
            let c = mesh.cell(idx);
            prop_assert_eq!(mesh.index(c), idx);
            prop_assert!(c.i < nr && c.j < ntheta && c.k < nz);
        }
    }
}

//! Sparse finite-volume connectivity of the mesh.
//!
//! The pattern is built once per mesh and shared by every assembly: for each
//! cell the interior faces as `(neighbor, A/d)` entries in CSR layout, plus the
//! wall faces that exchange heat with the surroundings. Axis faces and the
//! angular faces of a closed ring carry no flux and have no entry.

use pf_mesh::{CylindricalMesh, Neighbor, Wall};
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct Stencil {
    row_ptr: Vec<usize>,
    cols: Vec<usize>,
    rows: Vec<usize>,
    geometry: Vec<f64>,
    volumes: Vec<f64>,
    wall_ptr: Vec<usize>,
    wall_faces: Vec<(Wall, f64)>,
}

impl Stencil {
    pub fn new(mesh: &CylindricalMesh) -> Self {
        let n = mesh.len();
        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut cols = Vec::with_capacity(6 * n);
        let mut rows = Vec::with_capacity(6 * n);
        let mut geometry = Vec::with_capacity(6 * n);
        let mut volumes = Vec::with_capacity(n);
        let mut wall_ptr = Vec::with_capacity(n + 1);
        let mut wall_faces = Vec::new();

        row_ptr.push(0);
        wall_ptr.push(0);
        for (row, cell) in mesh.cells().enumerate() {
            for neighbor in mesh.neighbors(cell) {
                match neighbor {
                    Neighbor::Cell {
                        index,
                        area,
                        distance,
                    } => {
                        cols.push(index);
                        rows.push(row);
                        geometry.push(area / distance);
                    }
                    Neighbor::Wall { wall, area, .. } => wall_faces.push((wall, area)),
                    Neighbor::Axis | Neighbor::None => {}
                }
            }
            row_ptr.push(cols.len());
            wall_ptr.push(wall_faces.len());
            volumes.push(mesh.volume(cell));
        }

        Self {
            row_ptr,
            cols,
            rows,
            geometry,
            volumes,
            wall_ptr,
            wall_faces,
        }
    }

    /// Number of cells (rows).
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Number of interior face entries.
    pub fn nnz(&self) -> usize {
        self.cols.len()
    }

    /// Entry range of row `p`.
    #[inline]
    pub fn row_range(&self, p: usize) -> Range<usize> {
        self.row_ptr[p]..self.row_ptr[p + 1]
    }

    /// Neighbor cell of every entry.
    #[inline]
    pub fn cols(&self) -> &[usize] {
        &self.cols
    }

    /// Owning row of every entry.
    #[inline]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Face area over center distance, `A/d` [m], of every entry.
    #[inline]
    pub fn geometry(&self) -> &[f64] {
        &self.geometry
    }

    #[inline]
    pub fn volume(&self, p: usize) -> f64 {
        self.volumes[p]
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Wall faces of cell `p` as `(wall, area [m²])`.
    #[inline]
    pub fn wall_faces(&self, p: usize) -> &[(Wall, f64)] {
        &self.wall_faces[self.wall_ptr[p]..self.wall_ptr[p + 1]]
    }
}

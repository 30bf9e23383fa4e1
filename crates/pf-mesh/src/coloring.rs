//! Red-black partition of the mesh into independent sets.
//!
//! Cells of one class never share a face, so a Gauss-Seidel sweep over one
//! class only reads values of the other classes and every cell of the class can
//! be updated concurrently. The checkerboard `(i + j + k) mod 2` is exact
//! unless the periodic angular direction has an odd cell count; then the seam
//! column `j = nθ - 1` touches both `j = nθ - 2` and `j = 0` with equal parity
//! and is split off into two extra classes `2 + (i + k) mod 2`.

use crate::mesh::{CellIndex, CylindricalMesh};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorClasses {
    classes: Vec<Vec<usize>>,
}

impl ColorClasses {
    pub fn for_mesh(mesh: &CylindricalMesh) -> Self {
        let mut classes = vec![Vec::new(); Self::num_colors_for(mesh)];
        // Linear order is lexicographic, so each class is too.
        for idx in 0..mesh.len() {
            classes[Self::color_of(mesh, mesh.cell(idx))].push(idx);
        }
        Self { classes }
    }

    fn has_odd_seam(mesh: &CylindricalMesh) -> bool {
        let (_, ntheta, _) = mesh.counts();
        ntheta > 1 && ntheta % 2 == 1
    }

    fn num_colors_for(mesh: &CylindricalMesh) -> usize {
        if Self::has_odd_seam(mesh) { 4 } else { 2 }
    }

    /// Color class of a cell.
    pub fn color_of(mesh: &CylindricalMesh, c: CellIndex) -> usize {
        let (_, ntheta, _) = mesh.counts();
        if Self::has_odd_seam(mesh) && c.j == ntheta - 1 {
            2 + (c.i + c.k) % 2
        } else {
            (c.i + c.j + c.k) % 2
        }
    }

    /// Cell indices per class, in sweep order.
    pub fn classes(&self) -> &[Vec<usize>] {
        &self.classes
    }

    pub fn num_colors(&self) -> usize {
        self.classes.len()
    }
}

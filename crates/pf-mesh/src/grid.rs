//! Dense per-cell storage.

use crate::error::{MeshError, MeshResult};
use crate::mesh::{CellIndex, CylindricalMesh};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Dense 3-D field laid out in the mesh's linear order (`i` fastest, then `j`, then `k`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    nr: usize,
    ntheta: usize,
    nz: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Grid filled with a single value.
    pub fn filled(nr: usize, ntheta: usize, nz: usize, value: T) -> Self {
        Self {
            nr,
            ntheta,
            nz,
            data: vec![value; nr * ntheta * nz],
        }
    }

    /// Grid matching the mesh resolution, filled with a single value.
    pub fn for_mesh(mesh: &CylindricalMesh, value: T) -> Self {
        let (nr, ntheta, nz) = mesh.counts();
        Self::filled(nr, ntheta, nz, value)
    }
}

impl<T> Grid<T> {
    /// Wrap existing data; the length must equal `nr·nθ·nz`.
    pub fn from_vec(nr: usize, ntheta: usize, nz: usize, data: Vec<T>) -> MeshResult<Self> {
        let expected = nr * ntheta * nz;
        if data.len() != expected {
            return Err(MeshError::GridSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            nr,
            ntheta,
            nz,
            data,
        })
    }

    /// Build a grid by evaluating `f` at every cell of the mesh.
    pub fn from_fn(mesh: &CylindricalMesh, mut f: impl FnMut(CellIndex) -> T) -> Self {
        let (nr, ntheta, nz) = mesh.counts();
        let data = mesh.cells().map(&mut f).collect();
        Self {
            nr,
            ntheta,
            nz,
            data,
        }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nr, self.ntheta, self.nz)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if this grid can hold a field of `mesh`.
    pub fn matches(&self, mesh: &CylindricalMesh) -> bool {
        self.dims() == mesh.counts()
    }

    #[inline]
    fn linear(&self, c: CellIndex) -> usize {
        debug_assert!(c.i < self.nr && c.j < self.ntheta && c.k < self.nz);
        c.i + self.nr * (c.j + self.ntheta * c.k)
    }

    pub fn get(&self, c: CellIndex) -> &T {
        &self.data[self.linear(c)]
    }

    pub fn get_mut(&mut self, c: CellIndex) -> &mut T {
        let idx = self.linear(c);
        &mut self.data[idx]
    }

    pub fn set(&mut self, c: CellIndex, value: T) {
        let idx = self.linear(c);
        self.data[idx] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Values with their `(i, j, k)` index, in storage order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellIndex, &T)> + '_ {
        let (nr, ntheta) = (self.nr, self.ntheta);
        self.data.iter().enumerate().map(move |(p, v)| {
            let i = p % nr;
            let j = (p / nr) % ntheta;
            let k = p / (nr * ntheta);
            (CellIndex::new(i, j, k), v)
        })
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            nr: self.nr,
            ntheta: self.ntheta,
            nz: self.nz,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Index<usize> for Grid<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.data[idx]
    }
}

impl<T> IndexMut<usize> for Grid<T> {
    fn index_mut(&mut self, idx: usize) -> &mut T {
        &mut self.data[idx]
    }
}

impl<T> Index<CellIndex> for Grid<T> {
    type Output = T;

    fn index(&self, c: CellIndex) -> &T {
        self.get(c)
    }
}

impl<T> IndexMut<CellIndex> for Grid<T> {
    fn index_mut(&mut self, c: CellIndex) -> &mut T {
        self.get_mut(c)
    }
}

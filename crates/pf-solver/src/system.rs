//! Sparse linear system `A·x = b` on the stencil pattern.

use crate::stencil::Stencil;
use pf_core::numeric::max_abs;
use rayon::prelude::*;

/// Diagonal, off-diagonal and right-hand side values of one assembly.
///
/// Off-diagonal values are aligned with the stencil entries; the pattern
/// itself lives in [`Stencil`] and is not duplicated.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    pub(crate) diag: Vec<f64>,
    pub(crate) off: Vec<f64>,
    pub(crate) rhs: Vec<f64>,
}

impl LinearSystem {
    pub fn new(stencil: &Stencil) -> Self {
        Self {
            diag: vec![0.0; stencil.len()],
            off: vec![0.0; stencil.nnz()],
            rhs: vec![0.0; stencil.len()],
        }
    }

    pub fn diag(&self) -> &[f64] {
        &self.diag
    }

    pub fn off_diagonal(&self) -> &[f64] {
        &self.off
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// `Σ_q A_pq·x_q` for row `p`.
    #[inline]
    pub fn row_product(&self, stencil: &Stencil, p: usize, x: &[f64]) -> f64 {
        let cols = stencil.cols();
        let mut acc = self.diag[p] * x[p];
        for e in stencil.row_range(p) {
            acc += self.off[e] * x[cols[e]];
        }
        acc
    }

    /// `b - A·x` written into `out`.
    pub fn residual_into(&self, stencil: &Stencil, x: &[f64], out: &mut [f64], parallel: bool) {
        fill(out, parallel, |p| self.rhs[p] - self.row_product(stencil, p, x));
    }

    /// `‖b - A·x‖∞ / ‖b‖∞`, or the absolute norm when `b = 0`. NaN propagates.
    pub fn relative_residual(
        &self,
        stencil: &Stencil,
        x: &[f64],
        scratch: &mut [f64],
        parallel: bool,
    ) -> f64 {
        self.residual_into(stencil, x, scratch, parallel);
        let r = max_abs(scratch);
        let scale = max_abs(&self.rhs);
        if scale > 0.0 { r / scale } else { r }
    }
}

/// Evaluate `f` for every index of `out`, on rayon workers when `parallel`.
///
/// Each output depends only on its own index, so both paths give identical
/// results.
pub(crate) fn fill<F>(out: &mut [f64], parallel: bool, f: F)
where
    F: Fn(usize) -> f64 + Sync,
{
    if parallel {
        out.par_iter_mut().enumerate().for_each(|(i, o)| *o = f(i));
    } else {
        out.iter_mut().enumerate().for_each(|(i, o)| *o = f(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::m;
    use pf_mesh::CylindricalMesh;

    fn laplacian_like(stencil: &Stencil) -> LinearSystem {
        let mut sys = LinearSystem::new(stencil);
        for p in 0..stencil.len() {
            let range = stencil.row_range(p);
            sys.diag[p] = 1.0 + range.len() as f64;
            for e in range {
                sys.off[e] = -1.0;
            }
            sys.rhs[p] = 1.0;
        }
        sys
    }

    #[test]
    fn constant_vector_has_unit_row_sums() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 3, 4, 3).unwrap();
        let stencil = Stencil::new(&mesh);
        let sys = laplacian_like(&stencil);
        let x = vec![1.0; stencil.len()];
        for p in 0..stencil.len() {
            assert_eq!(sys.row_product(&stencil, p, &x), 1.0);
        }
        let mut scratch = vec![0.0; stencil.len()];
        assert_eq!(sys.relative_residual(&stencil, &x, &mut scratch, false), 0.0);
    }

    #[test]
    fn parallel_and_serial_residuals_agree() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 5, 6, 4).unwrap();
        let stencil = Stencil::new(&mesh);
        let sys = laplacian_like(&stencil);
        let x: Vec<f64> = (0..stencil.len()).map(|i| (i as f64).sin()).collect();
        let mut a = vec![0.0; stencil.len()];
        let mut b = vec![0.0; stencil.len()];
        sys.residual_into(&stencil, &x, &mut a, false);
        sys.residual_into(&stencil, &x, &mut b, true);
        assert_eq!(a, b);
    }

    #[test]
    fn nan_residual_propagates() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 2, 1, 2).unwrap();
        let stencil = Stencil::new(&mesh);
        let sys = laplacian_like(&stencil);
        let mut x = vec![0.0; stencil.len()];
        x[1] = f64::NAN;
        let mut scratch = vec![0.0; stencil.len()];
        assert!(sys.relative_residual(&stencil, &x, &mut scratch, false).is_nan());
    }
}

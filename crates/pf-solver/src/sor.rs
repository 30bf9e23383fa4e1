//! Red-black successive over-relaxation.
//!
//! Cells are swept one color class at a time. A class is an independent set,
//! so every update in it reads only values of the other classes: the new
//! values are computed from an immutable view of `x` (concurrently when the
//! system is large enough) and scattered afterwards. The classes are visited
//! in a fixed order, which keeps the Gauss-Seidel character of the iteration
//! and makes the result independent of the number of worker threads.

use crate::config::SorConfig;
use crate::error::{SolverError, SolverResult};
use crate::stencil::Stencil;
use crate::system::LinearSystem;
use pf_mesh::ColorClasses;
use rayon::prelude::*;
use tracing::debug;

/// Result of one linear solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SorOutcome {
    /// Full sweeps performed.
    pub iterations: usize,
    /// Final relative residual `‖b - A·x‖∞ / ‖b‖∞`.
    pub residual: f64,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct RedBlackSor {
    config: SorConfig,
    updates: Vec<f64>,
    residual: Vec<f64>,
}

impl RedBlackSor {
    pub fn new(config: SorConfig) -> Self {
        Self {
            config,
            updates: Vec::new(),
            residual: Vec::new(),
        }
    }

    pub fn config(&self) -> &SorConfig {
        &self.config
    }

    /// Iterate on `x` in place until the relative residual drops below the
    /// tolerance or the sweep limit is reached.
    ///
    /// Reaching the sweep limit returns `Ok` with `converged == false` and the
    /// last iterate left in `x`. A non-finite residual is an error, and so is a
    /// swept iterate whose residual exceeds the divergence threshold. The
    /// starting guess is never held to the threshold.
    pub fn solve(
        &mut self,
        stencil: &Stencil,
        system: &LinearSystem,
        colors: &ColorClasses,
        x: &mut [f64],
    ) -> SolverResult<SorOutcome> {
        let n = stencil.len();
        if x.len() != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                actual: x.len(),
            });
        }
        let parallel = n >= self.config.parallel_min_cells;
        self.residual.resize(n, 0.0);
        let widest = colors.classes().iter().map(Vec::len).max().unwrap_or(0);
        self.updates.resize(widest, 0.0);

        let mut residual = system.relative_residual(stencil, x, &mut self.residual, parallel);
        let mut iterations = 0;
        while residual >= self.config.tolerance || residual.is_nan() {
            let runaway = iterations > 0 && residual > self.config.divergence_threshold;
            if !residual.is_finite() || runaway {
                return Err(SolverError::Diverged {
                    iterations,
                    residual,
                });
            }
            if iterations == self.config.max_iterations {
                debug!(iterations, residual, "SOR stopped at the sweep limit");
                return Ok(SorOutcome {
                    iterations,
                    residual,
                    converged: false,
                });
            }
            self.sweep(stencil, system, colors, x, parallel);
            iterations += 1;
            residual = system.relative_residual(stencil, x, &mut self.residual, parallel);
        }

        debug!(iterations, residual, "SOR converged");
        Ok(SorOutcome {
            iterations,
            residual,
            converged: true,
        })
    }

    fn sweep(
        &mut self,
        stencil: &Stencil,
        system: &LinearSystem,
        colors: &ColorClasses,
        x: &mut [f64],
        parallel: bool,
    ) {
        let omega = self.config.relaxation;
        let cols = stencil.cols();
        for class in colors.classes() {
            let updates = &mut self.updates[..class.len()];
            {
                let current: &[f64] = x;
                let relax = |p: usize| {
                    let mut sigma = 0.0;
                    for e in stencil.row_range(p) {
                        sigma += system.off[e] * current[cols[e]];
                    }
                    let gauss_seidel = (system.rhs[p] - sigma) / system.diag[p];
                    (1.0 - omega) * current[p] + omega * gauss_seidel
                };
                if parallel {
                    updates
                        .par_iter_mut()
                        .zip(class.par_iter())
                        .for_each(|(u, &p)| *u = relax(p));
                } else {
                    for (u, &p) in updates.iter_mut().zip(class) {
                        *u = relax(p);
                    }
                }
            }
            for (&p, &u) in class.iter().zip(updates.iter()) {
                x[p] = u;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::m;
    use pf_mesh::CylindricalMesh;

    /// Diagonally dominant system with a known solution.
    fn manufactured(mesh: &CylindricalMesh) -> (Stencil, LinearSystem, Vec<f64>) {
        let stencil = Stencil::new(mesh);
        let mut sys = LinearSystem::new(&stencil);
        let exact: Vec<f64> = (0..stencil.len()).map(|p| 1.0 + (p as f64 * 0.37).cos()).collect();
        for p in 0..stencil.len() {
            let mut offsum = 0.0;
            for e in stencil.row_range(p) {
                sys.off[e] = -stencil.geometry()[e];
                offsum += stencil.geometry()[e];
            }
            sys.diag[p] = offsum + stencil.volume(p);
        }
        for p in 0..stencil.len() {
            sys.rhs[p] = sys.row_product(&stencil, p, &exact);
        }
        (stencil, sys, exact)
    }

    #[test]
    fn converges_to_manufactured_solution() {
        for ntheta in [1, 4, 5] {
            let mesh = CylindricalMesh::new(m(1.0), m(1.0), 6, ntheta, 6).unwrap();
            let (stencil, sys, exact) = manufactured(&mesh);
            let colors = ColorClasses::for_mesh(&mesh);
            let mut sor = RedBlackSor::new(SorConfig {
                relaxation: 1.6,
                tolerance: 1e-13,
                ..SorConfig::default()
            });
            let mut x = vec![0.0; stencil.len()];
            let out = sor.solve(&stencil, &sys, &colors, &mut x).unwrap();
            assert!(out.converged, "ntheta={ntheta}: {out:?}");
            for (a, b) in x.iter().zip(&exact) {
                assert!((a - b).abs() < 1e-8, "ntheta={ntheta}");
            }
        }
    }

    #[test]
    fn exact_initial_guess_needs_no_sweep() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 3, 2, 3).unwrap();
        let (stencil, sys, exact) = manufactured(&mesh);
        let colors = ColorClasses::for_mesh(&mesh);
        let mut sor = RedBlackSor::new(SorConfig::default());
        let mut x = exact.clone();
        let out = sor.solve(&stencil, &sys, &colors, &mut x).unwrap();
        assert_eq!(out.iterations, 0);
        assert_eq!(x, exact);
    }

    #[test]
    fn sweep_limit_is_not_an_error() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 8, 4, 8).unwrap();
        let (stencil, sys, _) = manufactured(&mesh);
        let colors = ColorClasses::for_mesh(&mesh);
        let mut sor = RedBlackSor::new(SorConfig {
            max_iterations: 2,
            tolerance: 1e-14,
            ..SorConfig::default()
        });
        let mut x = vec![0.0; stencil.len()];
        let out = sor.solve(&stencil, &sys, &colors, &mut x).unwrap();
        assert!(!out.converged);
        assert_eq!(out.iterations, 2);
    }

    #[test]
    fn non_finite_guess_is_divergence() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 3, 1, 3).unwrap();
        let (stencil, sys, _) = manufactured(&mesh);
        let colors = ColorClasses::for_mesh(&mesh);
        let mut sor = RedBlackSor::new(SorConfig::default());
        let mut x = vec![0.0; stencil.len()];
        x[4] = f64::INFINITY;
        assert!(matches!(
            sor.solve(&stencil, &sys, &colors, &mut x),
            Err(SolverError::Diverged { iterations: 0, .. })
        ));
    }

    #[test]
    fn divergence_threshold_applies_to_swept_iterates() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 4, 2, 4).unwrap();
        let (stencil, sys, exact) = manufactured(&mesh);
        let colors = ColorClasses::for_mesh(&mesh);
        let tight = SorConfig {
            tolerance: 1e-15,
            divergence_threshold: 1e-14,
            ..SorConfig::default()
        };
        // A far-off start is swept once before the threshold is consulted.
        let mut sor = RedBlackSor::new(tight);
        let mut x: Vec<f64> = exact.iter().map(|v| v + 100.0).collect();
        assert!(matches!(
            sor.solve(&stencil, &sys, &colors, &mut x),
            Err(SolverError::Diverged { iterations: 1, .. })
        ));

        // A generous threshold lets the same start converge.
        let mut sor = RedBlackSor::new(SorConfig {
            tolerance: 1e-12,
            divergence_threshold: 1e3,
            ..SorConfig::default()
        });
        let mut x: Vec<f64> = exact.iter().map(|v| v + 100.0).collect();
        let out = sor.solve(&stencil, &sys, &colors, &mut x).unwrap();
        assert!(out.converged);
    }

    #[test]
    fn serial_and_parallel_sweeps_are_identical() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 7, 3, 5).unwrap();
        let (stencil, sys, _) = manufactured(&mesh);
        let colors = ColorClasses::for_mesh(&mesh);
        let run = |parallel_min_cells: usize| {
            let mut sor = RedBlackSor::new(SorConfig {
                parallel_min_cells,
                ..SorConfig::default()
            });
            let mut x = vec![0.0; stencil.len()];
            sor.solve(&stencil, &sys, &colors, &mut x).unwrap();
            x
        };
        assert_eq!(run(0), run(usize::MAX));
    }
}

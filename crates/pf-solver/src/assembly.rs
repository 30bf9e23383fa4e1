//! Crank-Nicolson assembly of the enthalpy balance.
//!
//! With face conductances `G = (A/d)·k_f`, `k_f` the harmonic mean of the two
//! cell conductivities, the conductive balance of cell `P` is
//! `L_P = Σ G·(T_nb - T_P)`. The new-level temperature is linearized around
//! the iterate `(E*, T*)` as `T ≈ τ + β·E` with `β = 1/(ρ·cp(T*))` and
//! `τ = T* - β·E*`, which turns
//!
//! ```text
//! V/Δt·E'_P - ½·Σ G*·(T'_nb - T'_P) = V/Δt·E_P + ½·L_P + S_P
//! ```
//!
//! into the row
//!
//! ```text
//! (V/Δt + ½·Σ G*·β_P)·E'_P - Σ ½·G*·β_nb·E'_nb = b_P - ½·Σ G*·(τ_P - τ_nb)
//! ```
//!
//! `G*` is symmetric in `P`/`nb`, so the face fluxes cancel pairwise and the
//! summed rows conserve energy exactly.

use crate::stencil::Stencil;
use crate::system::{LinearSystem, fill};
use pf_materials::MaterialModel;
use pf_sources::SourceModel;

/// Harmonic mean of two positive conductivities.
#[inline]
pub fn harmonic_mean(a: f64, b: f64) -> f64 {
    2.0 * a * b / (a + b)
}

/// Conductivity of every cell at `temperature`.
pub fn cell_conductivity(
    material: &dyn MaterialModel,
    temperature: &[f64],
    out: &mut [f64],
    parallel: bool,
) {
    fill(out, parallel, |p| material.conductivity(temperature[p]));
}

/// Face conductance `G` [W/K] of every stencil entry.
pub fn face_conductance(stencil: &Stencil, conductivity: &[f64], out: &mut [f64], parallel: bool) {
    let rows = stencil.rows();
    let cols = stencil.cols();
    let geometry = stencil.geometry();
    fill(out, parallel, |e| {
        geometry[e] * harmonic_mean(conductivity[rows[e]], conductivity[cols[e]])
    });
}

/// Net conductive inflow `L_P = Σ G·(T_nb - T_P)` [W] of every cell.
pub fn conductive_balance(
    stencil: &Stencil,
    conductance: &[f64],
    temperature: &[f64],
    out: &mut [f64],
    parallel: bool,
) {
    let cols = stencil.cols();
    fill(out, parallel, |p| {
        let t_p = temperature[p];
        let mut acc = 0.0;
        for e in stencil.row_range(p) {
            acc += conductance[e] * (temperature[cols[e]] - t_p);
        }
        acc
    });
}

/// Explicit source `S_P` [W]: deposited torch power minus wall losses at `T`.
pub fn explicit_source(
    stencil: &Stencil,
    sources: &dyn SourceModel,
    heat: &[f64],
    temperature: &[f64],
    out: &mut [f64],
    parallel: bool,
) {
    fill(out, parallel, |p| {
        let loss: f64 = stencil
            .wall_faces(p)
            .iter()
            .map(|&(wall, area)| area * sources.boundary_flux(wall, temperature[p]))
            .sum();
        heat[p] - loss
    });
}

/// Old-level part of the right-hand side, `V/Δt·E + ½·L + S` [W].
pub fn explicit_rhs(
    stencil: &Stencil,
    dt: f64,
    enthalpy: &[f64],
    balance: &[f64],
    source: &[f64],
    out: &mut [f64],
    parallel: bool,
) {
    let volumes = stencil.volumes();
    fill(out, parallel, |p| {
        volumes[p] / dt * enthalpy[p] + 0.5 * balance[p] + source[p]
    });
}

/// Linearization `β = dT/dE` and offset `τ = T* - β·E*` around the iterate.
pub fn linearize(
    material: &dyn MaterialModel,
    enthalpy: &[f64],
    temperature: &[f64],
    beta: &mut [f64],
    tau: &mut [f64],
    parallel: bool,
) {
    fill(beta, parallel, |p| material.enthalpy_slope(temperature[p]));
    let beta: &[f64] = beta;
    fill(tau, parallel, |p| temperature[p] - beta[p] * enthalpy[p]);
}

/// Fill `system` with the linearized Crank-Nicolson rows.
#[allow(clippy::too_many_arguments)]
pub fn assemble(
    stencil: &Stencil,
    dt: f64,
    conductance: &[f64],
    beta: &[f64],
    tau: &[f64],
    explicit: &[f64],
    system: &mut LinearSystem,
    parallel: bool,
) {
    let volumes = stencil.volumes();
    let cols = stencil.cols();

    fill(&mut system.off, parallel, |e| -0.5 * conductance[e] * beta[cols[e]]);
    fill(&mut system.diag, parallel, |p| {
        let g: f64 = stencil.row_range(p).map(|e| conductance[e]).sum();
        volumes[p] / dt + 0.5 * g * beta[p]
    });
    fill(&mut system.rhs, parallel, |p| {
        let mut correction = 0.0;
        for e in stencil.row_range(p) {
            correction += conductance[e] * (tau[p] - tau[cols[e]]);
        }
        explicit[p] - 0.5 * correction
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::m;
    use pf_materials::MaterialId;
    use pf_mesh::CylindricalMesh;

    #[test]
    fn harmonic_mean_properties() {
        assert_eq!(harmonic_mean(2.0, 2.0), 2.0);
        assert!(harmonic_mean(1.0, 100.0) < 2.0);
        assert_eq!(harmonic_mean(3.0, 7.0), harmonic_mean(7.0, 3.0));
    }

    #[test]
    fn uniform_field_has_no_conductive_flux() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 4, 3, 4).unwrap();
        let stencil = Stencil::new(&mesh);
        let steel = MaterialId::Steel.build().unwrap();
        let t = vec![700.0; stencil.len()];
        let mut k = vec![0.0; stencil.len()];
        let mut g = vec![0.0; stencil.nnz()];
        let mut l = vec![1.0; stencil.len()];
        cell_conductivity(&steel, &t, &mut k, false);
        face_conductance(&stencil, &k, &mut g, false);
        conductive_balance(&stencil, &g, &t, &mut l, false);
        assert!(l.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn conductive_balance_sums_to_zero() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 5, 4, 3).unwrap();
        let stencil = Stencil::new(&mesh);
        let copper = MaterialId::Copper.build().unwrap();
        let t: Vec<f64> = (0..stencil.len()).map(|p| 300.0 + 7.0 * p as f64).collect();
        let mut k = vec![0.0; stencil.len()];
        let mut g = vec![0.0; stencil.nnz()];
        let mut l = vec![0.0; stencil.len()];
        cell_conductivity(&copper, &t, &mut k, false);
        face_conductance(&stencil, &k, &mut g, false);
        conductive_balance(&stencil, &g, &t, &mut l, false);
        let net: f64 = l.iter().sum();
        let scale: f64 = l.iter().map(|v| v.abs()).sum();
        assert!(net.abs() < 1e-10 * scale);
    }

    #[test]
    fn rows_are_diagonally_dominant() {
        let mesh = CylindricalMesh::new(m(1.0), m(1.0), 4, 4, 4).unwrap();
        let stencil = Stencil::new(&mesh);
        let steel = MaterialId::Steel.build().unwrap();
        let n = stencil.len();
        let t = vec![900.0; n];
        let e: Vec<f64> = t.iter().map(|&t| steel.enthalpy(t)).collect();
        let mut k = vec![0.0; n];
        let mut g = vec![0.0; stencil.nnz()];
        let (mut beta, mut tau) = (vec![0.0; n], vec![0.0; n]);
        cell_conductivity(&steel, &t, &mut k, false);
        face_conductance(&stencil, &k, &mut g, false);
        linearize(&steel, &e, &t, &mut beta, &mut tau, false);
        let explicit = vec![0.0; n];
        let mut sys = LinearSystem::new(&stencil);
        assemble(&stencil, 10.0, &g, &beta, &tau, &explicit, &mut sys, false);
        for p in 0..n {
            let off: f64 = stencil.row_range(p).map(|e| sys.off_diagonal()[e].abs()).sum();
            assert!(sys.diag()[p] > off);
        }
    }
}

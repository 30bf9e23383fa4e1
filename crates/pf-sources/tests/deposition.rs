use pf_core::units::{k, m, rad, unitless, w, w_per_m2k};
use pf_materials::MaterialId;
use pf_mesh::{CylindricalMesh, Wall};
use pf_sources::{BoundaryConfig, FurnaceSources, PlasmaTorch, SourceModel};
use std::f64::consts::PI;

fn centered_torch(power: f64, sigma: f64) -> PlasmaTorch {
    PlasmaTorch::new(w(power), unitless(0.8), m(0.0), rad(0.0), m(1.0), m(sigma)).unwrap()
}

#[test]
fn deposited_power_matches_gaussian_integral() {
    // Well resolved and far from the walls, the mesh quadrature recovers the
    // analytic volume integral P·η·√(2π)·σ.
    let sigma = 0.2;
    let mesh = CylindricalMesh::new(m(1.0), m(2.0), 20, 16, 40).unwrap();
    let steel = MaterialId::Steel.build().unwrap();
    let src = FurnaceSources::new(
        vec![centered_torch(10_000.0, sigma)],
        BoundaryConfig::adiabatic(),
        &steel,
    );
    let deposited = src.deposited_power(&mesh);
    let analytic = 8_000.0 * (2.0 * PI).sqrt() * sigma;
    assert!(
        (deposited - analytic).abs() < 0.02 * analytic,
        "deposited={deposited} analytic={analytic}"
    );
}

#[test]
fn centered_torch_field_is_axisymmetric() {
    let mesh = CylindricalMesh::new(m(1.0), m(2.0), 6, 8, 10).unwrap();
    let steel = MaterialId::Steel.build().unwrap();
    let src = FurnaceSources::new(
        vec![centered_torch(5_000.0, 0.3)],
        BoundaryConfig::adiabatic(),
        &steel,
    );
    let field = src.heat_field(&mesh);
    for c in mesh.cells() {
        for shift in 1..8 {
            let rotated = mesh.rotate(c, shift);
            let (a, b) = (field[c], field[rotated]);
            assert!((a - b).abs() <= 1e-12 * a.abs().max(1e-300));
        }
    }
}

#[test]
fn hot_walls_lose_heat() {
    let steel = MaterialId::Steel.build().unwrap();
    let cfg = BoundaryConfig::new(k(300.0), w_per_m2k(20.0)).unwrap();
    let src = FurnaceSources::new(vec![], cfg, &steel);
    let mut last = 0.0;
    for t in [400.0, 800.0, 1600.0] {
        let q = src.boundary_flux(Wall::Top, t);
        assert!(q > last);
        last = q;
    }
}

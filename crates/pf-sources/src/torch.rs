//! Gaussian plasma torch.

use crate::error::{SourceError, SourceResult};
use nalgebra::Point3;
use pf_core::units::{Angle, Length, Power, Ratio};
use pf_core::{PfResult, ensure_finite, ensure_in_range, ensure_non_negative, ensure_positive};
use pf_mesh::CylCoord;
use std::f64::consts::PI;

fn torch_param(
    value: f64,
    what: &'static str,
    check: impl FnOnce(f64, &'static str) -> PfResult<f64>,
) -> SourceResult<f64> {
    check(value, what).map_err(|_| SourceError::InvalidTorch { what, value })
}

/// Plasma torch depositing heat with a Gaussian profile around its tip.
///
/// `Q(x) = P·η / (2π σ²) · exp(-‖x - x₀‖² / (2σ²))` [W/m³], with `‖·‖` the
/// Cartesian distance.
#[derive(Debug, Clone, PartialEq)]
pub struct PlasmaTorch {
    power: f64,
    efficiency: f64,
    location: CylCoord,
    position: Point3<f64>,
    sigma: f64,
}

impl PlasmaTorch {
    pub fn new(
        power: Power,
        efficiency: Ratio,
        r: Length,
        theta: Angle,
        z: Length,
        sigma: Length,
    ) -> SourceResult<Self> {
        let power = torch_param(power.value, "power", ensure_non_negative)?;
        let efficiency = torch_param(efficiency.value, "efficiency", |v, what| {
            ensure_in_range(v, 0.0, 1.0, what).and_then(|v| ensure_positive(v, what))
        })?;
        let sigma = torch_param(sigma.value, "sigma", ensure_positive)?;
        let location = CylCoord {
            r: torch_param(r.value, "r", ensure_non_negative)?,
            theta: torch_param(theta.value, "theta", ensure_finite)?,
            z: torch_param(z.value, "z", ensure_finite)?,
        };
        Ok(Self {
            power,
            efficiency,
            location,
            position: location.to_cartesian(),
            sigma,
        })
    }

    /// Electrical power [W]
    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// Gaussian spread [m]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Power coupled into the charge, `P·η` [W].
    pub fn absorbed_power(&self) -> f64 {
        self.power * self.efficiency
    }

    pub fn location(&self) -> CylCoord {
        self.location
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Deposition at the torch tip [W/m³].
    pub fn peak_density(&self) -> f64 {
        self.absorbed_power() / (2.0 * PI * self.sigma * self.sigma)
    }

    /// Deposition at `x` [W/m³].
    pub fn power_density(&self, x: &Point3<f64>) -> f64 {
        let d2 = nalgebra::distance_squared(x, &self.position);
        self.peak_density() * (-d2 / (2.0 * self.sigma * self.sigma)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{m, rad, unitless, w};

    fn torch(r: f64, theta: f64, z: f64) -> PlasmaTorch {
        PlasmaTorch::new(w(1000.0), unitless(0.5), m(r), rad(theta), m(z), m(0.1)).unwrap()
    }

    #[test]
    fn peak_follows_gaussian_normalization() {
        let t = torch(0.0, 0.0, 1.0);
        let expected = 500.0 / (2.0 * PI * 0.01);
        assert!((t.peak_density() - expected).abs() < 1e-9);
        assert!((t.power_density(&Point3::new(0.0, 0.0, 1.0)) - expected).abs() < 1e-9);
        // One sigma away: exp(-1/2).
        let q = t.power_density(&Point3::new(0.1, 0.0, 1.0));
        assert!((q - expected * (-0.5_f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn distance_is_three_dimensional() {
        let t = torch(0.5, 0.0, 1.0);
        // Same radius and height, opposite side of the axis.
        let near = t.power_density(&Point3::new(0.5, 0.0, 1.0));
        let far = t.power_density(&Point3::new(-0.5, 0.0, 1.0));
        assert!(near > 1e6 * far);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let bad_eff = PlasmaTorch::new(w(1.0), unitless(0.0), m(0.0), rad(0.0), m(0.0), m(0.1));
        assert!(matches!(
            bad_eff,
            Err(SourceError::InvalidTorch { what: "efficiency", .. })
        ));
        let bad_sigma = PlasmaTorch::new(w(1.0), unitless(1.0), m(0.0), rad(0.0), m(0.0), m(0.0));
        assert!(matches!(
            bad_sigma,
            Err(SourceError::InvalidTorch { what: "sigma", .. })
        ));
        let bad_power = PlasmaTorch::new(w(-1.0), unitless(1.0), m(0.0), rad(0.0), m(0.0), m(0.1));
        assert!(bad_power.is_err());
    }
}

//! Radiative and convective losses at the furnace walls.

use crate::error::{SourceError, SourceResult};
use pf_core::units::constants::STEFAN_BOLTZMANN;
use pf_core::units::{HeatTransfer, Ratio, Temperature};
use pf_core::{PfResult, ensure_in_range, ensure_non_negative};
use pf_mesh::Wall;
use serde::{Deserialize, Serialize};

/// Walls that exchange heat with the surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSet {
    pub side: bool,
    pub bottom: bool,
    pub top: bool,
}

impl WallSet {
    pub const ALL: WallSet = WallSet {
        side: true,
        bottom: true,
        top: true,
    };

    pub const NONE: WallSet = WallSet {
        side: false,
        bottom: false,
        top: false,
    };

    pub fn contains(&self, wall: Wall) -> bool {
        match wall {
            Wall::Side => self.side,
            Wall::Bottom => self.bottom,
            Wall::Top => self.top,
        }
    }
}

impl Default for WallSet {
    fn default() -> Self {
        Self::ALL
    }
}

fn boundary_param(
    value: f64,
    what: &'static str,
    check: impl FnOnce(f64, &'static str) -> PfResult<f64>,
) -> SourceResult<f64> {
    check(value, what).map_err(|_| SourceError::InvalidBoundary { what, value })
}

/// Ambient exchange at `r = R`, `z = 0` and `z = H`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConfig {
    ambient: f64,
    convection: f64,
    wall_emissivity: Option<f64>,
    walls: WallSet,
}

impl BoundaryConfig {
    pub fn new(ambient: Temperature, convection: HeatTransfer) -> SourceResult<Self> {
        let ambient = boundary_param(ambient.value, "ambient temperature", ensure_non_negative)?;
        let convection =
            boundary_param(convection.value, "convection coefficient", ensure_non_negative)?;
        Ok(Self {
            ambient,
            convection,
            wall_emissivity: None,
            walls: WallSet::ALL,
        })
    }

    /// Insulated furnace: no flux through any wall.
    pub fn adiabatic() -> Self {
        Self {
            ambient: 0.0,
            convection: 0.0,
            wall_emissivity: Some(0.0),
            walls: WallSet::NONE,
        }
    }

    /// Override the material emissivity at the walls.
    pub fn with_wall_emissivity(mut self, emissivity: Ratio) -> SourceResult<Self> {
        let value = boundary_param(emissivity.value, "wall emissivity", |v, what| {
            ensure_in_range(v, 0.0, 1.0, what)
        })?;
        self.wall_emissivity = Some(value);
        Ok(self)
    }

    pub fn with_walls(mut self, walls: WallSet) -> Self {
        self.walls = walls;
        self
    }

    /// Ambient temperature [K]
    pub fn ambient(&self) -> f64 {
        self.ambient
    }

    /// Convective coefficient `h` [W/(m²·K)]
    pub fn convection(&self) -> f64 {
        self.convection
    }

    pub fn wall_emissivity(&self) -> Option<f64> {
        self.wall_emissivity
    }

    pub fn walls(&self) -> WallSet {
        self.walls
    }

    pub fn is_adiabatic(&self) -> bool {
        self.walls == WallSet::NONE
    }
}

/// Stefan-Boltzmann loss `ε·σ·(T⁴ - T_amb⁴)` [W/m²].
pub fn radiative_flux(emissivity: f64, t: f64, t_amb: f64) -> f64 {
    emissivity * STEFAN_BOLTZMANN * (t.powi(4) - t_amb.powi(4))
}

/// Newton cooling `h·(T - T_amb)` [W/m²].
pub fn convective_flux(h: f64, t: f64, t_amb: f64) -> f64 {
    h * (t - t_amb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{k, unitless, w_per_m2k};

    #[test]
    fn fluxes_vanish_at_ambient() {
        assert_eq!(radiative_flux(0.8, 300.0, 300.0), 0.0);
        assert_eq!(convective_flux(10.0, 300.0, 300.0), 0.0);
    }

    #[test]
    fn radiative_flux_value() {
        let q = radiative_flux(1.0, 1000.0, 0.0);
        assert!((q - 56_703.744_19).abs() < 1e-6);
        // Colder than ambient: net gain.
        assert!(radiative_flux(0.5, 250.0, 300.0) < 0.0);
    }

    #[test]
    fn builder_validates() {
        assert!(BoundaryConfig::new(k(-1.0), w_per_m2k(10.0)).is_err());
        assert!(BoundaryConfig::new(k(300.0), w_per_m2k(-10.0)).is_err());
        assert!(matches!(
            BoundaryConfig::new(k(f64::NAN), w_per_m2k(10.0)),
            Err(SourceError::InvalidBoundary { what: "ambient temperature", .. })
        ));
        let cfg = BoundaryConfig::new(k(300.0), w_per_m2k(10.0)).unwrap();
        assert!(cfg.clone().with_wall_emissivity(unitless(1.2)).is_err());
        let cfg = cfg
            .with_wall_emissivity(unitless(0.4))
            .unwrap()
            .with_walls(WallSet {
                side: true,
                bottom: false,
                top: true,
            });
        assert_eq!(cfg.wall_emissivity(), Some(0.4));
        assert!(!cfg.walls().contains(Wall::Bottom));
        assert!(!cfg.is_adiabatic());
        assert!(BoundaryConfig::adiabatic().is_adiabatic());
    }
}

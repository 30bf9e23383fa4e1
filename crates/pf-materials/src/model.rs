//! Material model trait and phase bookkeeping.

use pf_core::units::constants::TEMPERATURE_CEILING_FACTOR;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Isothermal phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// Transition temperature [K]
    pub temperature: f64,
    /// Specific latent heat [J/kg]
    pub latent_heat: f64,
}

/// Volumetric enthalpy [J/m³] at the edges of the two latent-heat plateaus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnthalpyBounds {
    /// Solid at `T_melt` (solidus).
    pub melt_start: f64,
    /// Liquid at `T_melt` (liquidus).
    pub melt_end: f64,
    /// Liquid at `T_vap`.
    pub vap_start: f64,
    /// Vapor at `T_vap`.
    pub vap_end: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Solid,
    Melting,
    Liquid,
    Vaporizing,
    Vapor,
}

impl Phase {
    pub fn is_transition(self) -> bool {
        matches!(self, Phase::Melting | Phase::Vaporizing)
    }
}

/// Temperature-dependent material with an enthalpy formulation.
///
/// Temperatures are in K, enthalpies are volumetric in J/m³ with `H(0 K) = 0`.
/// Implementations must be thread-safe; the solver evaluates properties from
/// rayon workers.
pub trait MaterialModel: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Density [kg/m³]
    fn density(&self) -> f64;

    /// Thermal conductivity [W/(m·K)]
    fn conductivity(&self, t: f64) -> f64;

    /// Specific heat [J/(kg·K)]
    fn specific_heat(&self, t: f64) -> f64;

    /// Surface emissivity in `[0, 1]`
    fn emissivity(&self) -> f64;

    fn melting(&self) -> PhaseTransition;

    fn vaporization(&self) -> PhaseTransition;

    /// `H(T)`. Returns the lower plateau edge at a transition temperature.
    fn enthalpy(&self, t: f64) -> f64;

    /// `T(H)`. Exactly `T_melt`/`T_vap` anywhere on the closed plateaus.
    fn temperature(&self, h: f64) -> f64;

    fn enthalpy_bounds(&self) -> EnthalpyBounds;

    /// Melt fraction: 0 below the melting plateau, 1 above it, linear within.
    fn phase_fraction(&self, h: f64) -> f64 {
        let b = self.enthalpy_bounds();
        plateau_fraction(h, b.melt_start, b.melt_end)
    }

    /// Vaporized fraction, the analogue of [`MaterialModel::phase_fraction`]
    /// for the vaporization plateau.
    fn vapor_fraction(&self, h: f64) -> f64 {
        let b = self.enthalpy_bounds();
        plateau_fraction(h, b.vap_start, b.vap_end)
    }

    fn phase(&self, h: f64) -> Phase {
        let b = self.enthalpy_bounds();
        if h < b.melt_start {
            Phase::Solid
        } else if h <= b.melt_end && b.melt_end > b.melt_start {
            Phase::Melting
        } else if h < b.vap_start {
            Phase::Liquid
        } else if h <= b.vap_end && b.vap_end > b.vap_start {
            Phase::Vaporizing
        } else {
            Phase::Vapor
        }
    }

    /// `1/(ρ·cp(T))` [K·m³/J], the sensible-branch slope `dT/dH`.
    ///
    /// On a plateau the true slope is zero, so this is an upper bound of
    /// `dT/dH` everywhere.
    fn enthalpy_slope(&self, t: f64) -> f64 {
        1.0 / (self.density() * self.specific_heat(t))
    }

    /// Upper end of the range where properties are guaranteed valid.
    fn max_temperature(&self) -> f64 {
        self.vaporization().temperature
    }

    /// Temperature above which a computed field is considered unphysical.
    fn temperature_ceiling(&self) -> f64 {
        TEMPERATURE_CEILING_FACTOR * self.vaporization().temperature
    }
}

fn plateau_fraction(h: f64, start: f64, end: f64) -> f64 {
    if h <= start {
        0.0
    } else if h >= end {
        1.0
    } else {
        ((h - start) / (end - start)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plateau_fraction_is_clamped() {
        assert_eq!(plateau_fraction(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(plateau_fraction(2.5, 0.0, 10.0), 0.25);
        assert_eq!(plateau_fraction(50.0, 0.0, 10.0), 1.0);
        // Zero-width plateau steps from 0 to 1.
        assert_eq!(plateau_fraction(3.0, 3.0, 3.0), 0.0);
        assert_eq!(plateau_fraction(3.1, 3.0, 3.0), 1.0);
    }

    #[test]
    fn transition_phases() {
        assert!(Phase::Melting.is_transition());
        assert!(!Phase::Liquid.is_transition());
    }
}

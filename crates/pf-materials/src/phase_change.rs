//! Enthalpy-method material with isothermal melting and vaporization.

use crate::curve::PropertyCurve;
use crate::error::{MaterialError, MaterialResult};
use crate::model::{EnthalpyBounds, MaterialModel, PhaseTransition};
use pf_core::units::constants::TEMPERATURE_CEILING_FACTOR;
use pf_core::{ensure_in_range, ensure_non_negative, ensure_positive};
use serde::{Deserialize, Serialize};

/// Serializable description of a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub name: String,
    pub density_kg_m3: f64,
    pub conductivity: PropertyCurve,
    pub specific_heat: PropertyCurve,
    pub emissivity: f64,
    pub melting_temperature_k: f64,
    pub latent_heat_fusion_j_kg: f64,
    pub vaporization_temperature_k: f64,
    pub latent_heat_vaporization_j_kg: f64,
}

/// Validated material with precomputed plateau bounds.
#[derive(Debug, Clone)]
pub struct PhaseChangeMaterial {
    spec: MaterialSpec,
    bounds: EnthalpyBounds,
}

impl PhaseChangeMaterial {
    pub fn new(spec: MaterialSpec) -> MaterialResult<Self> {
        validate_spec(&spec)?;
        let rho = spec.density_kg_m3;
        let cp = &spec.specific_heat;
        let melt_start = rho * cp.integral_from_zero(spec.melting_temperature_k);
        let melt_end = melt_start + rho * spec.latent_heat_fusion_j_kg;
        let vap_start = rho * cp.integral_from_zero(spec.vaporization_temperature_k)
            + rho * spec.latent_heat_fusion_j_kg;
        let vap_end = vap_start + rho * spec.latent_heat_vaporization_j_kg;
        let bounds = EnthalpyBounds {
            melt_start,
            melt_end,
            vap_start,
            vap_end,
        };
        Ok(Self { spec, bounds })
    }

    pub fn spec(&self) -> &MaterialSpec {
        &self.spec
    }

    /// Sensible-branch inverse: temperature whose `ρ∫cp` equals `sensible`.
    fn sensible_temperature(&self, sensible: f64, lo: f64, hi: f64) -> f64 {
        let t = self
            .spec
            .specific_heat
            .inverse_integral(sensible / self.spec.density_kg_m3);
        t.clamp(lo, hi)
    }
}

fn validate_spec(spec: &MaterialSpec) -> MaterialResult<()> {
    let positive = [
        ("density", spec.density_kg_m3),
        ("melting temperature", spec.melting_temperature_k),
        ("vaporization temperature", spec.vaporization_temperature_k),
    ];
    for (what, value) in positive {
        ensure_positive(value, what).map_err(|_| MaterialError::InvalidProperty { what, value })?;
    }
    let non_negative = [
        ("latent heat of fusion", spec.latent_heat_fusion_j_kg),
        ("latent heat of vaporization", spec.latent_heat_vaporization_j_kg),
    ];
    for (what, value) in non_negative {
        ensure_non_negative(value, what)
            .map_err(|_| MaterialError::InvalidProperty { what, value })?;
    }
    ensure_in_range(spec.emissivity, 0.0, 1.0, "emissivity").map_err(|_| {
        MaterialError::InvalidProperty {
            what: "emissivity",
            value: spec.emissivity,
        }
    })?;
    if spec.melting_temperature_k >= spec.vaporization_temperature_k {
        return Err(MaterialError::TransitionOrder {
            melt: spec.melting_temperature_k,
            vap: spec.vaporization_temperature_k,
        });
    }
    // Properties must stay positive up to the instability ceiling.
    let t_max = TEMPERATURE_CEILING_FACTOR * spec.vaporization_temperature_k;
    spec.conductivity.validate_positive("conductivity", t_max)?;
    spec.specific_heat.validate_positive("specific heat", t_max)?;
    Ok(())
}

impl MaterialModel for PhaseChangeMaterial {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn density(&self) -> f64 {
        self.spec.density_kg_m3
    }

    fn conductivity(&self, t: f64) -> f64 {
        self.spec.conductivity.value(t)
    }

    fn specific_heat(&self, t: f64) -> f64 {
        self.spec.specific_heat.value(t)
    }

    fn emissivity(&self) -> f64 {
        self.spec.emissivity
    }

    fn melting(&self) -> PhaseTransition {
        PhaseTransition {
            temperature: self.spec.melting_temperature_k,
            latent_heat: self.spec.latent_heat_fusion_j_kg,
        }
    }

    fn vaporization(&self) -> PhaseTransition {
        PhaseTransition {
            temperature: self.spec.vaporization_temperature_k,
            latent_heat: self.spec.latent_heat_vaporization_j_kg,
        }
    }

    fn enthalpy(&self, t: f64) -> f64 {
        let rho = self.spec.density_kg_m3;
        let sensible = rho * self.spec.specific_heat.integral_from_zero(t);
        if t <= self.spec.melting_temperature_k {
            sensible
        } else if t <= self.spec.vaporization_temperature_k {
            sensible + rho * self.spec.latent_heat_fusion_j_kg
        } else {
            sensible
                + rho * (self.spec.latent_heat_fusion_j_kg + self.spec.latent_heat_vaporization_j_kg)
        }
    }

    fn temperature(&self, h: f64) -> f64 {
        let b = &self.bounds;
        let rho = self.spec.density_kg_m3;
        let t_melt = self.spec.melting_temperature_k;
        let t_vap = self.spec.vaporization_temperature_k;
        if h < 0.0 {
            // Below the reference state: linear extrapolation with cp(0).
            h / (rho * self.spec.specific_heat.value(0.0))
        } else if h < b.melt_start {
            self.sensible_temperature(h, 0.0, t_melt)
        } else if h <= b.melt_end {
            t_melt
        } else if h < b.vap_start {
            let sensible = h - rho * self.spec.latent_heat_fusion_j_kg;
            self.sensible_temperature(sensible, t_melt, t_vap)
        } else if h <= b.vap_end {
            t_vap
        } else {
            let sensible = h
                - rho * (self.spec.latent_heat_fusion_j_kg + self.spec.latent_heat_vaporization_j_kg);
            self.sensible_temperature(sensible, t_vap, f64::INFINITY)
        }
    }

    fn enthalpy_bounds(&self) -> EnthalpyBounds {
        self.bounds
    }
}

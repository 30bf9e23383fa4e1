//! Built-in furnace charge materials.
//!
//! Values are room-temperature handbook data with linear `cp(T)` fits and
//! tabulated `k(T)` where the conductivity varies strongly.

use crate::curve::PropertyCurve;
use crate::error::{MaterialError, MaterialResult};
use crate::phase_change::{MaterialSpec, PhaseChangeMaterial};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialId {
    Steel,
    Aluminum,
    Copper,
    Titanium,
    Tungsten,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialCatalogEntry {
    pub id: MaterialId,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
}

impl MaterialCatalogEntry {
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return true;
        }

        self.id.key().contains(&query)
            || self.display_name.to_ascii_lowercase().contains(&query)
            || self
                .aliases
                .iter()
                .any(|alias| alias.to_ascii_lowercase().contains(&query))
    }
}

const CATALOG: [MaterialCatalogEntry; 5] = [
    MaterialCatalogEntry {
        id: MaterialId::Steel,
        display_name: "Carbon steel",
        aliases: &["fe", "iron"],
    },
    MaterialCatalogEntry {
        id: MaterialId::Aluminum,
        display_name: "Aluminum",
        aliases: &["al", "aluminium"],
    },
    MaterialCatalogEntry {
        id: MaterialId::Copper,
        display_name: "Copper",
        aliases: &["cu"],
    },
    MaterialCatalogEntry {
        id: MaterialId::Titanium,
        display_name: "Titanium",
        aliases: &["ti"],
    },
    MaterialCatalogEntry {
        id: MaterialId::Tungsten,
        display_name: "Tungsten",
        aliases: &["w", "wolfram"],
    },
];

pub fn material_catalog() -> &'static [MaterialCatalogEntry] {
    &CATALOG
}

pub fn filter_material_catalog(query: &str) -> Vec<MaterialCatalogEntry> {
    material_catalog()
        .iter()
        .copied()
        .filter(|entry| entry.matches_query(query))
        .collect()
}

impl MaterialId {
    pub const ALL: [MaterialId; 5] = [
        MaterialId::Steel,
        MaterialId::Aluminum,
        MaterialId::Copper,
        MaterialId::Titanium,
        MaterialId::Tungsten,
    ];

    /// Stable lowercase identifier used in parameter files.
    pub fn key(&self) -> &'static str {
        match self {
            MaterialId::Steel => "steel",
            MaterialId::Aluminum => "aluminum",
            MaterialId::Copper => "copper",
            MaterialId::Titanium => "titanium",
            MaterialId::Tungsten => "tungsten",
        }
    }

    pub fn spec(&self) -> MaterialSpec {
        match self {
            MaterialId::Steel => MaterialSpec {
                name: self.key().into(),
                density_kg_m3: 7850.0,
                conductivity: PropertyCurve::table(vec![
                    (273.0, 54.0),
                    (673.0, 43.0),
                    (1073.0, 27.0),
                    (1473.0, 29.0),
                    (1808.0, 32.0),
                ]),
                specific_heat: PropertyCurve::linear(450.0, 0.28, 300.0),
                emissivity: 0.8,
                melting_temperature_k: 1808.0,
                latent_heat_fusion_j_kg: 2.47e5,
                vaporization_temperature_k: 3134.0,
                latent_heat_vaporization_j_kg: 6.09e6,
            },
            MaterialId::Aluminum => MaterialSpec {
                name: self.key().into(),
                density_kg_m3: 2700.0,
                conductivity: PropertyCurve::constant(237.0),
                specific_heat: PropertyCurve::linear(897.0, 0.45, 300.0),
                emissivity: 0.2,
                melting_temperature_k: 933.47,
                latent_heat_fusion_j_kg: 3.97e5,
                vaporization_temperature_k: 2792.0,
                latent_heat_vaporization_j_kg: 1.09e7,
            },
            MaterialId::Copper => MaterialSpec {
                name: self.key().into(),
                density_kg_m3: 8960.0,
                conductivity: PropertyCurve::table(vec![
                    (300.0, 401.0),
                    (600.0, 379.0),
                    (900.0, 357.0),
                    (1358.0, 340.0),
                ]),
                specific_heat: PropertyCurve::linear(385.0, 0.09, 300.0),
                emissivity: 0.6,
                melting_temperature_k: 1357.77,
                latent_heat_fusion_j_kg: 2.05e5,
                vaporization_temperature_k: 2835.0,
                latent_heat_vaporization_j_kg: 4.73e6,
            },
            MaterialId::Titanium => MaterialSpec {
                name: self.key().into(),
                density_kg_m3: 4506.0,
                conductivity: PropertyCurve::constant(21.9),
                specific_heat: PropertyCurve::linear(523.0, 0.18, 300.0),
                emissivity: 0.3,
                melting_temperature_k: 1941.0,
                latent_heat_fusion_j_kg: 2.95e5,
                vaporization_temperature_k: 3560.0,
                latent_heat_vaporization_j_kg: 8.88e6,
            },
            MaterialId::Tungsten => MaterialSpec {
                name: self.key().into(),
                density_kg_m3: 19250.0,
                conductivity: PropertyCurve::table(vec![
                    (300.0, 173.0),
                    (1000.0, 118.0),
                    (2000.0, 100.0),
                    (3000.0, 95.0),
                ]),
                specific_heat: PropertyCurve::linear(132.0, 0.02, 300.0),
                emissivity: 0.3,
                melting_temperature_k: 3695.0,
                latent_heat_fusion_j_kg: 1.92e5,
                vaporization_temperature_k: 5828.0,
                latent_heat_vaporization_j_kg: 4.48e6,
            },
        }
    }

    pub fn build(&self) -> MaterialResult<PhaseChangeMaterial> {
        PhaseChangeMaterial::new(self.spec())
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for MaterialId {
    type Err = MaterialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let query = s.trim().to_ascii_lowercase();
        material_catalog()
            .iter()
            .find(|entry| {
                entry.id.key() == query || entry.aliases.iter().any(|alias| *alias == query)
            })
            .map(|entry| entry.id)
            .ok_or_else(|| MaterialError::UnknownMaterial { name: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaterialModel;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique_and_complete() {
        let mut seen = HashSet::new();
        for entry in material_catalog() {
            assert!(seen.insert(entry.id), "duplicate id: {}", entry.id);
        }
        assert_eq!(seen.len(), MaterialId::ALL.len());
    }

    #[test]
    fn every_catalog_material_validates() {
        for id in MaterialId::ALL {
            let mat = id.build().unwrap();
            assert_eq!(mat.name(), id.key());
            assert!(mat.melting().temperature < mat.vaporization().temperature);
        }
    }

    #[test]
    fn parse_by_key_and_alias() {
        assert_eq!("Steel".parse::<MaterialId>().unwrap(), MaterialId::Steel);
        assert_eq!("aluminium".parse::<MaterialId>().unwrap(), MaterialId::Aluminum);
        assert_eq!(" W ".parse::<MaterialId>().unwrap(), MaterialId::Tungsten);
        assert!(matches!(
            "graphite".parse::<MaterialId>(),
            Err(MaterialError::UnknownMaterial { .. })
        ));
    }

    #[test]
    fn search_by_alias() {
        let results = filter_material_catalog("iron");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, MaterialId::Steel);
        assert_eq!(filter_material_catalog("").len(), 5);
    }

    #[test]
    fn steel_room_temperature_properties() {
        let steel = MaterialId::Steel.build().unwrap();
        assert_eq!(steel.specific_heat(300.0), 450.0);
        assert_eq!(steel.conductivity(273.0), 54.0);
        assert_eq!(steel.conductivity(3000.0), 32.0);
    }
}

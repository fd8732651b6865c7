//! Material resolution and caching.

use crate::nist::standard_material;
use detgeo_config::units::{density_scale, temperature_scale};
use detgeo_config::{MaterialRecord, MaterialType};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;
use thiserror::Error;

new_key_type! {
    /// Stable handle to a material in the resolver arena.
    pub struct MaterialKey;
}

/// Physical state of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialState {
    /// Solid state.
    Solid,
    /// Liquid state.
    Liquid,
    /// Gaseous state.
    Gas,
}

impl MaterialState {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "solid" => Some(MaterialState::Solid),
            "liquid" => Some(MaterialState::Liquid),
            "gas" => Some(MaterialState::Gas),
            _ => None,
        }
    }
}

/// A resolved material in canonical units (g/cm³, kelvin).
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name (the cache key).
    pub name: String,
    /// Density, g/cm³.
    pub density: f64,
    /// Physical state.
    pub state: MaterialState,
    /// Temperature, kelvin.
    pub temperature: f64,
    /// Element symbol → atom count.
    pub composition: Vec<(String, u32)>,
}

/// Errors from material resolution.
#[derive(Error, Debug)]
pub enum MaterialError {
    /// Name not found in the configured map nor the standard database.
    #[error("unknown material '{name}'")]
    Unknown {
        /// The unresolvable name.
        name: String,
    },

    /// The record is structurally incomplete or carries bad units.
    #[error("invalid material '{name}': {reason}")]
    Invalid {
        /// Name of the broken record.
        name: String,
        /// What is missing or wrong.
        reason: String,
    },
}

/// Resolves materials by name, caching each result.
///
/// Resolution order: cache, then the configured records map, then the
/// standard database. For `nist` records the map *key* is the database
/// lookup — the `name` field inside the record is not authoritative.
#[derive(Debug, Default)]
pub struct MaterialResolver {
    arena: SlotMap<MaterialKey, Material>,
    by_name: HashMap<String, MaterialKey>,
    records: HashMap<String, MaterialRecord>,
}

impl MaterialResolver {
    /// Create a resolver over the given configured records.
    pub fn new(records: HashMap<String, MaterialRecord>) -> Self {
        Self {
            arena: SlotMap::with_key(),
            by_name: HashMap::new(),
            records,
        }
    }

    /// Resolve a material name to a cached handle.
    pub fn resolve(&mut self, name: &str) -> Result<MaterialKey, MaterialError> {
        if let Some(&key) = self.by_name.get(name) {
            return Ok(key);
        }
        let material = match self.records.get(name) {
            Some(record) => Self::from_record(name, record)?,
            None => standard_material(name).ok_or_else(|| MaterialError::Unknown {
                name: name.to_string(),
            })?,
        };
        let key = self.arena.insert(material);
        self.by_name.insert(name.to_string(), key);
        Ok(key)
    }

    /// Access a resolved material.
    pub fn get(&self, key: MaterialKey) -> &Material {
        &self.arena[key]
    }

    /// Cached lookup without resolving.
    pub fn lookup(&self, name: &str) -> Option<MaterialKey> {
        self.by_name.get(name).copied()
    }

    /// Number of resolved materials.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    fn from_record(name: &str, record: &MaterialRecord) -> Result<Material, MaterialError> {
        let invalid = |reason: &str| MaterialError::Invalid {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        match record.material_type {
            MaterialType::Nist => {
                // The document key is the database lookup.
                standard_material(name).ok_or_else(|| MaterialError::Unknown {
                    name: name.to_string(),
                })
            }
            MaterialType::ElementBased | MaterialType::Compound => {
                let density = record.density.ok_or_else(|| invalid("missing density"))?;
                let density = match &record.density_unit {
                    Some(unit) => {
                        density
                            * density_scale(unit)
                                .ok_or_else(|| invalid("unrecognized density unit"))?
                    }
                    None => density,
                };

                let state = record
                    .state
                    .as_deref()
                    .ok_or_else(|| invalid("missing state"))
                    .and_then(|s| {
                        MaterialState::parse(s).ok_or_else(|| invalid("unrecognized state"))
                    })?;

                let temperature = record
                    .temperature
                    .ok_or_else(|| invalid("missing temperature"))?;
                let temperature = match &record.temperature_unit {
                    Some(unit) => {
                        temperature
                            * temperature_scale(unit)
                                .ok_or_else(|| invalid("unrecognized temperature unit"))?
                    }
                    None => temperature,
                };

                let composition: Vec<(String, u32)> = record
                    .composition
                    .as_ref()
                    .ok_or_else(|| invalid("missing composition"))?
                    .iter()
                    .map(|(symbol, &count)| (symbol.clone(), count))
                    .collect();
                if composition.is_empty() {
                    return Err(invalid("empty composition"));
                }

                Ok(Material {
                    name: name.to_string(),
                    density,
                    state,
                    temperature,
                    composition,
                })
            }
        }
    }
}

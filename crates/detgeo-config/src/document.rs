//! The declarative geometry document schema.
//!
//! A [`Document`] is the root of one configuration file: a single `world`
//! volume node, an ordered list of further volume nodes (some of which may be
//! assemblies), and an optional map of material records. Volume nodes may
//! pull in whole sub-geometries from external documents via `external_file`.
//!
//! The schema is purely declarative — no geometry is constructed here.
//! Assembly into solids, logical volumes and placements is done by the
//! engine crates.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single plane of a polycone/polyhedra z-profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZPlaneRecord {
    /// Plane position along z.
    pub z: f64,
    /// Outer radius at this plane.
    pub rmax: f64,
    /// Inner radius at this plane (defaults to 0).
    #[serde(default)]
    pub rmin: f64,
}

/// Shape-specific numeric parameters of a primitive solid.
///
/// Primitives each consume a different set of keys (`radius`, `height`,
/// `x`/`y`/`z`, plane arrays, …), so the record is kept as a loose map and
/// interpreted by the solid factory. Accessors return `None` for absent keys;
/// required-field policy lives with the factory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimensions(pub serde_json::Map<String, serde_json::Value>);

impl Dimensions {
    /// Look up a scalar dimension by key.
    pub fn num(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Look up a scalar dimension, falling back to a default when absent.
    pub fn num_or(&self, key: &str, default: f64) -> f64 {
        self.num(key).unwrap_or(default)
    }

    /// Look up an integer dimension by key.
    pub fn int(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(serde_json::Value::as_i64)
    }

    /// Look up a numeric array dimension (e.g. the `z`/`rmax` plane arrays).
    pub fn array(&self, key: &str) -> Option<Vec<f64>> {
        self.0
            .get(key)?
            .as_array()?
            .iter()
            .map(serde_json::Value::as_f64)
            .collect()
    }

    /// Look up the structured `planes` array of a polycone/polyhedra.
    pub fn planes(&self) -> Option<Vec<ZPlaneRecord>> {
        let value = self.0.get("planes")?;
        serde_json::from_value(value.clone()).ok()
    }

    /// True when the given key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

/// Euler rotation angles, applied actively in the order X, then Y, then Z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationRecord {
    /// Rotation about X.
    pub x: f64,
    /// Rotation about Y.
    pub y: f64,
    /// Rotation about Z.
    pub z: f64,
    /// Angle unit, `deg` or `rad` (defaults to radians).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// One placement of a volume inside a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// Translation x component.
    #[serde(default)]
    pub x: f64,
    /// Translation y component.
    #[serde(default)]
    pub y: f64,
    /// Translation z component.
    #[serde(default)]
    pub z: f64,
    /// Length unit of the translation, `mm`/`cm`/`m` (defaults to mm).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Optional rotation; absent means *no* rotation, not identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationRecord>,
    /// Name of the parent volume (defaults to `"World"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl PlacementRecord {
    /// The parent name this placement targets, defaulting to the world.
    pub fn parent_name(&self) -> &str {
        self.parent.as_deref().unwrap_or(crate::WORLD_LABEL)
    }
}

/// One volume node: a primitive, a CSG composite, or an assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeNode {
    /// Unique identifier within the document.
    pub name: String,
    /// Alias used as the placed-instance label; defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g4name: Option<String>,
    /// Node type tag: a primitive tag, a CSG tag, or `assembly`.
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Material name; defaults to standard air when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Shape parameters (primitives only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Ordered component list (modern CSG unions and assemblies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<VolumeNode>>,
    /// Boolean role of this node when it appears as a CSG component:
    /// `union`/`add` or `subtract` (defaults to union).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_operation: Option<String>,
    /// Legacy CSG first operand: a cached-solid name or an inline node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solid1: Option<serde_json::Value>,
    /// Legacy CSG second operand: a cached-solid name or an inline node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solid2: Option<serde_json::Value>,
    /// Legacy CSG relative translation of the second operand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_position: Option<PlacementRecord>,
    /// Legacy CSG relative rotation of the second operand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_rotation: Option<RotationRecord>,
    /// Where instances of this volume go.
    #[serde(default)]
    pub placements: Vec<PlacementRecord>,
    /// Marks the volume sensitive for hit recording.
    #[serde(rename = "isActive", default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Hits collection this volume reports into.
    #[serde(
        rename = "hitsCollectionName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hits_collection_name: Option<String>,
    /// Relative path of an external document to import in place of this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_file: Option<String>,
    /// Parent volume for an external import's root entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_volume: Option<String>,
    /// Prefix applied to imported volume names to avoid collisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    /// Marks the root entry of an external document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<bool>,
    /// Placement of an external import (single record shorthand).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PlacementRecord>,
}

/// Coarse classification of a [`VolumeNode`]'s type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A concrete primitive shape.
    Primitive,
    /// A boolean composite (`union`, `subtraction`, `intersection`).
    Csg,
    /// A reusable assembly grouping.
    Assembly,
    /// An external-document import entry.
    External,
    /// Anything else — surfaced as `UnknownSolidType` downstream.
    Unknown,
}

/// The primitive type tags the solid factory understands.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "box",
    "sphere",
    "tube",
    "cylinder",
    "cone",
    "trd",
    "trapezoid",
    "torus",
    "ellipsoid",
    "orb",
    "elliptical_tube",
    "polycone",
    "polyhedra",
];

impl VolumeNode {
    /// Classify this node's type tag.
    pub fn kind(&self) -> NodeKind {
        if self.external_file.is_some() {
            return NodeKind::External;
        }
        match self.node_type.as_str() {
            "assembly" => NodeKind::Assembly,
            "union" | "subtraction" | "intersection" => NodeKind::Csg,
            t if PRIMITIVE_TYPES.contains(&t) => NodeKind::Primitive,
            _ => NodeKind::Unknown,
        }
    }

    /// The label used for placed instances of this volume.
    pub fn physical_name(&self) -> &str {
        self.g4name.as_deref().unwrap_or(&self.name)
    }

    /// Boolean role when this node appears inside a CSG `components` list.
    /// `union` and `add` are synonyms; absent defaults to union.
    pub fn is_subtract_component(&self) -> bool {
        matches!(self.boolean_operation.as_deref(), Some("subtract"))
    }
}

/// Kind of a material record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    /// Looked up in the standard materials database by the record's key.
    Nist,
    /// Built from an element composition.
    ElementBased,
    /// Synonym for `element_based`.
    Compound,
}

/// One material definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// Record kind.
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    /// Database name; not authoritative for `nist` records (the map key is).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Density value (compound records).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    /// Density unit, `g/cm3`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_unit: Option<String>,
    /// Physical state: `solid`, `liquid` or `gas`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Temperature value (compound records).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Temperature unit, `kelvin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_unit: Option<String>,
    /// Element symbol → integer atom count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<BTreeMap<String, u32>>,
}

/// A root geometry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The world volume node.
    pub world: VolumeNode,
    /// Further volume nodes, in declaration order.
    #[serde(default)]
    pub volumes: Vec<VolumeNode>,
    /// Inline material definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<HashMap<String, MaterialRecord>>,
}

impl Document {
    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A standalone materials document (`{"materials": {...}}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialsDocument {
    /// Material definitions keyed by name.
    #[serde(default)]
    pub materials: HashMap<String, MaterialRecord>,
}

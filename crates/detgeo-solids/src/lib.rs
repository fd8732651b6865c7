#![warn(missing_docs)]

//! Solid construction for detgeo.
//!
//! Solids are a data-directed term: a tagged variant that is either a
//! parameterised primitive [`Shape`] or a boolean node combining two child
//! solids with a relative transform. The [`SolidFactory`] owns every solid in
//! a slotmap arena and caches them by name — a repeated request for the same
//! name returns the cached solid, never rebuilds.
//!
//! CSG nodes come in two schema flavours: the modern ordered `components`
//! list (unions before subtractions, left-folded) and the legacy two-operand
//! `solid1`/`solid2` pair. The two schemas are mutually exclusive on one node.

pub mod error;
pub mod extent;
pub mod shapes;

pub use error::{Result, SolidError};
pub use extent::{shape_extent, Aabb3};
pub use shapes::{Shape, ZPlane};

use detgeo_config::units::{placement_rotation, rotation_matrix, translation_mm};
use detgeo_config::{NodeKind, VolumeNode};
use nalgebra::{Rotation3, Vector3};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;

new_key_type! {
    /// Stable handle to a solid in the factory arena.
    pub struct SolidKey;
}

/// Relative transform applied to the second operand of a boolean node.
#[derive(Debug, Clone, PartialEq)]
pub struct CsgTransform {
    /// Translation in mm.
    pub translation: Vector3<f64>,
    /// Rotation; `None` means no rotation was declared.
    pub rotation: Option<Rotation3<f64>>,
}

impl CsgTransform {
    /// The identity transform (zero translation, no rotation).
    pub fn none() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: None,
        }
    }
}

/// Boolean operation of a CSG node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Left ∪ right.
    Union,
    /// Left ∖ right.
    Subtraction,
    /// Left ∩ right.
    Intersection,
}

/// A solid: a primitive leaf or the root of a CSG tree.
///
/// Child solids are owned by the factory arena; boolean nodes carry keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Solid {
    /// A parameterised primitive.
    Primitive {
        /// Solid name (unique in the arena's name index when cached).
        name: String,
        /// Shape parameters in internal units.
        shape: Shape,
    },
    /// A boolean combination of two solids.
    Boolean {
        /// Solid name; intermediates get synthesized names.
        name: String,
        /// The operation.
        op: BooleanOp,
        /// First operand — determines the coordinate frame.
        left: SolidKey,
        /// Second operand.
        right: SolidKey,
        /// Transform of the second operand relative to the first's frame.
        transform: CsgTransform,
    },
}

impl Solid {
    /// The solid's name.
    pub fn name(&self) -> &str {
        match self {
            Solid::Primitive { name, .. } | Solid::Boolean { name, .. } => name,
        }
    }
}

/// Builds and caches solids from configuration nodes.
#[derive(Debug, Default)]
pub struct SolidFactory {
    arena: SlotMap<SolidKey, Solid>,
    by_name: HashMap<String, SolidKey>,
}

impl SolidFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the solid for a volume node, or return the cached handle when
    /// its name has been built before.
    pub fn build(&mut self, node: &VolumeNode) -> Result<SolidKey> {
        self.build_named(&node.name, node)
    }

    /// Look up a cached solid by name.
    pub fn lookup(&self, name: &str) -> Option<SolidKey> {
        self.by_name.get(name).copied()
    }

    /// Access a solid by handle.
    pub fn get(&self, key: SolidKey) -> &Solid {
        &self.arena[key]
    }

    /// Number of solids in the arena (including CSG intermediates).
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when no solid has been built yet.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Conservative axis-aligned extent of a solid.
    pub fn extent(&self, key: SolidKey) -> Aabb3 {
        match &self.arena[key] {
            Solid::Primitive { shape, .. } => shape_extent(shape),
            Solid::Boolean {
                op,
                left,
                right,
                transform,
                ..
            } => {
                let left_ext = self.extent(*left);
                match op {
                    BooleanOp::Union => left_ext.union(
                        &self
                            .extent(*right)
                            .transformed(transform.rotation.as_ref(), &transform.translation),
                    ),
                    BooleanOp::Subtraction => left_ext,
                    BooleanOp::Intersection => left_ext.intersection(
                        &self
                            .extent(*right)
                            .transformed(transform.rotation.as_ref(), &transform.translation),
                    ),
                }
            }
        }
    }

    fn build_named(&mut self, name: &str, node: &VolumeNode) -> Result<SolidKey> {
        if let Some(&key) = self.by_name.get(name) {
            return Ok(key);
        }
        let key = match node.kind() {
            NodeKind::Primitive => {
                let dims = node.dimensions.clone().unwrap_or_default();
                let shape = Shape::from_dimensions(name, &node.node_type, &dims)?;
                self.arena.insert(Solid::Primitive {
                    name: name.to_string(),
                    shape,
                })
            }
            NodeKind::Csg => self.build_boolean(name, node)?,
            _ => {
                return Err(SolidError::UnknownSolidType {
                    solid: name.to_string(),
                    type_tag: node.node_type.clone(),
                })
            }
        };
        self.by_name.insert(name.to_string(), key);
        Ok(key)
    }

    fn build_boolean(&mut self, name: &str, node: &VolumeNode) -> Result<SolidKey> {
        let has_components = node.components.as_ref().is_some_and(|c| !c.is_empty());
        let has_legacy = node.solid1.is_some() || node.solid2.is_some();

        if has_components && has_legacy {
            return Err(SolidError::MissingField {
                solid: name.to_string(),
                field: "components and solid1/solid2 are mutually exclusive".to_string(),
            });
        }
        if let (true, Some(components)) = (has_components, node.components.as_ref()) {
            if node.node_type != "union" {
                return Err(SolidError::MissingField {
                    solid: name.to_string(),
                    field: "solid1".to_string(),
                });
            }
            return self.build_components(name, components);
        }
        self.build_legacy(name, node)
    }

    /// Left-fold a modern `components` list: union set first, subtract set
    /// second, each partition in declaration order. The first union
    /// component determines the coordinate frame; every later component is
    /// transformed by its first placement record.
    fn build_components(&mut self, name: &str, components: &[VolumeNode]) -> Result<SolidKey> {
        let (unions, subtracts): (Vec<&VolumeNode>, Vec<&VolumeNode>) = components
            .iter()
            .partition(|c| !c.is_subtract_component());

        let Some((base, rest)) = unions.split_first() else {
            return Err(SolidError::MissingField {
                solid: name.to_string(),
                field: "components".to_string(),
            });
        };

        let mut acc = self.build(base)?;
        for (i, component) in rest.iter().enumerate() {
            let right = self.build(component)?;
            acc = self.fold_step(
                format!("{name}_union_{}", i + 1),
                BooleanOp::Union,
                acc,
                right,
                component_transform(component),
            );
        }
        for (i, component) in subtracts.iter().enumerate() {
            let right = self.build(component)?;
            acc = self.fold_step(
                format!("{name}_subtract_{i}"),
                BooleanOp::Subtraction,
                acc,
                right,
                component_transform(component),
            );
        }
        Ok(acc)
    }

    /// Insert one fold step. Intermediate results live in the arena under
    /// their synthesized name but are not entered into the name index; the
    /// caller caches the final key under the node's external name.
    fn fold_step(
        &mut self,
        name: String,
        op: BooleanOp,
        left: SolidKey,
        right: SolidKey,
        transform: CsgTransform,
    ) -> SolidKey {
        self.arena.insert(Solid::Boolean {
            name,
            op,
            left,
            right,
            transform,
        })
    }

    /// Legacy two-operand path: `solid1`/`solid2` are either names of cached
    /// solids or inline nodes, combined under the node's own type tag.
    fn build_legacy(&mut self, name: &str, node: &VolumeNode) -> Result<SolidKey> {
        let op = match node.node_type.as_str() {
            "union" => BooleanOp::Union,
            "subtraction" => BooleanOp::Subtraction,
            "intersection" => BooleanOp::Intersection,
            other => {
                return Err(SolidError::UnknownSolidType {
                    solid: name.to_string(),
                    type_tag: other.to_string(),
                })
            }
        };

        let left = self.legacy_operand(name, node.solid1.as_ref(), "solid1")?;
        let right = self.legacy_operand(name, node.solid2.as_ref(), "solid2")?;

        let translation = node
            .relative_position
            .as_ref()
            .map(translation_mm)
            .unwrap_or_else(Vector3::zeros);
        let rotation = node
            .relative_position
            .as_ref()
            .and_then(placement_rotation)
            .or_else(|| node.relative_rotation.as_ref().map(rotation_matrix));

        Ok(self.fold_step(
            name.to_string(),
            op,
            left,
            right,
            CsgTransform {
                translation,
                rotation,
            },
        ))
    }

    fn legacy_operand(
        &mut self,
        name: &str,
        value: Option<&serde_json::Value>,
        which: &str,
    ) -> Result<SolidKey> {
        let value = value.ok_or_else(|| SolidError::MissingField {
            solid: name.to_string(),
            field: which.to_string(),
        })?;
        if let Some(reference) = value.as_str() {
            return self
                .lookup(reference)
                .ok_or_else(|| SolidError::UnknownReference {
                    solid: name.to_string(),
                    reference: reference.to_string(),
                });
        }
        let mut inline: VolumeNode =
            serde_json::from_value(value.clone()).map_err(|_| SolidError::MissingField {
                solid: name.to_string(),
                field: which.to_string(),
            })?;
        if inline.name.is_empty() {
            inline.name = format!("{name}_{which}");
        }
        self.build(&inline)
    }
}

/// Transform of a CSG component relative to the first component's frame,
/// taken from the first element of its `placements`.
fn component_transform(component: &VolumeNode) -> CsgTransform {
    match component.placements.first() {
        Some(placement) => CsgTransform {
            translation: translation_mm(placement),
            rotation: placement_rotation(placement),
        },
        None => CsgTransform::none(),
    }
}

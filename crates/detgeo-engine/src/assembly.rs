//! Reusable assembly groupings.
//!
//! An assembly is a named, ordered list of (logical volume, transform)
//! entries. It owns no placement of its own; the scheduler *imprints* it into
//! a parent, producing one placed volume per entry with the outer transform
//! composed onto each entry's transform.

use crate::volumes::LogicalKey;
use nalgebra::{Rotation3, Vector3};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;

new_key_type! {
    /// Stable handle to an assembly.
    pub struct AssemblyKey;
}

/// One member of an assembly: a logical volume at a transform relative to
/// the assembly origin.
#[derive(Debug, Clone)]
pub struct AssemblyEntry {
    /// Placed-instance label for imprinted copies of this member.
    pub name: String,
    /// The member logical volume.
    pub logical: LogicalKey,
    /// Translation relative to the assembly origin, mm.
    pub translation: Vector3<f64>,
    /// Rotation relative to the assembly origin; `None` when undeclared.
    pub rotation: Option<Rotation3<f64>>,
}

/// A named assembly: entries in declaration order plus the imprint counter
/// that numbers its copies.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Assembly name (the cache key).
    pub name: String,
    entries: Vec<AssemblyEntry>,
    imprints: u32,
}

impl Assembly {
    /// Create an assembly from its member entries.
    pub fn new(name: impl Into<String>, entries: Vec<AssemblyEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
            imprints: 0,
        }
    }

    /// Member entries in declaration order.
    pub fn entries(&self) -> &[AssemblyEntry] {
        &self.entries
    }

    /// Number of imprints made so far.
    pub fn imprint_count(&self) -> u32 {
        self.imprints
    }

    /// Start a new imprint: returns its ordinal (0-based), used as the copy
    /// number of every placed volume the imprint produces.
    pub fn begin_imprint(&mut self) -> u32 {
        let ordinal = self.imprints;
        self.imprints += 1;
        ordinal
    }
}

/// Arena-backed store of assemblies with a name index.
#[derive(Debug, Default)]
pub struct AssemblyStore {
    arena: SlotMap<AssemblyKey, Assembly>,
    by_name: HashMap<String, AssemblyKey>,
}

impl AssemblyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an assembly under its name; first definition wins.
    pub fn insert(&mut self, assembly: Assembly) -> AssemblyKey {
        if let Some(&key) = self.by_name.get(&assembly.name) {
            return key;
        }
        let name = assembly.name.clone();
        let key = self.arena.insert(assembly);
        self.by_name.insert(name, key);
        key
    }

    /// Resolve an assembly by name.
    pub fn lookup(&self, name: &str) -> Option<AssemblyKey> {
        self.by_name.get(name).copied()
    }

    /// Access an assembly.
    pub fn get(&self, key: AssemblyKey) -> &Assembly {
        &self.arena[key]
    }

    /// Mutable access, used by the scheduler to advance imprint counters.
    pub fn get_mut(&mut self, key: AssemblyKey) -> &mut Assembly {
        &mut self.arena[key]
    }

    /// Number of assemblies.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when no assembly is registered.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// Compose an outer (imprint) transform onto an entry transform.
///
/// The entry's translation is rotated into the outer frame before the outer
/// translation is added. `None` rotations compose as the identity without
/// materializing one; the result is `None` only when both are `None`.
pub fn compose_transforms(
    outer_translation: &Vector3<f64>,
    outer_rotation: Option<&Rotation3<f64>>,
    entry_translation: &Vector3<f64>,
    entry_rotation: Option<&Rotation3<f64>>,
) -> (Vector3<f64>, Option<Rotation3<f64>>) {
    let translation = match outer_rotation {
        Some(rot) => outer_translation + rot * entry_translation,
        None => outer_translation + entry_translation,
    };
    let rotation = match (outer_rotation, entry_rotation) {
        (Some(outer), Some(entry)) => Some(outer * entry),
        (Some(outer), None) => Some(*outer),
        (None, Some(entry)) => Some(*entry),
        (None, None) => None,
    };
    (translation, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;
    use std::f64::consts::FRAC_PI_2;

    fn dummy_logical() -> LogicalKey {
        let mut arena: SlotMap<LogicalKey, ()> = SlotMap::with_key();
        arena.insert(())
    }

    #[test]
    fn first_definition_wins() {
        let mut store = AssemblyStore::new();
        let k1 = store.insert(Assembly::new("pair", vec![]));
        let k2 = store.insert(Assembly::new(
            "pair",
            vec![AssemblyEntry {
                name: "m".into(),
                logical: dummy_logical(),
                translation: Vector3::zeros(),
                rotation: None,
            }],
        ));
        assert_eq!(k1, k2);
        assert!(store.get(k1).entries().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn imprint_ordinals_increment_from_zero() {
        let mut assembly = Assembly::new("row", vec![]);
        assert_eq!(assembly.begin_imprint(), 0);
        assert_eq!(assembly.begin_imprint(), 1);
        assert_eq!(assembly.imprint_count(), 2);
    }

    #[test]
    fn transform_composition() {
        // No rotations anywhere: plain translation sum, rotation stays None.
        let (t, r) = compose_transforms(
            &Vector3::new(10.0, 0.0, 0.0),
            None,
            &Vector3::new(0.0, 5.0, 0.0),
            None,
        );
        assert_eq!(t, Vector3::new(10.0, 5.0, 0.0));
        assert!(r.is_none());

        // Outer rotation carries the entry offset around: +90° about z maps
        // the entry's +x offset to +y.
        let quarter = Rotation3::from_euler_angles(0.0, 0.0, FRAC_PI_2);
        let (t, r) = compose_transforms(
            &Vector3::zeros(),
            Some(&quarter),
            &Vector3::new(5.0, 0.0, 0.0),
            None,
        );
        assert_relative_eq!(t.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(t.y, 5.0, epsilon = 1e-12);
        assert!(r.is_some());
    }
}

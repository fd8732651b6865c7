//! Logical and placed volume storage.
//!
//! Logical volumes pair a solid with a material; placed volumes are their
//! instantiations inside a parent. Both live in slotmap arenas owned by the
//! store; handles stay stable for the lifetime of a build generation.

use crate::materials::MaterialKey;
use detgeo_solids::SolidKey;
use nalgebra::{Rotation3, Vector3};
use slotmap::{new_key_type, SlotMap};
use std::collections::{HashMap, HashSet};

new_key_type! {
    /// Stable handle to a logical volume.
    pub struct LogicalKey;
    /// Stable handle to a placed volume.
    pub struct PlacedKey;
}

/// The pairing of a shape and a material, independent of placement.
/// Immutable after creation, except for the sensitive marker wired on by the
/// registrar after the placement passes.
#[derive(Debug, Clone)]
pub struct LogicalVolume {
    /// Unique name (the cache key).
    pub name: String,
    /// The solid this volume is bounded by.
    pub solid: SolidKey,
    /// The material filling it.
    pub material: MaterialKey,
    /// Hits-collection name when the volume is sensitive.
    pub sensitive: Option<String>,
}

/// One instantiation of a logical volume at a position/rotation inside a
/// parent.
#[derive(Debug, Clone)]
pub struct PlacedVolume {
    /// Placed-instance label (the node's `g4name`, defaulting to its name).
    pub name: String,
    /// The logical volume being placed.
    pub logical: LogicalKey,
    /// Parent logical volume; `None` only for the world.
    pub parent: Option<LogicalKey>,
    /// Translation inside the parent frame, mm.
    pub translation: Vector3<f64>,
    /// Rotation; `None` means none was declared.
    pub rotation: Option<Rotation3<f64>>,
    /// Copy number: the placement's index within its node's list, or the
    /// imprint counter for assembly members.
    pub copy_number: u32,
}

/// Arena-backed store of logical and placed volumes.
#[derive(Debug, Default)]
pub struct VolumeStore {
    logicals: SlotMap<LogicalKey, LogicalVolume>,
    placed: SlotMap<PlacedKey, PlacedVolume>,
    by_name: HashMap<String, LogicalKey>,
    placed_names: HashSet<String>,
    placement_order: Vec<String>,
}

impl VolumeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a logical volume under its name; when the name is already
    /// cached the existing handle wins and is returned.
    pub fn insert_logical(&mut self, volume: LogicalVolume) -> LogicalKey {
        if let Some(&key) = self.by_name.get(&volume.name) {
            return key;
        }
        let name = volume.name.clone();
        let key = self.logicals.insert(volume);
        self.by_name.insert(name, key);
        key
    }

    /// Register an extra name for an existing logical volume (used to make
    /// the world resolvable under both its configured name and `"World"`).
    pub fn alias(&mut self, name: &str, key: LogicalKey) {
        self.by_name.entry(name.to_string()).or_insert(key);
    }

    /// Resolve a logical volume by name.
    pub fn lookup(&self, name: &str) -> Option<LogicalKey> {
        self.by_name.get(name).copied()
    }

    /// Access a logical volume.
    pub fn logical(&self, key: LogicalKey) -> &LogicalVolume {
        &self.logicals[key]
    }

    /// Mark a logical volume sensitive for the given hits collection.
    pub fn mark_sensitive(&mut self, key: LogicalKey, collection: &str) {
        self.logicals[key].sensitive = Some(collection.to_string());
    }

    /// Record one placement. `node_name` is the *volume node* the placement
    /// belongs to; it enters the placed set used for parent ordering.
    pub fn place(&mut self, node_name: &str, volume: PlacedVolume) -> PlacedKey {
        let key = self.placed.insert(volume);
        if self.placed_names.insert(node_name.to_string()) {
            self.placement_order.push(node_name.to_string());
        }
        key
    }

    /// Mark an extra node name as placed without a placement record (the
    /// world is placed once but reachable as a parent under two names).
    pub fn mark_placed(&mut self, node_name: &str) {
        self.placed_names.insert(node_name.to_string());
    }

    /// Whether the named node has been placed at least once.
    pub fn is_placed(&self, node_name: &str) -> bool {
        self.placed_names.contains(node_name)
    }

    /// Node names in first-placement order (world first).
    pub fn placement_order(&self) -> &[String] {
        &self.placement_order
    }

    /// Access a placed volume.
    pub fn placed(&self, key: PlacedKey) -> &PlacedVolume {
        &self.placed[key]
    }

    /// Iterate all placed volumes.
    pub fn placed_iter(&self) -> impl Iterator<Item = (PlacedKey, &PlacedVolume)> {
        self.placed.iter()
    }

    /// Number of logical volumes.
    pub fn logical_count(&self) -> usize {
        self.logicals.len()
    }

    /// Number of placed volumes.
    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    /// Iterate all logical volumes.
    pub fn logicals_iter(&self) -> impl Iterator<Item = (LogicalKey, &LogicalVolume)> {
        self.logicals.iter()
    }
}

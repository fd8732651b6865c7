//! Sensitive-volume registration.
//!
//! Runs after placement: one marker is registered with the detector registry
//! under the framework-standard collection name, then every active volume
//! whose collection name matches the marker's gets it wired on. Active
//! volumes naming any other collection are left alone. The stepping kernel
//! later routes deposits through the registry.

use crate::volumes::VolumeStore;
use detgeo_config::{VolumeNode, DEFAULT_HITS_COLLECTION};
use detgeo_hits::{DetectorRegistry, SensitiveMarker};
use tracing::{info, warn};

/// Name the engine's marker is registered under.
pub const DETECTOR_NAME: &str = "detgeo_sd";

/// Wire the sensitive marker onto matching active volumes and return the
/// registry.
pub fn register_sensitive(nodes: &[VolumeNode], volumes: &mut VolumeStore) -> DetectorRegistry {
    let mut registry = DetectorRegistry::new();
    registry.register(SensitiveMarker::new(DETECTOR_NAME, DEFAULT_HITS_COLLECTION));

    for node in nodes {
        if node.is_active != Some(true) {
            continue;
        }
        let Some(key) = volumes.lookup(&node.name) else {
            continue;
        };
        let collection = node
            .hits_collection_name
            .as_deref()
            .unwrap_or(DEFAULT_HITS_COLLECTION);
        if collection != DEFAULT_HITS_COLLECTION {
            warn!(volume = %node.name, collection, "no marker for this hits collection");
            continue;
        }
        volumes.mark_sensitive(key, collection);
        info!(volume = %node.name, collection, "sensitive volume registered");
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialKey;
    use crate::volumes::LogicalVolume;
    use detgeo_solids::SolidKey;
    use slotmap::SlotMap;

    fn active_node(name: &str, collection: Option<&str>) -> VolumeNode {
        VolumeNode {
            name: name.into(),
            is_active: Some(true),
            hits_collection_name: collection.map(str::to_string),
            ..VolumeNode::default()
        }
    }

    fn store_with(names: &[&str]) -> VolumeStore {
        let mut solids: SlotMap<SolidKey, ()> = SlotMap::with_key();
        let mut mats: SlotMap<MaterialKey, ()> = SlotMap::with_key();
        let solid = solids.insert(());
        let material = mats.insert(());
        let mut store = VolumeStore::new();
        for name in names {
            store.insert_logical(LogicalVolume {
                name: (*name).into(),
                solid,
                material,
                sensitive: None,
            });
        }
        store
    }

    #[test]
    fn matching_active_volumes_get_the_marker() {
        let mut store = store_with(&["lxe", "veto"]);
        let nodes = vec![
            active_node("lxe", Some("MyHitsCollection")),
            active_node("veto", None),
        ];
        let registry = register_sensitive(&nodes, &mut store);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(DETECTOR_NAME).unwrap().collection_name(),
            DEFAULT_HITS_COLLECTION
        );
        let lxe = store.logical(store.lookup("lxe").unwrap());
        assert_eq!(lxe.sensitive.as_deref(), Some("MyHitsCollection"));
        // Absent collection name defaults to the framework-standard one.
        let veto = store.logical(store.lookup("veto").unwrap());
        assert_eq!(veto.sensitive.as_deref(), Some(DEFAULT_HITS_COLLECTION));
    }

    #[test]
    fn other_collection_names_are_not_attached() {
        let mut store = store_with(&["odd"]);
        let nodes = vec![active_node("odd", Some("SomeOtherCollection"))];
        let registry = register_sensitive(&nodes, &mut store);

        // The marker exists but only serves its own collection.
        assert_eq!(registry.len(), 1);
        let odd = store.logical(store.lookup("odd").unwrap());
        assert!(odd.sensitive.is_none());
    }

    #[test]
    fn marker_is_registered_even_without_active_volumes() {
        let mut store = store_with(&["quiet"]);
        let nodes = vec![
            VolumeNode {
                name: "quiet".into(),
                ..VolumeNode::default()
            },
            active_node("missing", None),
        ];
        let registry = register_sensitive(&nodes, &mut store);

        assert_eq!(registry.len(), 1);
        assert!(registry.get(DETECTOR_NAME).is_some());
        let quiet = store.logical(store.lookup("quiet").unwrap());
        assert!(quiet.sensitive.is_none());
    }
}

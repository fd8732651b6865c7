//! Sensitive-region markers and the detector registry.
//!
//! A [`SensitiveMarker`] is the engine-side stand-in for the framework's
//! sensitive detector: it owns a hits-collection identifier, creates an
//! empty collection per event, appends a [`Hit`] for each non-zero energy
//! deposit and hands the filled collection over at end-of-event. The marker
//! never walks steps itself — the stepping kernel feeds it [`StepRecord`]s.

use crate::hit::{Hit, HitsCollection};
use nalgebra::Point3;
use std::collections::HashMap;

/// The slice of a transport step a sensitive marker cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Track that took the step.
    pub track_id: i32,
    /// Physical name of the volume the step occurred in.
    pub volume_name: String,
    /// Global post-step position, mm.
    pub position: Point3<f64>,
    /// Energy deposited along the step, MeV.
    pub energy_deposit: f64,
    /// Global post-step time, ns.
    pub global_time: f64,
}

/// A sensitive-region marker attached to logical volumes.
#[derive(Debug, Clone)]
pub struct SensitiveMarker {
    name: String,
    collection_name: String,
    current: Option<HitsCollection>,
}

impl SensitiveMarker {
    /// Create a marker with a detector name and its hits-collection name.
    pub fn new(name: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection_name: collection_name.into(),
            current: None,
        }
    }

    /// The detector name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hits-collection identifier this marker owns.
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Begin an event: create the empty per-event collection.
    pub fn begin_event(&mut self) {
        self.current = Some(HitsCollection::new(self.collection_name.clone()));
    }

    /// Process one step. Zero deposits are ignored; returns whether a hit
    /// was recorded.
    pub fn process_step(&mut self, step: &StepRecord) -> bool {
        if step.energy_deposit == 0.0 {
            return false;
        }
        let Some(collection) = self.current.as_mut() else {
            return false;
        };
        collection.insert(Hit {
            track_id: step.track_id,
            volume_name: step.volume_name.clone(),
            position: step.position,
            energy: step.energy_deposit,
            time: step.global_time,
        });
        true
    }

    /// End the event: hand over the filled collection so downstream sinks
    /// can drain it. Steps arriving after this are dropped until the next
    /// `begin_event`.
    pub fn end_event(&mut self) -> HitsCollection {
        self.current
            .take()
            .unwrap_or_else(|| HitsCollection::new(self.collection_name.clone()))
    }
}

/// Name-keyed registry of sensitive markers, standing in for the framework's
/// sensitive-detector manager.
#[derive(Debug, Default)]
pub struct DetectorRegistry {
    markers: HashMap<String, SensitiveMarker>,
    order: Vec<String>,
}

impl DetectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a marker under its detector name. Re-registering the same
    /// name keeps the existing marker.
    pub fn register(&mut self, marker: SensitiveMarker) {
        let name = marker.name().to_string();
        if self.markers.contains_key(&name) {
            return;
        }
        self.order.push(name.clone());
        self.markers.insert(name, marker);
    }

    /// Look up a marker by detector name.
    pub fn get(&self, name: &str) -> Option<&SensitiveMarker> {
        self.markers.get(name)
    }

    /// Mutable marker lookup, used by the stepping kernel.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut SensitiveMarker> {
        self.markers.get_mut(name)
    }

    /// Detector names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Number of registered markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// True when nothing is registered yet.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(volume: &str, edep: f64) -> StepRecord {
        StepRecord {
            track_id: 1,
            volume_name: volume.into(),
            position: Point3::new(1.0, 2.0, 3.0),
            energy_deposit: edep,
            global_time: 4.5,
        }
    }

    #[test]
    fn marker_records_nonzero_deposits_only() {
        let mut marker = SensitiveMarker::new("detgeo_sd", "MyHitsCollection");
        marker.begin_event();
        assert!(!marker.process_step(&step("lxe", 0.0)));
        assert!(marker.process_step(&step("lxe", 0.01)));
        let collection = marker.end_event();
        assert_eq!(collection.entries(), 1);
        let hit = &collection.hits()[0];
        assert_eq!(hit.volume_name, "lxe");
        assert_eq!(hit.energy, 0.01);
        assert_eq!(hit.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn steps_outside_an_event_are_dropped() {
        let mut marker = SensitiveMarker::new("detgeo_sd", "MyHitsCollection");
        assert!(!marker.process_step(&step("lxe", 0.5)));
        assert_eq!(marker.end_event().entries(), 0);
    }

    #[test]
    fn each_event_gets_a_fresh_collection() {
        let mut marker = SensitiveMarker::new("detgeo_sd", "MyHitsCollection");
        marker.begin_event();
        marker.process_step(&step("lxe", 1.0));
        assert_eq!(marker.end_event().entries(), 1);

        marker.begin_event();
        assert_eq!(marker.end_event().entries(), 0);
    }

    #[test]
    fn registry_keeps_first_registration() {
        let mut registry = DetectorRegistry::new();
        registry.register(SensitiveMarker::new("sd", "A"));
        registry.register(SensitiveMarker::new("sd", "B"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("sd").unwrap().collection_name(), "A");
        assert_eq!(registry.names(), ["sd".to_string()]);
    }
}

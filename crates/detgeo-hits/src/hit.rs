//! Hit records and per-event collections.

use nalgebra::Point3;

/// One energy deposit recorded in a sensitive volume.
///
/// Positions are mm, energies MeV, times ns.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Track that produced the deposit.
    pub track_id: i32,
    /// Physical name of the volume that was hit.
    pub volume_name: String,
    /// Global position of the deposit.
    pub position: Point3<f64>,
    /// Deposited energy.
    pub energy: f64,
    /// Global time of the deposit.
    pub time: f64,
}

/// An ordered, per-event container of hits.
///
/// Created empty at begin-of-event, filled by the sensitive marker during
/// stepping, drained by the end-of-event consumer.
#[derive(Debug, Clone, Default)]
pub struct HitsCollection {
    name: String,
    hits: Vec<Hit>,
}

impl HitsCollection {
    /// Create an empty collection with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hits: Vec::new(),
        }
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a hit.
    pub fn insert(&mut self, hit: Hit) {
        self.hits.push(hit);
    }

    /// Number of hits recorded so far.
    pub fn entries(&self) -> usize {
        self.hits.len()
    }

    /// The recorded hits, in insertion order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_preserves_insertion_order() {
        let mut hc = HitsCollection::new("MyHitsCollection");
        for i in 0..3 {
            hc.insert(Hit {
                track_id: i,
                volume_name: "lxe".into(),
                position: Point3::new(i as f64, 0.0, 0.0),
                energy: 0.01,
                time: i as f64,
            });
        }
        assert_eq!(hc.entries(), 3);
        assert_eq!(hc.hits()[2].track_id, 2);
        assert_eq!(hc.name(), "MyHitsCollection");
    }
}

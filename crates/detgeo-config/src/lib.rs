#![warn(missing_docs)]

//! Declarative geometry configuration for detgeo.
//!
//! Defines the JSON document schema (volumes, placements, materials), the
//! unit tables that normalize every length to millimetres and every angle to
//! radians at parse time, and the loader that reads a root document plus any
//! externally referenced documents relative to the config root.

pub mod document;
pub mod error;
pub mod loader;
pub mod units;

pub use document::{
    Dimensions, Document, MaterialRecord, MaterialType, MaterialsDocument, NodeKind,
    PlacementRecord, RotationRecord, VolumeNode, ZPlaneRecord, PRIMITIVE_TYPES,
};
pub use error::{ConfigError, Result};
pub use loader::ConfigSet;

/// Reserved label the world volume is placed under; placements default their
/// parent to this name.
pub const WORLD_LABEL: &str = "World";

/// Material used when a volume node does not name one.
pub const DEFAULT_MATERIAL: &str = "G4_AIR";

/// Default hits collection name for sensitive volumes.
pub const DEFAULT_HITS_COLLECTION: &str = "MyHitsCollection";

//! Configuration loading and external-document resolution.

use crate::document::{Document, MaterialRecord, MaterialsDocument};
use crate::error::{ConfigError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A loaded configuration set: the root geometry document, the merged
/// materials map, and the config root directory used to resolve external
/// document references.
///
/// Documents are immutable once loaded.
#[derive(Debug, Clone)]
pub struct ConfigSet {
    document: Document,
    materials: HashMap<String, MaterialRecord>,
    root_dir: PathBuf,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl ConfigSet {
    /// Load the root geometry document from `geometry_path`.
    ///
    /// The document's parent directory becomes the config root against which
    /// `external_file` references are resolved.
    pub fn load(geometry_path: impl AsRef<Path>) -> Result<Self> {
        let path = geometry_path.as_ref();
        let document: Document = read_json(path)?;
        let root_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

        let mut materials = HashMap::new();
        if let Some(inline) = &document.materials {
            materials.extend(inline.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Ok(Self {
            document,
            materials,
            root_dir,
        })
    }

    /// Load the root geometry document plus a separate materials document.
    ///
    /// Material names defined inline in the geometry document win over the
    /// materials file (first definition wins, matching the cache rule).
    pub fn load_with_materials(
        geometry_path: impl AsRef<Path>,
        materials_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let mut set = Self::load(geometry_path)?;
        let mats: MaterialsDocument = read_json(materials_path.as_ref())?;
        for (name, record) in mats.materials {
            set.materials.entry(name).or_insert(record);
        }
        Ok(set)
    }

    /// Build a config set from an in-memory document (tests, embedding).
    pub fn from_document(document: Document) -> Self {
        let mut materials = HashMap::new();
        if let Some(inline) = &document.materials {
            materials.extend(inline.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self {
            document,
            materials,
            root_dir: PathBuf::from("."),
        }
    }

    /// The root geometry document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The merged materials map.
    pub fn materials(&self) -> &HashMap<String, MaterialRecord> {
        &self.materials
    }

    /// The directory external references are resolved against.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Load an auxiliary geometry document, resolving `relative` against the
    /// config root.
    pub fn load_external(&self, relative: &str) -> Result<Document> {
        read_json(&self.root_dir.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tmp(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn tmp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("detgeo-config-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const MINIMAL_GEOM: &str = r#"{
        "world": {"name": "world", "type": "box",
                  "dimensions": {"x": 1000, "y": 1000, "z": 1000},
                  "material": "G4_AIR", "placements": []},
        "volumes": [],
        "materials": {"Inline": {"type": "nist", "name": "G4_WATER"}}
    }"#;

    #[test]
    fn load_records_config_root() {
        let dir = tmp_dir("root");
        let path = write_tmp(&dir, "geom.json", MINIMAL_GEOM);
        let set = ConfigSet::load(&path).unwrap();
        assert_eq!(set.root_dir(), dir.as_path());
        assert_eq!(set.document().world.name, "world");
        assert!(set.materials().contains_key("Inline"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ConfigSet::load("/nonexistent/geom.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let dir = tmp_dir("parse");
        let path = write_tmp(&dir, "bad.json", "{ not json");
        let err = ConfigSet::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn materials_file_merges_without_overriding_inline() {
        let dir = tmp_dir("mats");
        let geom = write_tmp(&dir, "geom.json", MINIMAL_GEOM);
        let mats = write_tmp(
            &dir,
            "mats.json",
            r#"{"materials": {
                "Inline": {"type": "nist", "name": "G4_Pb"},
                "Extra": {"type": "nist", "name": "G4_Pb"}
            }}"#,
        );
        let set = ConfigSet::load_with_materials(&geom, &mats).unwrap();
        assert!(set.materials().contains_key("Extra"));
        // Inline geometry-document definition wins.
        assert_eq!(set.materials()["Inline"].name.as_deref(), Some("G4_WATER"));
    }

    #[test]
    fn external_documents_resolve_against_config_root() {
        let dir = tmp_dir("ext");
        let geom = write_tmp(&dir, "geom.json", MINIMAL_GEOM);
        write_tmp(
            &dir,
            "sub.json",
            r#"{"world": {"name": "subworld", "type": "box",
                          "dimensions": {"x": 10, "y": 10, "z": 10},
                          "placements": []},
                "volumes": []}"#,
        );
        let set = ConfigSet::load(&geom).unwrap();
        let sub = set.load_external("sub.json").unwrap();
        assert_eq!(sub.world.name, "subworld");
        assert!(matches!(
            set.load_external("missing.json").unwrap_err(),
            ConfigError::Io { .. }
        ));
    }
}

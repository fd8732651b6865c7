//! Five-pass placement scheduling.
//!
//! Declaration order in a document is not parent-before-child, and one
//! logical volume may be placed under several parents, so placement runs as
//! a fixpoint rather than a topological sort: the world is placed first,
//! then every pending placement whose parent is already placed is applied,
//! repeating until a pass makes no progress. Stalled leftovers get one
//! `CyclicPlacement` diagnostic per node and the build continues.

use crate::assembly::{compose_transforms, Assembly, AssemblyEntry, AssemblyStore};
use crate::error::{BuildError, Diagnostic, DiagnosticKind, Result};
use crate::materials::{MaterialError, MaterialResolver};
use crate::sensitive;
use crate::volumes::{LogicalKey, LogicalVolume, PlacedKey, PlacedVolume, VolumeStore};
use detgeo_config::units::{placement_rotation, translation_mm};
use detgeo_config::{
    ConfigSet, MaterialRecord, NodeKind, PlacementRecord, VolumeNode, DEFAULT_MATERIAL, WORLD_LABEL,
};
use detgeo_hits::DetectorRegistry;
use detgeo_solids::{SolidError, SolidFactory};
use nalgebra::Vector3;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Summary of one finished build generation.
#[derive(Debug)]
pub struct BuildReport {
    /// Handle of the placed world volume.
    pub world: PlacedKey,
    /// Number of placed volumes, world included.
    pub placed_count: usize,
    /// Number of distinct logical volumes.
    pub logical_count: usize,
    /// Every skipped-node diagnostic, in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    /// Diagnostics of one kind, for targeted assertions and summaries.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

/// The assembled geometry: every arena of one build generation plus the
/// report. Dropped wholesale on rebuild.
#[derive(Debug)]
pub struct Scene {
    /// Solid arena and name cache.
    pub solids: SolidFactory,
    /// Material arena and name cache.
    pub materials: MaterialResolver,
    /// Logical and placed volume arenas.
    pub volumes: VolumeStore,
    /// Registered assemblies.
    pub assemblies: AssemblyStore,
    /// Sensitive markers wired up by the registrar.
    pub registry: DetectorRegistry,
    /// Build summary and diagnostics.
    pub report: BuildReport,
}

/// Build a scene from a loaded configuration set.
pub fn assemble(config: &ConfigSet) -> Result<Scene> {
    let (nodes, materials) = expand_externals(config)?;
    Assembler {
        config,
        solids: SolidFactory::new(),
        materials: MaterialResolver::new(materials),
        volumes: VolumeStore::new(),
        assemblies: AssemblyStore::new(),
        diagnostics: Vec::new(),
        logical_of: HashMap::new(),
        entry_names: HashSet::new(),
    }
    .run(&nodes)
}

/// Flatten external-document imports into one working node list.
///
/// Each import entry loads its document, prefixes imported names (and
/// intra-import placement parents) with `<name_prefix>_`, replaces the root
/// entry's placements with a single placement under the importing entry's
/// `mother_volume` at its `position`, and merges imported materials without
/// overriding existing definitions. Unreadable or malformed imports are
/// fatal like any other configuration error.
fn expand_externals(config: &ConfigSet) -> Result<(Vec<VolumeNode>, HashMap<String, MaterialRecord>)> {
    let mut materials = config.materials().clone();
    let mut nodes = Vec::new();

    for node in &config.document().volumes {
        let Some(path) = node.external_file.as_deref() else {
            nodes.push(node.clone());
            continue;
        };
        let sub = config.load_external(path)?;
        debug!(import = %node.name, path, volumes = sub.volumes.len(), "imported external geometry");

        if let Some(inline) = &sub.materials {
            for (name, record) in inline {
                materials
                    .entry(name.clone())
                    .or_insert_with(|| record.clone());
            }
        }

        let prefix = node
            .name_prefix
            .as_deref()
            .map(|p| format!("{p}_"))
            .unwrap_or_default();
        let imported: HashSet<&str> = sub.volumes.iter().map(|v| v.name.as_str()).collect();
        let mother = node
            .mother_volume
            .clone()
            .unwrap_or_else(|| WORLD_LABEL.to_string());
        let root_name = sub
            .volumes
            .iter()
            .find(|v| v.root == Some(true))
            .or_else(|| sub.volumes.first())
            .map(|v| v.name.clone());

        for sub_node in &sub.volumes {
            let mut v = sub_node.clone();
            let original = v.name.clone();
            v.name = format!("{prefix}{original}");
            if let Some(g4) = v.g4name.take() {
                v.g4name = Some(format!("{prefix}{g4}"));
            }
            if Some(&original) == root_name.as_ref() {
                let mut record = node.position.clone().unwrap_or(PlacementRecord {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    unit: None,
                    rotation: None,
                    parent: None,
                });
                record.parent = Some(mother.clone());
                v.placements = vec![record];
                v.root = None;
            } else {
                for placement in &mut v.placements {
                    if let Some(parent) = &placement.parent {
                        if imported.contains(parent.as_str()) {
                            placement.parent = Some(format!("{prefix}{parent}"));
                        }
                    }
                }
            }
            nodes.push(v);
        }
    }
    Ok((nodes, materials))
}

struct Assembler<'a> {
    config: &'a ConfigSet,
    solids: SolidFactory,
    materials: MaterialResolver,
    volumes: VolumeStore,
    assemblies: AssemblyStore,
    diagnostics: Vec<Diagnostic>,
    logical_of: HashMap<String, LogicalKey>,
    entry_names: HashSet<String>,
}

impl Assembler<'_> {
    fn run(mut self, nodes: &[VolumeNode]) -> Result<Scene> {
        let world = self.place_world()?;

        // Pass 1: materialize logical volumes in declaration order.
        for node in nodes {
            match node.kind() {
                NodeKind::Primitive | NodeKind::Csg => {
                    self.build_logical(node)?;
                }
                NodeKind::Unknown => self.diag(
                    &node.name,
                    DiagnosticKind::UnknownSolidType,
                    format!("unrecognized type tag '{}'", node.node_type),
                ),
                NodeKind::Assembly | NodeKind::External => {}
            }
        }

        // Pass 2: register assemblies.
        for node in nodes {
            if node.kind() == NodeKind::Assembly {
                self.register_assembly(node)?;
            }
        }

        // Passes 3–5: placement fixpoint, assembly imprints included.
        self.place_all(nodes);
        self.report_never_placed(nodes);

        let registry = sensitive::register_sensitive(nodes, &mut self.volumes);

        let report = BuildReport {
            world,
            placed_count: self.volumes.placed_count(),
            logical_count: self.volumes.logical_count(),
            diagnostics: self.diagnostics,
        };
        info!(
            placed = report.placed_count,
            logical = report.logical_count,
            diagnostics = report.diagnostics.len(),
            "geometry build complete"
        );
        Ok(Scene {
            solids: self.solids,
            materials: self.materials,
            volumes: self.volumes,
            assemblies: self.assemblies,
            registry,
            report,
        })
    }

    fn diag(&mut self, node: &str, kind: DiagnosticKind, detail: impl Into<String>) {
        let detail = detail.into();
        warn!(node, kind = kind.label(), %detail, "geometry node skipped");
        self.diagnostics.push(Diagnostic {
            node: node.to_string(),
            kind,
            detail,
        });
    }

    /// The world is placed first, at the origin with no rotation, under the
    /// reserved physical name. Its logical is reachable under both the
    /// configured name and the reserved label. Any failure here is fatal.
    fn place_world(&mut self) -> Result<PlacedKey> {
        let world_node = &self.config.document().world;
        let name = world_node.name.clone();

        let solid = self
            .solids
            .build(world_node)
            .map_err(|e| BuildError::World {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let material_name = world_node.material.as_deref().unwrap_or(DEFAULT_MATERIAL);
        let material = self
            .materials
            .resolve(material_name)
            .map_err(|e| BuildError::World {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        let logical = self.volumes.insert_logical(LogicalVolume {
            name: name.clone(),
            solid,
            material,
            sensitive: None,
        });
        self.volumes.alias(WORLD_LABEL, logical);
        self.logical_of.insert(name.clone(), logical);

        let key = self.volumes.place(
            WORLD_LABEL,
            PlacedVolume {
                name: WORLD_LABEL.to_string(),
                logical,
                parent: None,
                translation: Vector3::zeros(),
                rotation: None,
                copy_number: 0,
            },
        );
        self.volumes.mark_placed(&name);
        debug!(world = %name, "world placed");
        Ok(key)
    }

    /// Build (or fetch) the logical volume for a node. Degenerate shapes
    /// abort the build; every other per-node failure records a diagnostic
    /// and returns `None` so the caller skips the node.
    fn build_logical(&mut self, node: &VolumeNode) -> Result<Option<LogicalKey>> {
        if let Some(&key) = self.logical_of.get(&node.name) {
            return Ok(Some(key));
        }

        let solid = match self.solids.build(node) {
            Ok(key) => key,
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err @ SolidError::UnknownSolidType { .. }) => {
                self.diag(&node.name, DiagnosticKind::UnknownSolidType, err.to_string());
                return Ok(None);
            }
            Err(err) => {
                self.diag(&node.name, DiagnosticKind::MissingField, err.to_string());
                return Ok(None);
            }
        };

        let material_name = node.material.as_deref().unwrap_or(DEFAULT_MATERIAL);
        let material = match self.materials.resolve(material_name) {
            Ok(key) => key,
            Err(err @ MaterialError::Unknown { .. }) => {
                self.diag(&node.name, DiagnosticKind::UnknownMaterial, err.to_string());
                return Ok(None);
            }
            Err(err) => {
                self.diag(&node.name, DiagnosticKind::InvalidMaterial, err.to_string());
                return Ok(None);
            }
        };

        let key = self.volumes.insert_logical(LogicalVolume {
            name: node.name.clone(),
            solid,
            material,
            sensitive: None,
        });
        self.logical_of.insert(node.name.clone(), key);
        Ok(Some(key))
    }

    /// Register one assembly: each component resolves to an existing logical
    /// by name or is built in place; its transform comes from the first
    /// placement record. Components that are themselves assemblies are
    /// refused.
    fn register_assembly(&mut self, node: &VolumeNode) -> Result<()> {
        let mut entries = Vec::new();
        for component in node.components.as_deref().unwrap_or_default() {
            if component.kind() == NodeKind::Assembly {
                self.diag(
                    &node.name,
                    DiagnosticKind::NestedAssembly,
                    format!("component '{}' is itself an assembly", component.name),
                );
                continue;
            }
            let logical = match self.logical_of.get(&component.name).copied() {
                Some(key) => Some(key),
                None => self.build_logical(component)?,
            };
            let Some(logical) = logical else { continue };
            self.entry_names.insert(component.name.clone());

            let (translation, rotation) = match component.placements.first() {
                Some(p) => (translation_mm(p), placement_rotation(p)),
                None => (Vector3::zeros(), None),
            };
            entries.push(AssemblyEntry {
                name: component.physical_name().to_string(),
                logical,
                translation,
                rotation,
            });
        }
        debug!(assembly = %node.name, members = entries.len(), "assembly registered");
        self.assemblies.insert(Assembly::new(node.name.clone(), entries));
        Ok(())
    }

    /// The placement fixpoint. Each pass walks the remaining placements in
    /// document order and applies every one whose parent is placed; passes
    /// repeat while progress is made.
    fn place_all(&mut self, nodes: &[VolumeNode]) {
        #[derive(Clone, Copy)]
        struct Item {
            node: usize,
            placement: usize,
        }

        let mut pending: Vec<Item> = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            let eligible = match node.kind() {
                NodeKind::Assembly => self.assemblies.lookup(&node.name).is_some(),
                _ => self.logical_of.contains_key(&node.name),
            };
            if !eligible {
                continue;
            }
            for p in 0..node.placements.len() {
                pending.push(Item { node: i, placement: p });
            }
        }

        let mut progress = true;
        while progress && !pending.is_empty() {
            progress = false;
            let mut still = Vec::with_capacity(pending.len());
            for item in pending {
                let node = &nodes[item.node];
                let placement = &node.placements[item.placement];
                let parent_name = placement.parent_name();

                let Some(parent) = self.volumes.lookup(parent_name) else {
                    self.diag(
                        &node.name,
                        DiagnosticKind::UnknownParent,
                        format!("parent '{parent_name}' is not a known volume"),
                    );
                    continue;
                };
                if !self.volumes.is_placed(parent_name) {
                    still.push(item);
                    continue;
                }

                if node.kind() == NodeKind::Assembly {
                    self.imprint(node, placement, parent);
                } else if let Some(&logical) = self.logical_of.get(&node.name) {
                    self.volumes.place(
                        &node.name,
                        PlacedVolume {
                            name: node.physical_name().to_string(),
                            logical,
                            parent: Some(parent),
                            translation: translation_mm(placement),
                            rotation: placement_rotation(placement),
                            copy_number: item.placement as u32,
                        },
                    );
                    debug!(volume = %node.name, parent = parent_name, "volume placed");
                }
                progress = true;
            }
            pending = still;
        }

        // Whatever survived the fixpoint has an unplaceable parent chain.
        let mut seen = HashSet::new();
        for item in &pending {
            let name = nodes[item.node].name.clone();
            if seen.insert(name.clone()) {
                self.diag(
                    &name,
                    DiagnosticKind::CyclicPlacement,
                    "placement parent chain never reaches the world",
                );
            }
        }
    }

    /// Imprint an assembly into a parent: one placed volume per entry, the
    /// outer transform composed onto each entry transform, all entries
    /// numbered by the imprint ordinal.
    fn imprint(&mut self, node: &VolumeNode, placement: &PlacementRecord, parent: LogicalKey) {
        let Some(key) = self.assemblies.lookup(&node.name) else {
            return;
        };
        let copy = self.assemblies.get_mut(key).begin_imprint();
        let outer_translation = translation_mm(placement);
        let outer_rotation = placement_rotation(placement);
        let entries: Vec<AssemblyEntry> = self.assemblies.get(key).entries().to_vec();

        for entry in entries {
            let (translation, rotation) = compose_transforms(
                &outer_translation,
                outer_rotation.as_ref(),
                &entry.translation,
                entry.rotation.as_ref(),
            );
            let logical_name = self.volumes.logical(entry.logical).name.clone();
            self.volumes.place(
                &logical_name,
                PlacedVolume {
                    name: format!("{}_{copy}", entry.name),
                    logical: entry.logical,
                    parent: Some(parent),
                    translation,
                    rotation,
                    copy_number: copy,
                },
            );
        }
        self.volumes.mark_placed(&node.name);
        debug!(assembly = %node.name, copy, "assembly imprinted");
    }

    /// A volume that was built and cached but has no placement anywhere is
    /// reported once; it is never implicitly placed.
    fn report_never_placed(&mut self, nodes: &[VolumeNode]) {
        for node in nodes {
            if !matches!(node.kind(), NodeKind::Primitive | NodeKind::Csg) {
                continue;
            }
            if !self.logical_of.contains_key(&node.name) || !node.placements.is_empty() {
                continue;
            }
            if self.volumes.is_placed(&node.name) || self.entry_names.contains(&node.name) {
                continue;
            }
            self.diag(
                &node.name,
                DiagnosticKind::NeverPlaced,
                "volume built and cached but placed nowhere",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detgeo_config::Document;

    fn build(json: &str) -> Scene {
        let doc = Document::from_json(json).unwrap();
        assemble(&ConfigSet::from_document(doc)).unwrap()
    }

    const AIR_WORLD: &str = r#""world": {
        "name": "world", "type": "box", "material": "G4_AIR",
        "dimensions": {"x": 10000, "y": 10000, "z": 10000},
        "placements": []}"#;

    #[test]
    fn air_world_with_lead_cube() {
        let scene = build(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "cube", "type": "box", "material": "G4_Pb",
                  "dimensions": {{"x": 100, "y": 100, "z": 100}},
                  "placements": [{{"x": 0, "y": 0, "z": 0}}]}}
            ]}}"#
        ));

        assert_eq!(scene.report.placed_count, 2);
        assert!(scene.report.diagnostics.is_empty());
        assert_eq!(scene.volumes.placement_order(), ["World", "cube"]);

        let world = scene.volumes.placed(scene.report.world);
        assert_eq!(world.name, "World");
        assert!(world.parent.is_none());
        assert!(world.rotation.is_none());

        let (_, cube) = scene
            .volumes
            .placed_iter()
            .find(|(_, p)| p.name == "cube")
            .unwrap();
        assert_eq!(cube.parent, Some(world.logical));
        assert_eq!(cube.copy_number, 0);
    }

    #[test]
    fn nested_parents_resolve_by_fixpoint() {
        // Document order is parent-last for `core`: shell goes under World
        // in the first pass, core under shell in the next.
        let scene = build(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "core", "type": "orb", "dimensions": {{"radius": 100}},
                  "placements": [{{"x": 0, "y": 0, "z": 0, "parent": "shell"}}]}},
                {{"name": "shell", "type": "tube",
                  "dimensions": {{"radius": 500, "height": 1000}},
                  "placements": [{{"x": 0, "y": 0, "z": 0}}]}}
            ]}}"#
        ));

        assert!(scene.report.diagnostics.is_empty());
        assert!(scene.volumes.is_placed("shell"));
        assert!(scene.volumes.is_placed("core"));
        assert_eq!(scene.volumes.placement_order(), ["World", "shell", "core"]);
    }

    #[test]
    fn cyclic_placement_is_diagnosed_not_fatal() {
        let scene = build(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "A", "type": "box", "dimensions": {{"x": 1, "y": 1, "z": 1}},
                  "placements": [{{"x": 0, "y": 0, "z": 0, "parent": "B"}}]}},
                {{"name": "B", "type": "box", "dimensions": {{"x": 1, "y": 1, "z": 1}},
                  "placements": [{{"x": 0, "y": 0, "z": 0, "parent": "A"}}]}}
            ]}}"#
        ));

        let cyclic: Vec<_> = scene
            .report
            .of_kind(DiagnosticKind::CyclicPlacement)
            .collect();
        assert_eq!(cyclic.len(), 2);
        assert!(!scene.volumes.is_placed("A"));
        assert!(!scene.volumes.is_placed("B"));
        // The world is still there; the build completed.
        assert_eq!(scene.report.placed_count, 1);
    }

    #[test]
    fn unknown_parent_is_diagnosed_immediately() {
        let scene = build(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "lost", "type": "box", "dimensions": {{"x": 1, "y": 1, "z": 1}},
                  "placements": [{{"x": 0, "y": 0, "z": 0, "parent": "ghost"}}]}},
                {{"name": "kept", "type": "box", "dimensions": {{"x": 1, "y": 1, "z": 1}},
                  "placements": [{{"x": 0, "y": 0, "z": 0}}]}}
            ]}}"#
        ));

        let diags: Vec<_> = scene.report.of_kind(DiagnosticKind::UnknownParent).collect();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].node, "lost");
        // The rest of the build is unaffected.
        assert!(scene.volumes.is_placed("kept"));
    }

    #[test]
    fn volume_without_placements_is_built_but_flagged() {
        let scene = build(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "orphan", "type": "orb", "dimensions": {{"radius": 5}},
                  "placements": []}}
            ]}}"#
        ));

        // Built and cached...
        assert!(scene.solids.lookup("orphan").is_some());
        assert!(scene.volumes.lookup("orphan").is_some());
        // ...but never placed, with exactly one diagnostic.
        assert!(!scene.volumes.is_placed("orphan"));
        assert_eq!(scene.report.of_kind(DiagnosticKind::NeverPlaced).count(), 1);
    }

    #[test]
    fn skipped_node_does_not_abort_the_rest() {
        let scene = build(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "weird", "type": "dodecahedron",
                  "placements": [{{"x": 0, "y": 0, "z": 0}}]}},
                {{"name": "exotic", "type": "box", "material": "Unobtainium",
                  "dimensions": {{"x": 1, "y": 1, "z": 1}},
                  "placements": [{{"x": 0, "y": 0, "z": 0}}]}},
                {{"name": "fine", "type": "box", "material": "G4_Fe",
                  "dimensions": {{"x": 1, "y": 1, "z": 1}},
                  "placements": [{{"x": 0, "y": 0, "z": 0}}]}}
            ]}}"#
        ));

        assert_eq!(
            scene
                .report
                .of_kind(DiagnosticKind::UnknownSolidType)
                .count(),
            1
        );
        assert_eq!(
            scene.report.of_kind(DiagnosticKind::UnknownMaterial).count(),
            1
        );
        assert!(scene.volumes.is_placed("fine"));
        assert_eq!(scene.report.placed_count, 2);
    }

    #[test]
    fn degenerate_shape_is_fatal() {
        let doc = Document::from_json(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "flat", "type": "polycone",
                  "dimensions": {{"planes": [
                    {{"z": 0, "rmax": 10}}, {{"z": 0, "rmax": 10}}
                  ]}},
                  "placements": [{{"x": 0, "y": 0, "z": 0}}]}}
            ]}}"#
        ))
        .unwrap();
        let err = assemble(&ConfigSet::from_document(doc)).unwrap_err();
        assert!(matches!(err, BuildError::Degenerate(_)));
    }

    #[test]
    fn broken_world_is_fatal() {
        let doc = Document::from_json(
            r#"{"world": {"name": "w", "type": "box", "placements": []},
                "volumes": []}"#,
        )
        .unwrap();
        let err = assemble(&ConfigSet::from_document(doc)).unwrap_err();
        assert!(matches!(err, BuildError::World { .. }));
    }

    #[test]
    fn assembly_imprints_with_per_assembly_copy_numbers() {
        let scene = build(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "pair", "type": "assembly", "components": [
                    {{"name": "left", "type": "box", "material": "G4_Si",
                      "dimensions": {{"x": 10, "y": 10, "z": 1}},
                      "placements": [{{"x": -20, "y": 0, "z": 0}}]}},
                    {{"name": "right", "type": "box", "material": "G4_Si",
                      "dimensions": {{"x": 10, "y": 10, "z": 1}},
                      "placements": [{{"x": 20, "y": 0, "z": 0}}]}}
                ],
                "placements": [
                    {{"x": 0, "y": 0, "z": 100}},
                    {{"x": 0, "y": 0, "z": -100}}
                ]}}
            ]}}"#
        ));

        assert!(scene.report.diagnostics.is_empty());
        // World + two imprints of two members each.
        assert_eq!(scene.report.placed_count, 5);

        let asm = scene
            .assemblies
            .get(scene.assemblies.lookup("pair").unwrap());
        assert_eq!(asm.imprint_count(), 2);

        let mut lefts: Vec<_> = scene
            .volumes
            .placed_iter()
            .filter(|(_, p)| p.name.starts_with("left"))
            .map(|(_, p)| p.clone())
            .collect();
        lefts.sort_by_key(|p| p.copy_number);
        assert_eq!(lefts.len(), 2);
        assert_eq!(lefts[0].copy_number, 0);
        assert_eq!(lefts[0].translation, Vector3::new(-20.0, 0.0, 100.0));
        assert_eq!(lefts[1].copy_number, 1);
        assert_eq!(lefts[1].translation, Vector3::new(-20.0, 0.0, -100.0));
    }

    #[test]
    fn empty_volume_list_builds_only_the_world() {
        let scene = build(&format!(r#"{{ {AIR_WORLD}, "volumes": []}}"#));

        assert!(scene.report.diagnostics.is_empty());
        assert_eq!(scene.report.placed_count, 1);
        assert_eq!(scene.report.logical_count, 1);
        assert_eq!(scene.volumes.placement_order(), ["World"]);
    }

    #[test]
    fn empty_assembly_imprints_nothing() {
        let scene = build(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "hollow", "type": "assembly", "components": [],
                  "placements": [{{"x": 0, "y": 0, "z": 0}}]}}
            ]}}"#
        ));

        assert!(scene.report.diagnostics.is_empty());
        assert_eq!(scene.report.placed_count, 1);
        let asm = scene
            .assemblies
            .get(scene.assemblies.lookup("hollow").unwrap());
        assert!(asm.entries().is_empty());
        assert_eq!(asm.imprint_count(), 1);
    }

    #[test]
    fn nested_assembly_component_is_refused() {
        let scene = build(&format!(
            r#"{{ {AIR_WORLD}, "volumes": [
                {{"name": "outer", "type": "assembly", "components": [
                    {{"name": "inner", "type": "assembly", "components": []}},
                    {{"name": "leaf", "type": "orb",
                      "dimensions": {{"radius": 5}}}}
                ],
                "placements": [{{"x": 0, "y": 0, "z": 0}}]}}
            ]}}"#
        ));

        assert_eq!(
            scene.report.of_kind(DiagnosticKind::NestedAssembly).count(),
            1
        );
        // The surviving member still gets imprinted.
        let asm = scene
            .assemblies
            .get(scene.assemblies.lookup("outer").unwrap());
        assert_eq!(asm.entries().len(), 1);
        assert_eq!(scene.report.placed_count, 2);
    }

    #[test]
    fn external_import_prefixes_names_and_parents() {
        let dir = std::env::temp_dir().join(format!("detgeo-engine-ext-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("main.json"),
            format!(
                r#"{{ {AIR_WORLD}, "volumes": [
                    {{"name": "station", "external_file": "station.json",
                      "name_prefix": "st1", "mother_volume": "World",
                      "position": {{"x": 0, "y": 0, "z": 500}}}}
                ]}}"#
            ),
        )
        .unwrap();
        std::fs::write(
            dir.join("station.json"),
            r#"{"world": {"name": "subworld", "type": "box",
                          "dimensions": {"x": 1, "y": 1, "z": 1}, "placements": []},
                "volumes": [
                    {"name": "frame", "type": "box", "root": true,
                     "dimensions": {"x": 200, "y": 200, "z": 20},
                     "placements": []},
                    {"name": "sensor", "type": "box", "material": "G4_Si",
                     "dimensions": {"x": 50, "y": 50, "z": 1},
                     "placements": [{"x": 0, "y": 0, "z": 5, "parent": "frame"}]}
                ]}"#,
        )
        .unwrap();

        let set = ConfigSet::load(dir.join("main.json")).unwrap();
        let scene = assemble(&set).unwrap();

        assert!(scene.report.diagnostics.is_empty());
        assert!(scene.volumes.lookup("st1_frame").is_some());
        assert!(scene.volumes.lookup("st1_sensor").is_some());
        assert!(scene.volumes.is_placed("st1_frame"));
        assert!(scene.volumes.is_placed("st1_sensor"));

        let (_, frame) = scene
            .volumes
            .placed_iter()
            .find(|(_, p)| p.name == "st1_frame")
            .unwrap();
        assert_eq!(frame.translation, Vector3::new(0.0, 0.0, 500.0));
        let world_logical = scene.volumes.placed(scene.report.world).logical;
        assert_eq!(frame.parent, Some(world_logical));

        let (_, sensor) = scene
            .volumes
            .placed_iter()
            .find(|(_, p)| p.name == "st1_sensor")
            .unwrap();
        assert_eq!(sensor.parent, scene.volumes.lookup("st1_frame"));
    }
}

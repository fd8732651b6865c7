#![warn(missing_docs)]

//! Geometry assembly engine for detgeo.
//!
//! Takes a loaded configuration set and assembles the full scene: materials
//! resolved and cached by name, solids built by the factory, logical volumes
//! paired with materials, placements scheduled parent-before-child by
//! fixpoint, assemblies imprinted, sensitive markers wired on. The [`Engine`]
//! wraps one scene per build generation behind a small lifecycle state
//! machine and supports dropping everything for a rebuild.

pub mod assembly;
pub mod error;
pub mod materials;
pub mod nist;
pub mod schedule;
pub mod sensitive;
pub mod volumes;

pub use assembly::{Assembly, AssemblyEntry, AssemblyKey, AssemblyStore};
pub use error::{BuildError, Diagnostic, DiagnosticKind, Result};
pub use materials::{Material, MaterialError, MaterialKey, MaterialResolver, MaterialState};
pub use schedule::{assemble, BuildReport, Scene};
pub use volumes::{LogicalKey, LogicalVolume, PlacedKey, PlacedVolume, VolumeStore};

use detgeo_config::ConfigSet;
use std::path::Path;
use tracing::info;

/// Lifecycle phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// No configuration loaded yet.
    Uninitialized,
    /// Configuration loaded; no scene built (or the last build failed).
    Loaded,
    /// A scene is built and queryable.
    Built,
    /// A run is in progress over the built scene.
    Live,
    /// Everything has been released.
    TornDown,
}

impl EnginePhase {
    /// Stable lowercase phase name used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            EnginePhase::Uninitialized => "uninitialized",
            EnginePhase::Loaded => "loaded",
            EnginePhase::Built => "built",
            EnginePhase::Live => "live",
            EnginePhase::TornDown => "torn down",
        }
    }
}

/// The geometry engine: one configuration, at most one built scene.
///
/// `build` is idempotent within a generation — calling it again returns the
/// cached world handle. `rebuild` drops every arena at once and rebuilds
/// from the retained configuration; a fatally failed rebuild leaves the
/// engine loaded with empty caches.
#[derive(Debug)]
pub struct Engine {
    phase: EnginePhase,
    config: Option<ConfigSet>,
    scene: Option<Scene>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an uninitialized engine.
    pub fn new() -> Self {
        Self {
            phase: EnginePhase::Uninitialized,
            config: None,
            scene: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Load the root geometry document.
    pub fn load(&mut self, geometry: impl AsRef<Path>) -> Result<()> {
        let config = ConfigSet::load(geometry)?;
        self.load_config(config)
    }

    /// Load the root geometry document plus a separate materials document.
    pub fn load_with_materials(
        &mut self,
        geometry: impl AsRef<Path>,
        materials: impl AsRef<Path>,
    ) -> Result<()> {
        let config = ConfigSet::load_with_materials(geometry, materials)?;
        self.load_config(config)
    }

    /// Adopt an already-loaded configuration set.
    pub fn load_config(&mut self, config: ConfigSet) -> Result<()> {
        match self.phase() {
            EnginePhase::Uninitialized | EnginePhase::TornDown => {}
            other => {
                return Err(BuildError::Phase {
                    phase: other.name(),
                    expected: "uninitialized",
                })
            }
        }
        self.config = Some(config);
        self.scene = None;
        self.phase = EnginePhase::Loaded;
        Ok(())
    }

    /// Build the scene, returning the placed-world handle.
    ///
    /// Within one generation the second call is a cache hit. A fatal build
    /// error leaves the engine loaded with no scene.
    pub fn build(&mut self) -> Result<PlacedKey> {
        match self.phase() {
            EnginePhase::Built | EnginePhase::Live => {
                let Some(scene) = self.scene.as_ref() else {
                    return Err(BuildError::Phase {
                        phase: self.phase().name(),
                        expected: "loaded",
                    });
                };
                return Ok(scene.report.world);
            }
            EnginePhase::Loaded => {}
            other => {
                return Err(BuildError::Phase {
                    phase: other.name(),
                    expected: "loaded",
                })
            }
        }
        let Some(config) = self.config.as_ref() else {
            return Err(BuildError::Phase {
                phase: self.phase().name(),
                expected: "loaded",
            });
        };
        match schedule::assemble(config) {
            Ok(scene) => {
                let world = scene.report.world;
                self.scene = Some(scene);
                self.phase = EnginePhase::Built;
                Ok(world)
            }
            Err(err) => {
                self.scene = None;
                Err(err)
            }
        }
    }

    /// Drop every arena of the current generation and build afresh from the
    /// retained configuration.
    pub fn rebuild(&mut self) -> Result<PlacedKey> {
        match self.phase() {
            EnginePhase::Loaded | EnginePhase::Built | EnginePhase::Live => {}
            other => {
                return Err(BuildError::Phase {
                    phase: other.name(),
                    expected: "built",
                })
            }
        }
        info!("rebuilding geometry: dropping current generation");
        self.scene = None;
        self.phase = EnginePhase::Loaded;
        self.build()
    }

    /// Enter the live phase; requires a built scene.
    pub fn begin_run(&mut self) -> Result<()> {
        match self.phase() {
            EnginePhase::Built => {
                self.phase = EnginePhase::Live;
                Ok(())
            }
            other => Err(BuildError::Phase {
                phase: other.name(),
                expected: "built",
            }),
        }
    }

    /// Leave the live phase, keeping the scene.
    pub fn end_run(&mut self) -> Result<()> {
        match self.phase() {
            EnginePhase::Live => {
                self.phase = EnginePhase::Built;
                Ok(())
            }
            other => Err(BuildError::Phase {
                phase: other.name(),
                expected: "live",
            }),
        }
    }

    /// Release everything.
    pub fn teardown(&mut self) {
        self.scene = None;
        self.config = None;
        self.phase = EnginePhase::TornDown;
    }

    /// The built scene, if any.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Mutable scene access, used by the stepping boundary to drive markers.
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// The last build report, if a scene is built.
    pub fn report(&self) -> Option<&BuildReport> {
        self.scene.as_ref().map(|s| &s.report)
    }

    /// The loaded configuration, if any.
    pub fn config(&self) -> Option<&ConfigSet> {
        self.config.as_ref()
    }
}

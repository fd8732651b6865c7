//! Build errors and per-node diagnostics.
//!
//! Only a handful of conditions abort a build: unreadable or malformed
//! configuration, a degenerate shape, or a world volume that cannot be
//! constructed. Everything else is skipped locally with one [`Diagnostic`]
//! per offending node, so the bulk of a large geometry stays usable when
//! individual nodes are broken.

use detgeo_config::ConfigError;
use detgeo_solids::SolidError;
use thiserror::Error;

/// Fatal errors that terminate a build.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Configuration could not be loaded or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A shape's parameters violate a structural invariant.
    #[error(transparent)]
    Degenerate(#[from] SolidError),

    /// The world volume itself could not be built.
    #[error("world volume '{name}': {reason}")]
    World {
        /// World node name.
        name: String,
        /// Why it failed.
        reason: String,
    },

    /// An engine operation was invoked in the wrong phase.
    #[error("engine is {phase}; expected {expected}")]
    Phase {
        /// Current phase.
        phase: &'static str,
        /// Phase the operation requires.
        expected: &'static str,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Classification of a skipped-node diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Material name not in the config map nor the standard database.
    UnknownMaterial,
    /// Material record structurally incomplete.
    InvalidMaterial,
    /// Required field absent on a solid node.
    MissingField,
    /// Unrecognized solid type tag.
    UnknownSolidType,
    /// Placement parent could not be resolved to a logical volume.
    UnknownParent,
    /// Node left unplaced when the placement fixpoint stalled.
    CyclicPlacement,
    /// Assembly component was itself an assembly.
    NestedAssembly,
    /// Volume built and cached but never placed anywhere.
    NeverPlaced,
}

impl DiagnosticKind {
    /// Stable lowercase label used in log output.
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticKind::UnknownMaterial => "unknown_material",
            DiagnosticKind::InvalidMaterial => "invalid_material",
            DiagnosticKind::MissingField => "missing_field",
            DiagnosticKind::UnknownSolidType => "unknown_solid_type",
            DiagnosticKind::UnknownParent => "unknown_parent",
            DiagnosticKind::CyclicPlacement => "cyclic_placement",
            DiagnosticKind::NestedAssembly => "nested_assembly",
            DiagnosticKind::NeverPlaced => "never_placed",
        }
    }
}

/// One skipped-node report: which node, what went wrong, and why.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Name of the affected node.
    pub node: String,
    /// What category of problem this is.
    pub kind: DiagnosticKind,
    /// Underlying cause, human readable.
    pub detail: String,
}

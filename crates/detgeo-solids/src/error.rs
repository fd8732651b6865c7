//! Error types for solid construction.

use thiserror::Error;

/// Errors that can occur while building solids.
#[derive(Error, Debug)]
pub enum SolidError {
    /// A required dimension or operand is absent (or two mutually exclusive
    /// schemas are present at once).
    #[error("solid '{solid}': missing field '{field}'")]
    MissingField {
        /// Name of the offending solid node.
        solid: String,
        /// Field that was expected.
        field: String,
    },

    /// The node's type tag names no known primitive or boolean operation.
    #[error("solid '{solid}': unknown solid type '{type_tag}'")]
    UnknownSolidType {
        /// Name of the offending solid node.
        solid: String,
        /// The unrecognized tag.
        type_tag: String,
    },

    /// The shape parameters violate a structural invariant.
    #[error("solid '{solid}': degenerate shape: {reason}")]
    DegenerateShape {
        /// Name of the offending solid node.
        solid: String,
        /// What is wrong with the parameters.
        reason: String,
    },

    /// A legacy boolean operand referenced a solid that is not cached.
    #[error("solid '{solid}': referenced solid not found: '{reference}'")]
    UnknownReference {
        /// Name of the offending solid node.
        solid: String,
        /// The missing reference.
        reference: String,
    },
}

impl SolidError {
    /// Whether this error must abort the whole build (degenerate shapes do;
    /// everything else is skipped per node).
    pub fn is_fatal(&self) -> bool {
        matches!(self, SolidError::DegenerateShape { .. })
    }
}

/// Result type for solid construction.
pub type Result<T> = std::result::Result<T, SolidError>;

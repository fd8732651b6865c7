//! Error types for the hits boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the hit-recording path.
#[derive(Error, Debug)]
pub enum HitsError {
    /// The output file could not be created or written.
    #[error("output file {path}: {source}")]
    Io {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The output path was changed after the table was opened.
    #[error("output {path} already open; set the file name before the first event")]
    OutputAlreadyOpen {
        /// Path of the open output.
        path: PathBuf,
    },

    /// An event row referenced a detector that was not present on the first
    /// event.
    #[error("unknown detector '{name}' in event row")]
    UnknownDetector {
        /// The unexpected detector name.
        name: String,
    },
}

/// Result type for hit output operations.
pub type Result<T> = std::result::Result<T, HitsError>;

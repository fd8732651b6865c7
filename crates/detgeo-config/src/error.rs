//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration documents.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file could not be opened or read.
    #[error("could not read config file {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration document is not well-formed JSON or violates the schema.
    #[error("malformed config document {path}: {source}")]
    Parse {
        /// Path of the offending document.
        path: PathBuf,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

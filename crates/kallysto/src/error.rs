//! Error types for the Kallysto library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Kallysto operations.
///
/// Name conflicts and failed cleanup during a reset are not errors; they are
/// reported through `tracing` and execution continues.
#[derive(Debug, Error)]
pub enum KallystoError {
    /// Error creating, opening or appending to a data store file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing an export's data or image file failed.
    #[error("Failed to persist '{path}': {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid publication configuration or path computation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reading a TOML configuration file.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Requested operation is not supported by a collaborator.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Empty file or no data to read.
    #[error("Empty data: {0}")]
    EmptyData(String),
}

impl KallystoError {
    /// Wrap an IO error with the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KallystoError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a payload write failure with the path it occurred on.
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KallystoError::Persistence {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Kallysto operations.
pub type Result<T> = std::result::Result<T, KallystoError>;

//! Registry error types.

use std::path::PathBuf;

/// Errors that can occur while reading or writing module index files.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Index file is structurally valid JSON but violates an invariant.
    #[error("invalid module index {path}: {detail}")]
    InvalidIndex { path: PathBuf, detail: String },

    /// JSON (de)serialization error.
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

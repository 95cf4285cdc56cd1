//! Report codec error types.

use std::io;
use std::path::PathBuf;

/// A scanner report could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ParseError {
    pub reason: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure to load a report file from disk.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReportError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ReportError::Parse { path, .. } | ReportError::Io { path, .. } => path,
        }
    }
}

//! Error types for the scan report model.

use std::path::PathBuf;

/// Errors raised when a unit's facts violate the model invariants.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unit {unit} has an empty logical module name")]
    EmptyLogicalName { unit: PathBuf },

    #[error("unit {unit} requires module '{logical_name}' which it also provides")]
    SelfRequirement { unit: PathBuf, logical_name: String },

    #[error("unit {unit} provides more than one primary module interface: {}", .names.join(", "))]
    MultiplePrimaryInterfaces { unit: PathBuf, names: Vec<String> },
}

/// A module map format name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown module map format '{0}' (expected gcc, clang or msvc)")]
pub struct UnknownFormat(pub String);

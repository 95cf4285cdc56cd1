//! Graph validation errors.
//!
//! Every variant is fatal to the current regeneration and carries enough
//! context (units, logical names, the full cycle) for an actionable
//! diagnostic.

use std::path::PathBuf;

use moddep_core::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("module '{logical_name}' is provided by both {first_owner} and {second_owner}")]
    DuplicateProvider {
        logical_name: String,
        first_owner: PathBuf,
        second_owner: PathBuf,
    },

    #[error("unit {required_by} requires module '{logical_name}' which no unit provides")]
    UnknownModule {
        logical_name: String,
        required_by: PathBuf,
    },

    #[error("cyclic module dependency: {}", display_cycle(.cycle))]
    CyclicModuleDependency { cycle: Vec<String> },

    #[error("unit {unit} requires module '{logical_name}' which it also provides")]
    SelfRequirement { logical_name: String, unit: PathBuf },

    #[error("unit {unit} provides more than one primary module interface: {}", .names.join(", "))]
    MultiplePrimaryInterfaces { unit: PathBuf, names: Vec<String> },

    #[error("unit {0} was ingested twice")]
    DuplicateUnit(PathBuf),

    #[error(
        "unit {required_by} requires module '{logical_name}' which is private to target '{provider_target}'"
    )]
    PrivateModule {
        logical_name: String,
        provider_target: String,
        required_by: PathBuf,
    },

    #[error("invalid unit {unit}: {detail}")]
    InvalidUnit { unit: PathBuf, detail: String },
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

fn display_cycle(cycle: &[String]) -> String {
    let mut names: Vec<&str> = cycle.iter().map(String::as_str).collect();
    if let Some(first) = cycle.first() {
        names.push(first);
    }
    names.join(" -> ")
}

impl From<ModelError> for GraphError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::SelfRequirement { unit, logical_name } => {
                GraphError::SelfRequirement { logical_name, unit }
            }
            ModelError::MultiplePrimaryInterfaces { unit, names } => {
                GraphError::MultiplePrimaryInterfaces { unit, names }
            }
            ModelError::EmptyLogicalName { unit } => GraphError::InvalidUnit {
                unit,
                detail: "empty logical module name".to_string(),
            },
        }
    }
}

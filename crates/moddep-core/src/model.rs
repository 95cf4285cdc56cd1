//! Per-translation-unit module facts.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Separator between a primary module name and a partition name (`M:part`).
pub const PARTITION_SEPARATOR: char = ':';

/// A module identified by its logical name.
///
/// `compiled_artifact_path` is filled in when the scanner reports one or
/// after the name has been resolved against the whole-build provider index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleReference {
    pub logical_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled_artifact_path: Option<PathBuf>,
}

impl ModuleReference {
    /// A reference with no known artifact path.
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            compiled_artifact_path: None,
        }
    }

    /// A reference with a known artifact path.
    pub fn with_path(logical_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            logical_name: logical_name.into(),
            compiled_artifact_path: Some(path.into()),
        }
    }

    /// Whether this names a module partition (`M:part`).
    pub fn is_partition(&self) -> bool {
        self.logical_name.contains(PARTITION_SEPARATOR)
    }

    /// The primary module this reference belongs to (`M` for `M:part`).
    pub fn primary_module(&self) -> &str {
        self.logical_name
            .split(PARTITION_SEPARATOR)
            .next()
            .unwrap_or(&self.logical_name)
    }
}

/// Everything one translation unit provides and requires.
///
/// Keyed by `primary_output`, the object file the unit compiles to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceDependencyInfo {
    pub primary_output: PathBuf,
    #[serde(default)]
    pub provides: Vec<ModuleReference>,
    #[serde(default)]
    pub requires: Vec<ModuleReference>,
    #[serde(default)]
    pub includes: Vec<PathBuf>,
}

impl SourceDependencyInfo {
    pub fn new(primary_output: impl Into<PathBuf>) -> Self {
        Self {
            primary_output: primary_output.into(),
            ..Self::default()
        }
    }

    /// Add a provided module.
    pub fn provide(mut self, reference: ModuleReference) -> Self {
        self.provides.push(reference);
        self
    }

    /// Add a required module by name.
    pub fn require(mut self, logical_name: impl Into<String>) -> Self {
        self.requires.push(ModuleReference::new(logical_name));
        self
    }

    /// Add an included file.
    pub fn include(mut self, path: impl Into<PathBuf>) -> Self {
        self.includes.push(path.into());
        self
    }

    pub fn primary_output(&self) -> &Path {
        &self.primary_output
    }

    pub fn provided_names(&self) -> impl Iterator<Item = &str> {
        self.provides.iter().map(|p| p.logical_name.as_str())
    }

    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.requires.iter().map(|r| r.logical_name.as_str())
    }

    /// Whether the unit provides a module interface at all.
    pub fn is_module_unit(&self) -> bool {
        !self.provides.is_empty()
    }

    /// Check the per-unit invariants.
    ///
    /// A unit provides at most one primary interface (any number of
    /// partitions), never requires what it provides, and uses no empty names.
    pub fn validate(&self) -> Result<(), ModelError> {
        let unit = || self.primary_output.clone();

        if self
            .provides
            .iter()
            .chain(self.requires.iter())
            .any(|r| r.logical_name.is_empty())
        {
            return Err(ModelError::EmptyLogicalName { unit: unit() });
        }

        let primaries: Vec<String> = self
            .provides
            .iter()
            .filter(|p| !p.is_partition())
            .map(|p| p.logical_name.clone())
            .collect();
        if primaries.len() > 1 {
            return Err(ModelError::MultiplePrimaryInterfaces {
                unit: unit(),
                names: primaries,
            });
        }

        let provided: BTreeSet<&str> = self.provided_names().collect();
        if let Some(name) = self.required_names().find(|n| provided.contains(n)) {
            return Err(ModelError::SelfRequirement {
                unit: unit(),
                logical_name: name.to_string(),
            });
        }

        Ok(())
    }
}

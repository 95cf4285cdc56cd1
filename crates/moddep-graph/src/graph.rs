//! The frozen, validated module dependency graph.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use moddep_core::{ModuleMapFormat, ModuleReference, SourceDependencyInfo, TargetScope};
use moddep_registry::{BmiLocator, IndexedModule, ModuleIndex};

use crate::error::{GraphError, Result};

/// An ingested translation unit and the target it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub info: SourceDependencyInfo,
    pub scope: TargetScope,
}

/// Where a logical module comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEntry {
    /// Primary output of the providing unit.
    pub primary_output: PathBuf,
    /// The provided module's BMI.
    pub bmi: PathBuf,
    pub scope: TargetScope,
    /// Modules the providing unit requires.
    pub requires: Vec<String>,
    /// Provided by a previously collated target's index rather than an
    /// ingested unit.
    pub imported: bool,
}

/// Immutable result of [`ModuleGraphBuilder::finalize`].
///
/// Every requirement of every unit resolves to exactly one visible
/// provider and there are no cycles. Safe to share across threads.
///
/// [`ModuleGraphBuilder::finalize`]: crate::ModuleGraphBuilder::finalize
#[derive(Debug, Clone)]
pub struct ModuleDependencyGraph {
    format: Option<ModuleMapFormat>,
    units: BTreeMap<PathBuf, Unit>,
    providers: BTreeMap<String, ProviderEntry>,
}

impl ModuleDependencyGraph {
    pub(crate) fn new(
        format: Option<ModuleMapFormat>,
        units: BTreeMap<PathBuf, Unit>,
        providers: BTreeMap<String, ProviderEntry>,
    ) -> Self {
        Self {
            format,
            units,
            providers,
        }
    }

    pub fn format(&self) -> Option<ModuleMapFormat> {
        self.format
    }

    /// All units, ordered by primary output.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn unit(&self, primary_output: &Path) -> Option<&Unit> {
        self.units.get(primary_output)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn provider(&self, logical_name: &str) -> Option<&ProviderEntry> {
        self.providers.get(logical_name)
    }

    /// All providers, ordered by logical name.
    pub fn providers(&self) -> impl Iterator<Item = (&str, &ProviderEntry)> {
        self.providers.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Resolve each requirement of `info` to its provider's BMI.
    ///
    /// `info` need not be part of the graph; when it is, the visibility of
    /// each provider is checked against the unit's target.
    pub fn resolve(&self, info: &SourceDependencyInfo) -> Result<Vec<ModuleReference>> {
        let consumer = self.units.get(&info.primary_output);
        info.requires
            .iter()
            .map(|req| {
                let provider = self.providers.get(&req.logical_name).ok_or_else(|| {
                    GraphError::UnknownModule {
                        logical_name: req.logical_name.clone(),
                        required_by: info.primary_output.clone(),
                    }
                })?;
                if let Some(unit) = consumer {
                    check_visible(&req.logical_name, provider, unit)?;
                }
                Ok(ModuleReference::with_path(
                    req.logical_name.clone(),
                    provider.bmi.clone(),
                ))
            })
            .collect()
    }

    /// Index of the modules `target` provides, for later import.
    pub fn export_index(&self, target: &str) -> ModuleIndex {
        let mut index = ModuleIndex::new(target);
        for (name, provider) in &self.providers {
            if provider.imported || provider.scope.target != target {
                continue;
            }
            index.insert(
                name.clone(),
                IndexedModule {
                    bmi: provider.bmi.clone(),
                    primary_output: provider.primary_output.clone(),
                    visibility: provider.scope.visibility,
                    requires: provider.requires.clone(),
                },
            );
        }
        index
    }

    /// Targets that own at least one ingested unit.
    pub fn targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = self
            .units
            .values()
            .map(|u| u.scope.target.as_str())
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }
}

impl BmiLocator for ModuleDependencyGraph {
    fn bmi_location(&self, logical_name: &str) -> Option<PathBuf> {
        self.providers.get(logical_name).map(|p| p.bmi.clone())
    }
}

pub(crate) fn check_visible(
    logical_name: &str,
    provider: &ProviderEntry,
    consumer: &Unit,
) -> Result<()> {
    if provider.scope.is_visible_to(&consumer.scope.target) {
        return Ok(());
    }
    Err(GraphError::PrivateModule {
        logical_name: logical_name.to_string(),
        provider_target: provider.scope.target.clone(),
        required_by: consumer.info.primary_output.clone(),
    })
}

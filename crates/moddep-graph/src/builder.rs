//! Staged construction of the module dependency graph.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Mutex;

use moddep_core::{ModuleMapFormat, SourceDependencyInfo, TargetScope};
use moddep_registry::{derive_bmi_path, ModuleIndex};

use crate::cycle::find_cycle;
use crate::error::{GraphError, Result};
use crate::graph::{check_visible, ModuleDependencyGraph, ProviderEntry, Unit};

/// Accumulates units until the whole build has been scanned.
///
/// Ingestion order never changes the finalized graph. Duplicate providers
/// and cycles are rejected as soon as they appear; a requirement with no
/// provider is only an error at [`finalize`](Self::finalize), since its
/// provider may simply not have been ingested yet.
///
/// A failed ingest leaves the builder unchanged.
#[derive(Debug, Default)]
pub struct ModuleGraphBuilder {
    format: Option<ModuleMapFormat>,
    units: BTreeMap<PathBuf, Unit>,
    providers: BTreeMap<String, ProviderEntry>,
    /// Module names some known provider or unit requires.
    demanded: BTreeSet<String>,
}

impl ModuleGraphBuilder {
    /// `format` decides the extension of BMIs whose path a report omits.
    pub fn new(format: Option<ModuleMapFormat>) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn format(&self) -> Option<ModuleMapFormat> {
        self.format
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Provider registered so far for `logical_name`.
    pub fn provider(&self, logical_name: &str) -> Option<&ProviderEntry> {
        self.providers.get(logical_name)
    }

    /// Add a unit that belongs to no particular target.
    pub fn ingest(&mut self, info: SourceDependencyInfo) -> Result<()> {
        self.ingest_scoped(info, TargetScope::default())
    }

    /// Add a unit belonging to `scope`.
    pub fn ingest_scoped(&mut self, info: SourceDependencyInfo, scope: TargetScope) -> Result<()> {
        info.validate()?;
        if self.units.contains_key(&info.primary_output) {
            return Err(GraphError::DuplicateUnit(info.primary_output.clone()));
        }

        let requires: Vec<String> = info.required_names().map(str::to_string).collect();
        let mut new_providers: BTreeMap<String, ProviderEntry> = BTreeMap::new();
        for provided in &info.provides {
            if let Some(existing) = self.providers.get(&provided.logical_name) {
                return Err(GraphError::DuplicateProvider {
                    logical_name: provided.logical_name.clone(),
                    first_owner: existing.primary_output.clone(),
                    second_owner: info.primary_output.clone(),
                });
            }
            let bmi = provided.compiled_artifact_path.clone().unwrap_or_else(|| {
                derive_bmi_path(&info.primary_output, &provided.logical_name, self.format)
            });
            new_providers
                .entry(provided.logical_name.clone())
                .or_insert_with(|| ProviderEntry {
                    primary_output: info.primary_output.clone(),
                    bmi,
                    scope: scope.clone(),
                    requires: requires.clone(),
                    imported: false,
                });
        }

        // A new cycle must enter this unit through something already
        // demanding one of its modules and leave it through a known provider.
        let may_close_cycle = new_providers.keys().any(|n| self.demanded.contains(n))
            && requires.iter().any(|n| self.providers.contains_key(n));

        tracing::debug!(
            unit = %info.primary_output.display(),
            target = %scope.target,
            provides = info.provides.len(),
            requires = info.requires.len(),
            "ingesting unit"
        );

        let key = info.primary_output.clone();
        self.providers.extend(new_providers);
        self.units.insert(key.clone(), Unit { info, scope });

        if may_close_cycle {
            let starts = self.units[&key].info.provided_names();
            let cycle = find_cycle(starts, |name| self.successors(name));
            if let Some(cycle) = cycle {
                self.units.remove(&key);
                self.providers.retain(|_, p| p.imported || p.primary_output != key);
                return Err(GraphError::CyclicModuleDependency { cycle });
            }
        }
        self.demanded.extend(requires);
        Ok(())
    }

    /// Make the modules of a previously collated target available.
    ///
    /// Importing the same index twice is harmless; a module already
    /// provided by a different unit is a duplicate.
    pub fn import_index(&mut self, index: &ModuleIndex) -> Result<()> {
        for (name, module) in &index.modules {
            if let Some(existing) = self.providers.get(name) {
                if existing.imported && existing.primary_output == module.primary_output {
                    continue;
                }
                return Err(GraphError::DuplicateProvider {
                    logical_name: name.clone(),
                    first_owner: existing.primary_output.clone(),
                    second_owner: module.primary_output.clone(),
                });
            }
        }

        for (name, module) in &index.modules {
            self.providers.entry(name.clone()).or_insert_with(|| ProviderEntry {
                primary_output: module.primary_output.clone(),
                bmi: module.bmi.clone(),
                scope: TargetScope {
                    target: index.target.clone(),
                    visibility: module.visibility,
                },
                requires: module.requires.clone(),
                imported: true,
            });
            self.demanded.extend(module.requires.iter().cloned());
        }

        tracing::debug!(
            target = %index.target,
            modules = index.modules.len(),
            "imported module index"
        );
        Ok(())
    }

    /// Validate the complete graph and freeze it.
    pub fn finalize(self) -> Result<ModuleDependencyGraph> {
        for unit in self.units.values() {
            for req in &unit.info.requires {
                let provider = self.providers.get(&req.logical_name).ok_or_else(|| {
                    GraphError::UnknownModule {
                        logical_name: req.logical_name.clone(),
                        required_by: unit.info.primary_output.clone(),
                    }
                })?;
                check_visible(&req.logical_name, provider, unit)?;
            }
        }

        let starts = self.providers.keys().map(String::as_str);
        if let Some(cycle) = find_cycle(starts, |name| self.successors(name)) {
            return Err(GraphError::CyclicModuleDependency { cycle });
        }

        tracing::info!(
            units = self.units.len(),
            providers = self.providers.len(),
            "module dependency graph finalized"
        );
        Ok(ModuleDependencyGraph::new(
            self.format,
            self.units,
            self.providers,
        ))
    }

    /// Modules required by the unit providing `name`, restricted to those
    /// with a known provider.
    fn successors(&self, name: &str) -> Vec<&str> {
        let Some(provider) = self.providers.get(name) else {
            return Vec::new();
        };
        provider
            .requires
            .iter()
            .map(String::as_str)
            .filter(|n| self.providers.contains_key(*n))
            .collect()
    }
}

/// A builder that many scanner threads can feed at once.
///
/// Ingestion is serialized behind a mutex; the finalized graph needs no
/// locking.
#[derive(Debug, Default)]
pub struct SharedGraphBuilder {
    inner: Mutex<ModuleGraphBuilder>,
}

impl SharedGraphBuilder {
    pub fn new(builder: ModuleGraphBuilder) -> Self {
        Self {
            inner: Mutex::new(builder),
        }
    }

    pub fn ingest_scoped(&self, info: SourceDependencyInfo, scope: TargetScope) -> Result<()> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .ingest_scoped(info, scope)
    }

    pub fn into_inner(self) -> ModuleGraphBuilder {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn finalize(self) -> Result<ModuleDependencyGraph> {
        self.into_inner().finalize()
    }
}

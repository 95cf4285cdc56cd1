//! Per-target module index files.
//!
//! After a target's units are collated, the modules it provides are written
//! to `<target>.modules.json`. Targets and subprojects that are generated
//! later read these files back so their requirements can resolve across
//! target boundaries.
//!
//! Layout:
//! ```text
//! {
//!   "target": "lib",
//!   "config": "Debug",
//!   "modules": {
//!     "M": {
//!       "bmi": "/build/lib.dir/M.gcm",
//!       "primary-output": "/build/lib.dir/m.o",
//!       "visibility": "public",
//!       "requires": ["M:impl"]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use moddep_core::Visibility;

use crate::error::{RegistryError, Result};
use crate::location::BmiLocator;

/// One exported module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedModule {
    pub bmi: PathBuf,
    #[serde(rename = "primary-output")]
    pub primary_output: PathBuf,
    #[serde(default)]
    pub visibility: Visibility,
    /// Modules the providing unit imports itself, so that consumers can
    /// follow the closure through this target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

/// The modules provided by one target for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleIndex {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(default)]
    pub modules: BTreeMap<String, IndexedModule>,
}

impl ModuleIndex {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Record a provided module, replacing any previous entry of that name.
    pub fn insert(&mut self, logical_name: impl Into<String>, module: IndexedModule) {
        self.modules.insert(logical_name.into(), module);
    }

    pub fn get(&self, logical_name: &str) -> Option<&IndexedModule> {
        self.modules.get(logical_name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// File name used for this target's index.
    pub fn file_name(target: &str) -> String {
        format!("{target}.modules.json")
    }

    /// Load an index file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index: ModuleIndex =
            serde_json::from_str(&data).map_err(|source| RegistryError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        if index.target.is_empty() {
            return Err(RegistryError::InvalidIndex {
                path: path.to_path_buf(),
                detail: "target name is required".to_string(),
            });
        }
        if index.modules.keys().any(|name| name.is_empty()) {
            return Err(RegistryError::InvalidIndex {
                path: path.to_path_buf(),
                detail: "empty logical module name".to_string(),
            });
        }

        tracing::debug!(
            index = %path.display(),
            target = %index.target,
            modules = index.modules.len(),
            "loaded module index"
        );
        Ok(index)
    }

    /// Write the index, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut data = serde_json::to_string_pretty(self).map_err(|source| RegistryError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        data.push('\n');
        std::fs::write(path, data).map_err(io_err)
    }
}

impl BmiLocator for ModuleIndex {
    fn bmi_location(&self, logical_name: &str) -> Option<PathBuf> {
        self.modules.get(logical_name).map(|m| m.bmi.clone())
    }
}

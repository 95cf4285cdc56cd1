//! `moddep.toml` build description.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use moddep_core::ModuleMapFormat;
use moddep_registry::PathStyle;

pub const MANIFEST_FILE: &str = "moddep.toml";

/// The top-level manifest structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModdepManifest {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// Build-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Anchor for module maps; relative to the manifest directory.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Toolchain module maps are written for. Without one no maps are
    /// written and BMIs get the generic extension.
    #[serde(default)]
    pub format: Option<ModuleMapFormat>,
    /// Where `edges.json` and module index files go. Defaults to
    /// `<root>/moddep`.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Separator convention for paths written into module maps.
    #[serde(default)]
    pub path_style: PathStyle,
    /// Build configuration recorded in module index files.
    #[serde(default)]
    pub config: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            format: None,
            output_dir: None,
            path_style: PathStyle::Native,
            config: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("build")
}

/// One target and the scanner reports of its units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetConfig {
    pub name: String,
    #[serde(default)]
    pub reports: Vec<PathBuf>,
    /// Reports of units whose modules are not visible to other targets.
    #[serde(default)]
    pub private_reports: Vec<PathBuf>,
    /// Module index files of separately collated targets or subprojects.
    #[serde(default)]
    pub imports: Vec<PathBuf>,
}

impl ModdepManifest {
    /// Search upward from `start_dir` for a `moddep.toml` file, parse and return
    /// it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest = Self::parse(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse and validate manifest text.
    pub fn parse(s: &str) -> Result<Self> {
        let manifest: ModdepManifest = toml::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for target in &self.targets {
            if target.name.is_empty() {
                bail!("target name must not be empty");
            }
            if !seen.insert(target.name.as_str()) {
                bail!("target '{}' is declared twice", target.name);
            }
        }
        Ok(())
    }

    pub fn root_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.build.root)
    }

    pub fn output_dir(&self, project_dir: &Path) -> PathBuf {
        match &self.build.output_dir {
            Some(dir) => project_dir.join(dir),
            None => self.root_dir(project_dir).join("moddep"),
        }
    }

    /// Generate the default template for `moddep init`.
    pub fn template(format: ModuleMapFormat) -> String {
        format!(
            r#"[build]
root = "build"
format = "{format}"
path-style = "native"

# [[targets]]
# name = "app"
# reports = ["build/app/main.cxx.o.ddi"]
# private-reports = []
# imports = []
"#
        )
    }
}

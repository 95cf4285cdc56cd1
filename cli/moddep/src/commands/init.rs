//! `moddep init`: write a starter manifest.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use moddep_core::ModuleMapFormat;

use crate::manifest::{ModdepManifest, MANIFEST_FILE};

pub fn run(dir: &Path, format: ModuleMapFormat) -> Result<()> {
    let path = dir.join(MANIFEST_FILE);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    fs::write(&path, ModdepManifest::template(format))
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Created {}", path.display());
    Ok(())
}

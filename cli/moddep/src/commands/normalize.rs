//! `moddep normalize`: rewrite a scanner report in canonical form.

use std::path::Path;

use anyhow::{Context, Result};

pub fn run(report: &Path, input: &Path, output: &Path) -> Result<()> {
    let info = moddep_scan::parse_file(report)?;
    moddep_scan::write(output, input, &info)
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "{}: {} provided, {} required",
        output.display(),
        info.provides.len(),
        info.requires.len()
    );
    Ok(())
}

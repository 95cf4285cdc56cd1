//! BMI file naming per toolchain.

use std::path::{Path, PathBuf};

use moddep_core::{ModuleMapFormat, PARTITION_SEPARATOR};

/// Suffix used when no toolchain format is known.
pub const DEFAULT_EXTENSION: &str = ".bmi";

/// The on-disk suffix a toolchain expects for compiled module interfaces.
///
/// An absent format falls back to [`DEFAULT_EXTENSION`].
pub fn extension_for(format: Option<ModuleMapFormat>) -> &'static str {
    match format {
        Some(ModuleMapFormat::Gcc) => ".gcm",
        Some(ModuleMapFormat::Clang) => ".pcm",
        Some(ModuleMapFormat::Msvc) => ".ifc",
        None => DEFAULT_EXTENSION,
    }
}

/// BMI location for a provided module whose report names no artifact path.
///
/// The BMI sits next to the unit's primary output and is named after the
/// logical name, with the partition separator replaced so the name is a
/// valid file name everywhere.
pub fn derive_bmi_path(
    primary_output: &Path,
    logical_name: &str,
    format: Option<ModuleMapFormat>,
) -> PathBuf {
    let file_name = format!(
        "{}{}",
        logical_name.replace(PARTITION_SEPARATOR, "-"),
        extension_for(format)
    );
    match primary_output.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

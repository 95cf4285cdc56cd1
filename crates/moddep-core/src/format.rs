//! Module map formats, one per compiler family.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownFormat;

/// Toolchain family a module map is emitted for.
///
/// Every consumer matches on this exhaustively, so adding a toolchain is a
/// compile-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleMapFormat {
    /// GCC `-fmodule-mapper` file.
    Gcc,
    /// Clang response file with `-fmodule-file=` flags.
    Clang,
    /// MSVC response file with `/reference` flags.
    Msvc,
}

impl ModuleMapFormat {
    pub const ALL: [ModuleMapFormat; 3] = [Self::Gcc, Self::Clang, Self::Msvc];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::Msvc => "msvc",
        }
    }
}

impl fmt::Display for ModuleMapFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModuleMapFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" => Ok(Self::Gcc),
            "clang" => Ok(Self::Clang),
            "msvc" => Ok(Self::Msvc),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

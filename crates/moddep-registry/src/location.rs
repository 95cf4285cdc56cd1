//! Location context and BMI path lookup.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whole-build lookup from a logical module name to its BMI path.
///
/// Returns `None` when the module is unknown, belongs to a target that has
/// not been processed yet, or is not visible. Absence is never an error at
/// this level.
pub trait BmiLocator: Send + Sync {
    fn bmi_location(&self, logical_name: &str) -> Option<PathBuf>;
}

impl<F> BmiLocator for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn bmi_location(&self, logical_name: &str) -> Option<PathBuf> {
        self(logical_name)
    }
}

/// Path syntax expected by the active backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// Paths are written as produced.
    #[default]
    Native,
    /// All separators become `/`.
    Forward,
    /// All separators become `\`.
    Backslash,
}

impl PathStyle {
    pub fn apply(&self, path: &Path) -> PathBuf {
        match self {
            PathStyle::Native => path.to_path_buf(),
            PathStyle::Forward => PathBuf::from(path.to_string_lossy().replace('\\', "/")),
            PathStyle::Backslash => PathBuf::from(path.to_string_lossy().replace('/', "\\")),
        }
    }
}

impl FromStr for PathStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "native" => Ok(PathStyle::Native),
            "forward" => Ok(PathStyle::Forward),
            "backslash" => Ok(PathStyle::Backslash),
            other => Err(format!(
                "unknown path style '{other}' (expected native, forward or backslash)"
            )),
        }
    }
}

type PathRewriter<'a> = Box<dyn Fn(&Path) -> PathBuf + Send + Sync + 'a>;

/// Everything needed to name a module's BMI for one backend.
///
/// Owned by a single build-graph construction and discarded at its end.
pub struct ModuleLocationContext<'a> {
    root_directory: PathBuf,
    path_for_generator: PathRewriter<'a>,
    locator: &'a dyn BmiLocator,
}

impl<'a> ModuleLocationContext<'a> {
    /// Create a context that writes paths unchanged.
    pub fn new(root_directory: impl Into<PathBuf>, locator: &'a dyn BmiLocator) -> Self {
        Self {
            root_directory: root_directory.into(),
            path_for_generator: Box::new(|p: &Path| p.to_path_buf()),
            locator,
        }
    }

    /// Rewrite paths with one of the standard conventions.
    pub fn with_path_style(self, style: PathStyle) -> Self {
        self.with_path_rewriter(move |p| style.apply(p))
    }

    /// Rewrite paths with a custom function.
    pub fn with_path_rewriter(
        mut self,
        rewrite: impl Fn(&Path) -> PathBuf + Send + Sync + 'a,
    ) -> Self {
        self.path_for_generator = Box::new(rewrite);
        self
    }

    /// Anchor for relative paths written into module maps.
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn path_for_generator(&self, path: &Path) -> PathBuf {
        (self.path_for_generator)(path)
    }

    pub fn bmi_location_for_module(&self, logical_name: &str) -> Option<PathBuf> {
        self.locator.bmi_location(logical_name)
    }
}

impl fmt::Debug for ModuleLocationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLocationContext")
            .field("root_directory", &self.root_directory)
            .finish_non_exhaustive()
    }
}

/// Resolve a module's BMI path in the syntax the backend expects.
pub fn bmi_path(context: &ModuleLocationContext<'_>, logical_name: &str) -> Option<PathBuf> {
    let location = context.bmi_location_for_module(logical_name);
    if location.is_none() {
        tracing::trace!(module = logical_name, "BMI location not (yet) known");
    }
    location.map(|p| context.path_for_generator(&p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<PathBuf> {
        match name {
            "M" => Some(PathBuf::from("/build/M.gcm")),
            "win" => Some(PathBuf::from("C:/build/win.ifc")),
            _ => None,
        }
    }

    static LOOKUP: fn(&str) -> Option<PathBuf> = lookup;

    #[test]
    fn resolves_known_module() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP);
        assert_eq!(bmi_path(&ctx, "M"), Some(PathBuf::from("/build/M.gcm")));
        assert_eq!(ctx.root_directory(), Path::new("/build"));
    }

    #[test]
    fn unknown_module_is_absent() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP);
        assert_eq!(bmi_path(&ctx, "missing"), None);
    }

    #[test]
    fn applies_path_style() {
        let ctx =
            ModuleLocationContext::new("/build", &LOOKUP).with_path_style(PathStyle::Backslash);
        assert_eq!(
            bmi_path(&ctx, "win"),
            Some(PathBuf::from("C:\\build\\win.ifc"))
        );
    }

    #[test]
    fn applies_custom_rewriter() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP).with_path_rewriter(|p| {
            Path::new("$builddir").join(p.strip_prefix("/build").unwrap_or(p))
        });
        assert_eq!(bmi_path(&ctx, "M"), Some(PathBuf::from("$builddir/M.gcm")));
    }

    #[test]
    fn parse_path_style() {
        assert_eq!("forward".parse::<PathStyle>(), Ok(PathStyle::Forward));
        assert!("sideways".parse::<PathStyle>().is_err());
        assert_eq!(serde_json::to_string(&PathStyle::Backslash).unwrap(), "\"backslash\"");
        assert_eq!(
            PathStyle::Forward.apply(Path::new("a\\b/c")),
            PathBuf::from("a/b/c")
        );
    }
}

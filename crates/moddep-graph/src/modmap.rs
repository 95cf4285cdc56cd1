//! Per-unit module map files.
//!
//! A module map tells the compiler where each module a unit provides or
//! imports lives. The three supported toolchains want different syntax:
//!
//! ```text
//! gcc:    $root /build          clang:  -x c++-module            msvc:  /interface
//!         M /build/M.gcm                -fmodule-output=/b/M.pcm        /ifcOutput /b/M.ifc
//!         N /build/N.gcm                -fmodule-file=N=/b/N.pcm        /reference N=/b/N.ifc
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use moddep_core::{ModuleMapFormat, ModuleReference, SourceDependencyInfo};
use moddep_registry::{bmi_path, ModuleLocationContext};

use crate::graph::ModuleDependencyGraph;
use crate::synth::transitive_requirements;

/// Render the module map for `info`.
///
/// Provided modules come first, then requirements in the order the unit
/// lists them. Modules whose BMI location is not yet known are left out;
/// the output is otherwise a pure function of its inputs.
pub fn emit_module_map(
    format: ModuleMapFormat,
    context: &ModuleLocationContext<'_>,
    info: &SourceDependencyInfo,
) -> String {
    let provided: Vec<(&str, PathBuf)> = info
        .provides
        .iter()
        .filter_map(|p| provided_location(context, p).map(|path| (p.logical_name.as_str(), path)))
        .collect();
    let required: Vec<(&str, PathBuf)> = info
        .required_names()
        .filter_map(|name| bmi_path(context, name).map(|path| (name, path)))
        .collect();

    let mut out = String::new();
    match format {
        ModuleMapFormat::Gcc => {
            let _ = writeln!(out, "$root {}", context.root_directory().display());
            for (name, path) in provided.iter().chain(&required) {
                let _ = writeln!(out, "{name} {}", path.display());
            }
        }
        ModuleMapFormat::Clang => {
            if !provided.is_empty() {
                let _ = writeln!(out, "-x c++-module");
            }
            for (_, path) in &provided {
                let _ = writeln!(out, "-fmodule-output={}", quoted(path));
            }
            for (name, path) in &required {
                let _ = writeln!(out, "-fmodule-file={name}={}", quoted(path));
            }
        }
        ModuleMapFormat::Msvc => {
            if !provided.is_empty() {
                let _ = writeln!(out, "/interface");
            }
            for (_, path) in &provided {
                let _ = writeln!(out, "/ifcOutput {}", quoted(path));
            }
            for (name, path) in &required {
                let _ = writeln!(out, "/reference {name}={}", quoted(path));
            }
        }
    }
    out
}

/// Module map for a unit of `graph`, listing every module reachable
/// through its imports rather than only the direct ones.
pub fn module_map_for_unit(
    graph: &ModuleDependencyGraph,
    format: ModuleMapFormat,
    context: &ModuleLocationContext<'_>,
    info: &SourceDependencyInfo,
) -> String {
    let mut expanded = SourceDependencyInfo::new(info.primary_output.clone());
    expanded.provides = info.provides.clone();
    expanded.requires = transitive_requirements(graph, info)
        .into_iter()
        .map(ModuleReference::new)
        .collect();
    emit_module_map(format, context, &expanded)
}

fn provided_location(
    context: &ModuleLocationContext<'_>,
    provided: &ModuleReference,
) -> Option<PathBuf> {
    bmi_path(context, &provided.logical_name).or_else(|| {
        provided
            .compiled_artifact_path
            .as_deref()
            .map(|p| context.path_for_generator(p))
    })
}

/// Quote a response-file argument containing whitespace.
fn quoted(path: &Path) -> String {
    let text = path.display().to_string();
    if text.contains(char::is_whitespace) {
        format!("\"{text}\"")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moddep_registry::PathStyle;

    use crate::builder::ModuleGraphBuilder;

    fn lookup(name: &str) -> Option<PathBuf> {
        match name {
            "M" => Some(PathBuf::from("/build/M.bmi")),
            "M:part" => Some(PathBuf::from("/build/M-part.bmi")),
            "N" => Some(PathBuf::from("/build/N.bmi")),
            "Spaced" => Some(PathBuf::from("/build dir/Spaced.pcm")),
            _ => None,
        }
    }

    static LOOKUP: fn(&str) -> Option<PathBuf> = lookup;

    #[test]
    fn gcc_exact_output() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP);
        let info = SourceDependencyInfo::new("/build/main.o").require("M");
        assert_eq!(
            emit_module_map(ModuleMapFormat::Gcc, &ctx, &info),
            "$root /build\nM /build/M.bmi\n"
        );
    }

    #[test]
    fn gcc_lists_provides_first() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP);
        let info = SourceDependencyInfo::new("/build/n.o")
            .require("M")
            .provide(ModuleReference::new("N"));
        assert_eq!(
            emit_module_map(ModuleMapFormat::Gcc, &ctx, &info),
            "$root /build\nN /build/N.bmi\nM /build/M.bmi\n"
        );
    }

    #[test]
    fn unknown_requirements_are_skipped() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP);
        let info = SourceDependencyInfo::new("/build/main.o")
            .require("later")
            .require("M");
        assert_eq!(
            emit_module_map(ModuleMapFormat::Gcc, &ctx, &info),
            "$root /build\nM /build/M.bmi\n"
        );
    }

    #[test]
    fn clang_flags() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP);
        let info = SourceDependencyInfo::new("/build/n.o")
            .provide(ModuleReference::new("N"))
            .require("M")
            .require("Spaced");
        assert_eq!(
            emit_module_map(ModuleMapFormat::Clang, &ctx, &info),
            "-x c++-module\n\
             -fmodule-output=/build/N.bmi\n\
             -fmodule-file=M=/build/M.bmi\n\
             -fmodule-file=Spaced=\"/build dir/Spaced.pcm\"\n"
        );
    }

    #[test]
    fn msvc_flags_with_backslashes() {
        let ctx =
            ModuleLocationContext::new("/build", &LOOKUP).with_path_style(PathStyle::Backslash);
        let info = SourceDependencyInfo::new("/build/n.o")
            .provide(ModuleReference::new("N"))
            .require("M");
        assert_eq!(
            emit_module_map(ModuleMapFormat::Msvc, &ctx, &info),
            "/interface\n/ifcOutput \\build\\N.bmi\n/reference M=\\build\\M.bmi\n"
        );
    }

    #[test]
    fn every_provided_partition_gets_an_output() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP);
        let info = SourceDependencyInfo::new("/build/m.o")
            .provide(ModuleReference::new("M"))
            .provide(ModuleReference::new("M:part"));
        assert_eq!(
            emit_module_map(ModuleMapFormat::Clang, &ctx, &info),
            "-x c++-module\n-fmodule-output=/build/M.bmi\n-fmodule-output=/build/M-part.bmi\n"
        );
        assert_eq!(
            emit_module_map(ModuleMapFormat::Msvc, &ctx, &info),
            "/interface\n/ifcOutput /build/M.bmi\n/ifcOutput /build/M-part.bmi\n"
        );
        assert_eq!(
            emit_module_map(ModuleMapFormat::Gcc, &ctx, &info),
            "$root /build\nM /build/M.bmi\nM:part /build/M-part.bmi\n"
        );
    }

    #[test]
    fn consumer_without_provides_is_not_an_interface() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP);
        let info = SourceDependencyInfo::new("/build/main.o").require("M");
        assert_eq!(
            emit_module_map(ModuleMapFormat::Msvc, &ctx, &info),
            "/reference M=/build/M.bmi\n"
        );
    }

    #[test]
    fn repeated_calls_are_identical() {
        let ctx = ModuleLocationContext::new("/build", &LOOKUP);
        let info = SourceDependencyInfo::new("/build/main.o").require("N").require("M");
        let first = emit_module_map(ModuleMapFormat::Gcc, &ctx, &info);
        for _ in 0..5 {
            assert_eq!(emit_module_map(ModuleMapFormat::Gcc, &ctx, &info), first);
        }
    }

    #[test]
    fn unit_map_includes_transitive_modules() {
        let mut builder = ModuleGraphBuilder::new(Some(ModuleMapFormat::Gcc));
        builder
            .ingest(SourceDependencyInfo::new("/b/main.o").require("App"))
            .unwrap();
        builder
            .ingest(
                SourceDependencyInfo::new("/b/app.o")
                    .provide(ModuleReference::new("App"))
                    .require("Util"),
            )
            .unwrap();
        builder
            .ingest(SourceDependencyInfo::new("/b/util.o").provide(ModuleReference::new("Util")))
            .unwrap();
        let graph = builder.finalize().unwrap();

        let ctx = ModuleLocationContext::new("/b", &graph);
        let main = &graph.unit(Path::new("/b/main.o")).unwrap().info;
        assert_eq!(
            module_map_for_unit(&graph, ModuleMapFormat::Gcc, &ctx, main),
            "$root /b\nApp /b/App.gcm\nUtil /b/Util.gcm\n"
        );
    }
}

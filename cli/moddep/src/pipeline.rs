//! Reports → validated graph, shared by every command that needs one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use moddep_core::{SourceDependencyInfo, TargetScope};
use moddep_graph::{ModuleDependencyGraph, ModuleGraphBuilder};
use moddep_registry::ModuleIndex;

use crate::manifest::ModdepManifest;

/// One report to read and the scope its unit belongs to.
#[derive(Debug, Clone)]
struct ReportJob {
    path: PathBuf,
    scope: TargetScope,
}

fn jobs(project_dir: &Path, manifest: &ModdepManifest) -> Vec<ReportJob> {
    let mut jobs = Vec::new();
    for target in &manifest.targets {
        for report in &target.reports {
            jobs.push(ReportJob {
                path: project_dir.join(report),
                scope: TargetScope::public(&target.name),
            });
        }
        for report in &target.private_reports {
            jobs.push(ReportJob {
                path: project_dir.join(report),
                scope: TargetScope::private(&target.name),
            });
        }
    }
    jobs
}

/// Parse every report of the manifest, import the declared module indices
/// and validate the resulting graph.
///
/// Reports are parsed in parallel; ingestion happens in manifest order so
/// the first reported error does not depend on thread scheduling.
pub fn build_graph(
    project_dir: &Path,
    manifest: &ModdepManifest,
) -> Result<ModuleDependencyGraph> {
    let jobs = jobs(project_dir, manifest);

    let parsed: Vec<(SourceDependencyInfo, TargetScope)> = jobs
        .par_iter()
        .map(|job| -> Result<(SourceDependencyInfo, TargetScope)> {
            let mut info = moddep_scan::parse_file(&job.path)?;
            info.primary_output = project_dir.join(&info.primary_output);
            Ok((info, job.scope.clone()))
        })
        .collect::<Result<_>>()?;
    tracing::info!(reports = parsed.len(), "parsed dependency reports");

    let mut builder = ModuleGraphBuilder::new(manifest.build.format);
    for target in &manifest.targets {
        for import in &target.imports {
            let path = project_dir.join(import);
            let index = ModuleIndex::load(&path)?;
            builder
                .import_index(&index)
                .with_context(|| format!("importing {}", path.display()))?;
        }
    }

    for ((info, scope), job) in parsed.into_iter().zip(&jobs) {
        builder
            .ingest_scoped(info, scope)
            .with_context(|| format!("collating {}", job.path.display()))?;
    }

    Ok(builder.finalize()?)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_project_graph() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::project(dir.path());
        let manifest = ModdepManifest::find_and_load(dir.path()).unwrap().unwrap().0;

        let graph = build_graph(dir.path(), &manifest).unwrap();
        assert_eq!(graph.unit_count(), 3);
        assert_eq!(
            graph.provider("Util").unwrap().bmi,
            dir.path().join("build/Util.gcm")
        );
        assert_eq!(graph.targets(), vec!["app", "lib"]);
    }

    #[test]
    fn missing_report_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = ModdepManifest::parse(
            "[[targets]]\nname = \"t\"\nreports = [\"nope.ddi\"]\n",
        )
        .unwrap();
        let err = build_graph(dir.path(), &manifest).unwrap_err();
        assert!(format!("{err:#}").contains("nope.ddi"));
    }

    #[test]
    fn private_module_rejected_across_targets() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::report(dir.path(), "detail", &["Detail"], &[]);
        fixtures::report(dir.path(), "main", &[], &["Detail"]);
        let manifest = ModdepManifest::parse(
            r#"[[targets]]
name = "lib"
private-reports = ["build/detail.ddi"]

[[targets]]
name = "app"
reports = ["build/main.ddi"]
"#,
        )
        .unwrap();
        let err = build_graph(dir.path(), &manifest).unwrap_err();
        assert!(format!("{err:#}").contains("private to target 'lib'"));
    }
}

//! `moddep collate`: reports in, ordering edges, module maps and module
//! indices out.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use moddep_graph::{module_map_for_unit, synthesize_edges, ModuleDependencyGraph};
use moddep_registry::{ModuleIndex, ModuleLocationContext};

use crate::manifest::ModdepManifest;
use crate::pipeline::build_graph;

pub const EDGES_FILE: &str = "edges.json";

/// Module map location for a unit: next to its object file.
pub fn modmap_path(primary_output: &Path) -> PathBuf {
    let mut name = OsString::from(primary_output.as_os_str());
    name.push(".modmap");
    PathBuf::from(name)
}

pub fn run(project_dir: &Path, manifest: &ModdepManifest) -> Result<()> {
    let graph = build_graph(project_dir, manifest)?;
    let out_dir = manifest.output_dir(project_dir);
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let edges = synthesize_edges(&graph);
    let edges_path = out_dir.join(EDGES_FILE);
    let mut json = serde_json::to_string_pretty(&edges)?;
    json.push('\n');
    fs::write(&edges_path, json).with_context(|| format!("writing {}", edges_path.display()))?;

    let maps = write_module_maps(project_dir, manifest, &graph)?;

    for target in &manifest.targets {
        let mut index = graph.export_index(&target.name);
        index.config = manifest.build.config.clone();
        index.save(&out_dir.join(ModuleIndex::file_name(&target.name)))?;
    }

    println!(
        "Collated {} units: {} edges, {} module maps, {} module indices in {}",
        graph.unit_count(),
        edges.len(),
        maps,
        manifest.targets.len(),
        out_dir.display()
    );
    Ok(())
}

fn write_module_maps(
    project_dir: &Path,
    manifest: &ModdepManifest,
    graph: &ModuleDependencyGraph,
) -> Result<usize> {
    let Some(format) = manifest.build.format else {
        tracing::warn!("no module map format configured; skipping module maps");
        return Ok(0);
    };
    let context = ModuleLocationContext::new(manifest.root_dir(project_dir), graph)
        .with_path_style(manifest.build.path_style);

    let units: Vec<_> = graph
        .units()
        .filter(|u| u.info.is_module_unit() || !u.info.requires.is_empty())
        .collect();
    let maps: Vec<(PathBuf, String)> = units
        .par_iter()
        .map(|unit| {
            (
                modmap_path(&unit.info.primary_output),
                module_map_for_unit(graph, format, &context, &unit.info),
            )
        })
        .collect();

    for (path, text) in &maps {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    }
    tracing::info!(maps = maps.len(), format = %format, "wrote module maps");
    Ok(maps.len())
}

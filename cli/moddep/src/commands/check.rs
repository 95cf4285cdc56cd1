//! `moddep check`: validate the module graph without writing anything.

use std::path::Path;

use anyhow::Result;

use moddep_graph::synthesize_edges;

use crate::manifest::ModdepManifest;
use crate::pipeline::build_graph;

pub fn run(project_dir: &Path, manifest: &ModdepManifest) -> Result<()> {
    let graph = build_graph(project_dir, manifest)?;
    let imported = graph.providers().filter(|(_, p)| p.imported).count();
    println!(
        "ok: {} units, {} modules ({} imported), {} ordering edges",
        graph.unit_count(),
        graph.provider_count(),
        imported,
        synthesize_edges(&graph).len()
    );
    Ok(())
}

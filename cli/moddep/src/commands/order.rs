//! `moddep order`: print one legal compile order.

use std::path::Path;

use anyhow::Result;

use moddep_graph::topological_order;

use crate::manifest::ModdepManifest;
use crate::pipeline::build_graph;

pub fn run(project_dir: &Path, manifest: &ModdepManifest, json: bool) -> Result<()> {
    let graph = build_graph(project_dir, manifest)?;
    let order = topological_order(&graph);
    if json {
        println!("{}", serde_json::to_string_pretty(&order)?);
    } else {
        for output in &order {
            println!("{}", output.display());
        }
    }
    Ok(())
}

//! Module dependency graph for a whole build.
//!
//! Aggregates the facts of every translation unit into a provider index,
//! validates it (unique providers, no cycles, every requirement satisfied
//! and visible) and turns it into ordering edges and per-unit module maps.
//!
//! Construction is staged:
//!
//! 1. [`ModuleGraphBuilder::ingest`] each unit, in any order. Requirements
//!    may still be unresolved at this point.
//! 2. [`ModuleGraphBuilder::finalize`] once everything is ingested; only now
//!    are missing providers fatal.
//! 3. Query the frozen [`ModuleDependencyGraph`] from any number of threads
//!    with [`synthesize_edges`], [`emit_module_map`] or
//!    [`ModuleDependencyGraph::resolve`].

pub mod builder;
mod cycle;
pub mod error;
pub mod graph;
pub mod modmap;
pub mod synth;

pub use builder::{ModuleGraphBuilder, SharedGraphBuilder};
pub use error::{GraphError, Result};
pub use graph::{ModuleDependencyGraph, ProviderEntry, Unit};
pub use modmap::{emit_module_map, module_map_for_unit};
pub use synth::{synthesize_edges, topological_order, transitive_requirements, BuildEdge};

#[cfg(test)]
mod tests {
    use super::*;
    use moddep_core::ModuleMapFormat;
    use moddep_registry::ModuleLocationContext;

    fn report(output: &str, provides: &str, requires: &str) -> String {
        format!(
            r#"{{
  "version": 1,
  "revision": 0,
  "rules": [{{
    "primary-output": "{output}",
    "provides": [{provides}],
    "requires": [{requires}]
  }}]
}}"#
        )
    }

    #[test]
    fn reports_to_edges_and_maps() {
        let reports = [
            report("/build/main.o", "", r#"{"logical-name": "M"}"#),
            report(
                "/build/m.o",
                r#"{"logical-name": "M", "compiled-module-path": "/build/M.bmi"}"#,
                "",
            ),
        ];

        let mut builder = ModuleGraphBuilder::new(Some(ModuleMapFormat::Gcc));
        for text in &reports {
            builder.ingest(moddep_scan::parse(text).unwrap()).unwrap();
        }
        let graph = builder.finalize().unwrap();

        let edges = synthesize_edges(&graph);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].consumer_output, std::path::Path::new("/build/main.o"));
        assert_eq!(edges[0].producer_output, std::path::Path::new("/build/m.o"));

        let ctx = ModuleLocationContext::new("/build", &graph);
        let main = &graph.unit(std::path::Path::new("/build/main.o")).unwrap().info;
        assert_eq!(
            emit_module_map(ModuleMapFormat::Gcc, &ctx, main),
            "$root /build\nM /build/M.bmi\n"
        );
    }
}

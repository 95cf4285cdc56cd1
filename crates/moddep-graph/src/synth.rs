//! Build-order synthesis from a finalized graph.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use moddep_core::SourceDependencyInfo;

use crate::graph::ModuleDependencyGraph;

/// `consumer_output` must not compile until `producer_output` (and with it
/// the BMI it provides) has been built.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildEdge {
    #[serde(rename = "consumer")]
    pub consumer_output: PathBuf,
    #[serde(rename = "producer")]
    pub producer_output: PathBuf,
}

/// One edge per (consumer, producer) pair, sorted.
///
/// Several requirements satisfied by the same unit (a primary interface and
/// its partitions) collapse into a single edge. Producers may be units of
/// an imported target.
pub fn synthesize_edges(graph: &ModuleDependencyGraph) -> Vec<BuildEdge> {
    let mut edges = BTreeSet::new();
    for unit in graph.units() {
        for name in unit.info.required_names() {
            if let Some(provider) = graph.provider(name) {
                edges.insert(BuildEdge {
                    consumer_output: unit.info.primary_output.clone(),
                    producer_output: provider.primary_output.clone(),
                });
            }
        }
    }
    tracing::debug!(edges = edges.len(), "synthesized build edges");
    edges.into_iter().collect()
}

/// Units ordered so that every producer precedes its consumers.
///
/// Ties are broken by primary output, so the order is stable. Producers
/// outside the graph (imported targets) are already built and impose no
/// constraint.
pub fn topological_order(graph: &ModuleDependencyGraph) -> Vec<PathBuf> {
    let mut in_degree: BTreeMap<PathBuf, usize> = graph
        .units()
        .map(|u| (u.info.primary_output.clone(), 0))
        .collect();
    let mut dependents: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    for edge in synthesize_edges(graph) {
        if !in_degree.contains_key(&edge.producer_output) {
            continue;
        }
        if let Some(deg) = in_degree.get_mut(&edge.consumer_output) {
            *deg += 1;
        }
        dependents
            .entry(edge.producer_output)
            .or_default()
            .push(edge.consumer_output);
    }

    let mut ready: BTreeSet<PathBuf> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(p, _)| p.clone())
        .collect();
    let mut order = Vec::with_capacity(in_degree.len());

    while let Some(next) = ready.pop_first() {
        if let Some(consumers) = dependents.get(&next) {
            for consumer in consumers {
                if let Some(deg) = in_degree.get_mut(consumer) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(consumer.clone());
                    }
                }
            }
        }
        order.push(next);
    }
    order
}

/// Every module `info` needs visible while compiling, directly or through
/// the interfaces it imports, sorted by name.
///
/// The closure continues through modules of imported targets.
pub fn transitive_requirements(
    graph: &ModuleDependencyGraph,
    info: &SourceDependencyInfo,
) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<String> = info.required_names().map(str::to_string).collect();

    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        // Imported providers carry their requirements from the index file.
        if let Some(provider) = graph.provider(&name) {
            queue.extend(provider.requires.iter().cloned());
        }
    }

    for provided in info.provided_names() {
        seen.remove(provided);
    }
    seen.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use moddep_core::{ModuleMapFormat, ModuleReference, TargetScope};
    use moddep_registry::{IndexedModule, ModuleIndex, ModuleLocationContext};

    use crate::builder::ModuleGraphBuilder;
    use crate::modmap::module_map_for_unit;

    fn chain() -> ModuleDependencyGraph {
        // main -> App -> Util, main -> Util:io (partition unit)
        let mut builder = ModuleGraphBuilder::new(None);
        builder
            .ingest(SourceDependencyInfo::new("/b/main.o").require("App").require("Util"))
            .unwrap();
        builder
            .ingest(
                SourceDependencyInfo::new("/b/app.o")
                    .provide(ModuleReference::new("App"))
                    .require("Util"),
            )
            .unwrap();
        builder
            .ingest(
                SourceDependencyInfo::new("/b/util.o")
                    .provide(ModuleReference::new("Util"))
                    .provide(ModuleReference::new("Util:io")),
            )
            .unwrap();
        builder.finalize().unwrap()
    }

    fn edge(consumer: &str, producer: &str) -> BuildEdge {
        BuildEdge {
            consumer_output: consumer.into(),
            producer_output: producer.into(),
        }
    }

    #[test]
    fn edges_sorted_and_deduplicated() {
        let mut builder = ModuleGraphBuilder::new(None);
        builder
            .ingest(
                SourceDependencyInfo::new("/b/main.o")
                    .require("Util")
                    .require("Util:io"),
            )
            .unwrap();
        builder
            .ingest(
                SourceDependencyInfo::new("/b/util.o")
                    .provide(ModuleReference::new("Util"))
                    .provide(ModuleReference::new("Util:io")),
            )
            .unwrap();
        let graph = builder.finalize().unwrap();

        assert_eq!(synthesize_edges(&graph), vec![edge("/b/main.o", "/b/util.o")]);
    }

    #[test]
    fn chain_edges() {
        assert_eq!(
            synthesize_edges(&chain()),
            vec![
                edge("/b/app.o", "/b/util.o"),
                edge("/b/main.o", "/b/app.o"),
                edge("/b/main.o", "/b/util.o"),
            ]
        );
    }

    #[test]
    fn producers_come_first() {
        assert_eq!(
            topological_order(&chain()),
            vec![
                PathBuf::from("/b/util.o"),
                PathBuf::from("/b/app.o"),
                PathBuf::from("/b/main.o"),
            ]
        );
    }

    #[test]
    fn output_independent_of_ingest_order() {
        let units = [
            SourceDependencyInfo::new("/b/main.o").require("A").require("B"),
            SourceDependencyInfo::new("/b/a.o")
                .provide(ModuleReference::new("A"))
                .require("B"),
            SourceDependencyInfo::new("/b/b.o").provide(ModuleReference::new("B")),
        ];

        let build = |order: &[usize]| {
            let mut builder = ModuleGraphBuilder::new(Some(ModuleMapFormat::Gcc));
            for &i in order {
                builder.ingest(units[i].clone()).unwrap();
            }
            let graph = builder.finalize().unwrap();
            let ctx = ModuleLocationContext::new("/b", &graph);
            let maps: Vec<String> = graph
                .units()
                .map(|u| module_map_for_unit(&graph, ModuleMapFormat::Gcc, &ctx, &u.info))
                .collect();
            (synthesize_edges(&graph), topological_order(&graph), maps)
        };

        let reference = build(&[0, 1, 2]);
        assert_eq!(
            reference.2,
            vec![
                "$root /b\nA /b/A.gcm\nB /b/B.gcm\n",
                "$root /b\nB /b/B.gcm\n",
                "$root /b\nA /b/A.gcm\nB /b/B.gcm\n",
            ]
        );
        for order in [[0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]] {
            assert_eq!(build(&order), reference);
        }
    }

    #[test]
    fn imported_producer_gets_edge_but_no_order_slot() {
        let mut index = ModuleIndex::new("lib");
        index.insert(
            "L",
            IndexedModule {
                bmi: "/b/lib/L.bmi".into(),
                primary_output: "/b/lib/l.o".into(),
                visibility: Default::default(),
                requires: Vec::new(),
            },
        );
        let mut builder = ModuleGraphBuilder::new(None);
        builder.import_index(&index).unwrap();
        builder
            .ingest_scoped(
                SourceDependencyInfo::new("/b/app/main.o").require("L"),
                TargetScope::public("app"),
            )
            .unwrap();
        let graph = builder.finalize().unwrap();

        assert_eq!(
            synthesize_edges(&graph),
            vec![edge("/b/app/main.o", "/b/lib/l.o")]
        );
        assert_eq!(topological_order(&graph), vec![PathBuf::from("/b/app/main.o")]);
    }

    #[test]
    fn transitive_closure_sorted() {
        let graph = chain();
        let main = &graph.unit(Path::new("/b/main.o")).unwrap().info;
        assert_eq!(transitive_requirements(&graph, main), vec!["App", "Util"]);

        let app = &graph.unit(Path::new("/b/app.o")).unwrap().info;
        assert_eq!(transitive_requirements(&graph, app), vec!["Util"]);
    }

    #[test]
    fn closure_follows_imported_requirements() {
        let module = |bmi: &str, output: &str, requires: &[&str]| IndexedModule {
            bmi: bmi.into(),
            primary_output: output.into(),
            visibility: Default::default(),
            requires: requires.iter().map(|r| r.to_string()).collect(),
        };
        let mut index = ModuleIndex::new("lib");
        index.insert("Util", module("/b/lib/Util.gcm", "/b/lib/util.o", &["Dep"]));
        index.insert("Dep", module("/b/lib/Dep.gcm", "/b/lib/dep.o", &[]));

        let mut builder = ModuleGraphBuilder::new(None);
        builder.import_index(&index).unwrap();
        builder
            .ingest_scoped(
                SourceDependencyInfo::new("/b/app/main.o").require("Util"),
                TargetScope::public("app"),
            )
            .unwrap();
        let graph = builder.finalize().unwrap();

        let main = &graph.unit(Path::new("/b/app/main.o")).unwrap().info;
        assert_eq!(transitive_requirements(&graph, main), vec!["Dep", "Util"]);
    }

    #[test]
    fn edge_json_keys() {
        let json = serde_json::to_value(edge("/b/main.o", "/b/m.o")).unwrap();
        assert_eq!(json["consumer"], "/b/main.o");
        assert_eq!(json["producer"], "/b/m.o");
    }
}

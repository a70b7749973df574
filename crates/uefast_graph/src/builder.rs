//! Graph construction and cycle resolution.

use std::collections::BTreeMap;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::{depth_first_search, DfsEvent, EdgeFiltered, EdgeRef};
use tracing::{debug, info, warn};
use uefast_common::{AssetId, AssetRecord, DependencyEdge, EdgeKind, Warning, WarningCode};

use crate::graph::DependencyGraph;

/// Output of [`build_graph`].
#[derive(Debug, Clone)]
pub struct GraphBuild {
    /// The graph; its hard-edge subgraph is acyclic.
    pub graph: DependencyGraph,
    /// Dangling references and demoted cycle edges.
    pub warnings: Vec<Warning>,
}

/// Builds the dependency graph from collected records.
///
/// References to assets that were not collected are dropped with a
/// [`WarningCode::DanglingReference`] warning. A pair referenced both hard
/// and soft becomes one hard edge. Every hard edge that closes a cycle is
/// demoted to soft with a [`WarningCode::CycleDemoted`] warning; all assets
/// stay in the graph. Each record's `hard_deps` and `soft_deps` are rewritten
/// to match the final edges.
pub fn build_graph(mut records: Vec<AssetRecord>) -> GraphBuild {
    records.sort_by(|a, b| a.id.cmp(&b.id));
    records.dedup_by(|later, first| {
        let duplicate = later.id == first.id;
        if duplicate {
            debug!("dropping duplicate record {}", later.id);
        }
        duplicate
    });

    let mut graph = DependencyGraph::new();
    let mut warnings = Vec::new();

    // Declared dependencies per asset, hard taking precedence over soft.
    let mut declared: Vec<(AssetId, BTreeMap<AssetId, EdgeKind>)> = Vec::new();
    for record in records {
        let mut deps = BTreeMap::new();
        for id in &record.soft_deps {
            deps.insert(id.clone(), EdgeKind::Soft);
        }
        for id in &record.hard_deps {
            deps.insert(id.clone(), EdgeKind::Hard);
        }
        deps.remove(&record.id);
        declared.push((record.id.clone(), deps));
        graph.add_record(record);
    }

    for (from, deps) in &declared {
        let from_node = graph.index[from];
        for (to, &kind) in deps {
            match graph.index.get(to) {
                Some(&to_node) => {
                    graph.graph.add_edge(from_node, to_node, kind);
                }
                None => {
                    let kind_name = match kind {
                        EdgeKind::Hard => "hard",
                        EdgeKind::Soft => "soft",
                    };
                    warn!("{from}: {kind_name} reference to missing asset {to}");
                    warnings.push(Warning::new(
                        WarningCode::DanglingReference,
                        from.as_str(),
                        format!("{kind_name} reference to {to}, which is not a collected asset"),
                    ));
                }
            }
        }
    }

    demote_cycle_edges(&mut graph, &mut warnings);
    graph.sync_record_dependencies();

    let stats = graph.stats();
    info!(
        "built graph: {} assets, {} hard edges, {} soft edges",
        stats.assets, stats.hard_edges, stats.soft_edges
    );
    GraphBuild { graph, warnings }
}

/// Demotes every hard edge that closes a cycle.
///
/// A depth-first search over the hard subgraph, started from each asset in
/// id order, classifies edges; removing all back edges leaves a graph with
/// no directed cycle, and each back edge closes exactly the cycle formed with
/// the current search path.
fn demote_cycle_edges(graph: &mut DependencyGraph, warnings: &mut Vec<Warning>) {
    let back_edges: Vec<EdgeIndex> = {
        let hard = EdgeFiltered::from_fn(&graph.graph, |e| *e.weight() == EdgeKind::Hard);
        let starts: Vec<NodeIndex> = graph.index.values().copied().collect();
        let mut found = Vec::new();
        depth_first_search(&hard, starts, |event| {
            if let DfsEvent::BackEdge(u, v) = event {
                found.push((u, v));
            }
        });
        found
            .into_iter()
            .filter_map(|(u, v)| {
                graph
                    .graph
                    .edges_connecting(u, v)
                    .find(|e| *e.weight() == EdgeKind::Hard)
                    .map(|e| e.id())
            })
            .collect()
    };

    let mut demoted = Vec::with_capacity(back_edges.len());
    for edge in back_edges {
        let Some((u, v)) = graph.graph.edge_endpoints(edge) else {
            continue;
        };
        graph.graph[edge] = EdgeKind::Soft;
        let from = graph.graph[u].id.clone();
        let to = graph.graph[v].id.clone();
        warn!("hard dependency cycle: demoted {from} -> {to} to soft");
        warnings.push(Warning::new(
            WarningCode::CycleDemoted,
            from.as_str(),
            format!("hard dependency on {to} closes a cycle; demoted to soft"),
        ));
        demoted.push(DependencyEdge {
            from,
            to,
            kind: EdgeKind::Soft,
        });
    }
    demoted.sort();
    graph.demoted = demoted;
}

#[cfg(test)]
mod tests {
    use super::*;
    use uefast_common::{AssetKind, ContentHash};

    fn record(id: &str, hard: &[&str], soft: &[&str]) -> AssetRecord {
        AssetRecord {
            id: AssetId::new(id),
            path: format!("Content/{id}.uasset"),
            kind: AssetKind::Package,
            content_hash: ContentHash::from_bytes(id.as_bytes()),
            size_bytes: 100,
            hard_deps: hard.iter().map(|d| AssetId::new(*d)).collect(),
            soft_deps: soft.iter().map(|d| AssetId::new(*d)).collect(),
            startup_critical: false,
        }
    }

    fn edge(from: &str, to: &str, kind: EdgeKind) -> DependencyEdge {
        DependencyEdge {
            from: AssetId::new(from),
            to: AssetId::new(to),
            kind,
        }
    }

    #[test]
    fn acyclic_input_is_untouched() {
        let build = build_graph(vec![
            record("/Game/B", &["/Game/A"], &[]),
            record("/Game/A", &[], &[]),
            record("/Game/C", &["/Game/A", "/Game/B"], &[]),
        ]);
        assert!(build.warnings.is_empty());
        assert!(build.graph.demoted_edges().is_empty());
        assert_eq!(build.graph.stats().hard_edges, 3);
        assert!(build.graph.is_acyclic());
    }

    #[test]
    fn three_cycle_demotes_exactly_one_edge() {
        let build = build_graph(vec![
            record("/Game/A", &["/Game/B"], &[]),
            record("/Game/B", &["/Game/C"], &[]),
            record("/Game/C", &["/Game/A"], &[]),
        ]);
        let graph = &build.graph;

        assert_eq!(graph.len(), 3);
        assert!(graph.is_acyclic());
        assert_eq!(graph.demoted_edges(), &[edge("/Game/C", "/Game/A", EdgeKind::Soft)]);
        assert_eq!(graph.stats().hard_edges, 2);
        assert_eq!(graph.stats().soft_edges, 1);
        assert_eq!(build.warnings.len(), 1);
        assert_eq!(build.warnings[0].code, WarningCode::CycleDemoted);
    }

    #[test]
    fn independent_cycles_each_demote_one_edge() {
        let build = build_graph(vec![
            record("/Game/A", &["/Game/B"], &[]),
            record("/Game/B", &["/Game/A"], &[]),
            record("/Game/X", &["/Game/Y"], &[]),
            record("/Game/Y", &["/Game/X"], &[]),
        ]);
        assert!(build.graph.is_acyclic());
        assert_eq!(build.graph.demoted_edges().len(), 2);
    }

    #[test]
    fn soft_cycles_are_allowed() {
        let build = build_graph(vec![
            record("/Game/A", &["/Game/B"], &[]),
            record("/Game/B", &[], &["/Game/A"]),
        ]);
        assert!(build.warnings.is_empty());
        assert!(build.graph.is_acyclic());
    }

    #[test]
    fn hard_wins_over_soft() {
        let build = build_graph(vec![
            record("/Game/A", &["/Game/B"], &["/Game/B"]),
            record("/Game/B", &[], &[]),
        ]);
        assert_eq!(build.graph.edges(), vec![edge("/Game/A", "/Game/B", EdgeKind::Hard)]);
    }

    #[test]
    fn dangling_references_warn() {
        let build = build_graph(vec![record("/Game/A", &["/Game/Missing"], &["/Game/Gone"])]);
        assert!(build.graph.edges().is_empty());
        assert_eq!(build.warnings.len(), 2);
        assert!(build
            .warnings
            .iter()
            .all(|w| w.code == WarningCode::DanglingReference));
    }

    #[test]
    fn self_references_are_dropped() {
        let build = build_graph(vec![record("/Game/A", &["/Game/A"], &[])]);
        assert!(build.graph.edges().is_empty());
        assert!(build.warnings.is_empty());
    }

    #[test]
    fn build_is_deterministic() {
        let records = vec![
            record("/Game/A", &["/Game/B"], &[]),
            record("/Game/B", &["/Game/C"], &[]),
            record("/Game/C", &["/Game/A"], &["/Game/B"]),
        ];
        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(build_graph(records).graph, build_graph(reversed).graph);
    }

    #[test]
    fn records_follow_demoted_and_dropped_edges() {
        let build = build_graph(vec![
            record("/Game/A", &["/Game/B"], &[]),
            record("/Game/B", &["/Game/C"], &[]),
            record("/Game/C", &["/Game/A", "/Game/Gone"], &[]),
        ]);
        let graph = &build.graph;
        assert_eq!(graph.demoted_edges(), &[edge("/Game/C", "/Game/A", EdgeKind::Soft)]);

        let c = graph.get(&AssetId::new("/Game/C")).unwrap();
        assert!(c.hard_deps.is_empty());
        assert_eq!(c.soft_deps, vec![AssetId::new("/Game/A")]);
        for record in graph.records() {
            let hard: Vec<&AssetId> = record.hard_deps.iter().collect();
            assert_eq!(hard, graph.hard_dependencies(&record.id));
        }
    }

    #[test]
    fn rebuilt_graph_round_trips_through_parts() {
        let build = build_graph(vec![
            record("/Game/A", &["/Game/B"], &[]),
            record("/Game/B", &["/Game/A"], &[]),
        ]);
        let graph = build.graph;
        let again = DependencyGraph::from_parts(
            graph.records().cloned().collect(),
            graph.edges(),
            graph.demoted_edges().to_vec(),
        )
        .unwrap();
        assert_eq!(graph, again);
    }
}

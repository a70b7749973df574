//! Topological layering of the hard-dependency graph.

use std::collections::{BTreeMap, BTreeSet};

use uefast_common::AssetId;
use uefast_graph::DependencyGraph;

use crate::error::PlanError;

/// Splits the graph into topological layers with Kahn's algorithm.
///
/// Layer 0 holds assets without hard dependencies; layer `k` holds assets
/// whose hard dependencies are all in layers before `k`, at least one of
/// them in layer `k - 1`. Each layer is sorted by asset id.
pub fn layers(graph: &DependencyGraph) -> Result<Vec<Vec<AssetId>>, PlanError> {
    let mut pending: BTreeMap<&AssetId, usize> = graph
        .ids()
        .map(|id| (id, graph.hard_dependencies(id).len()))
        .collect();

    let mut current: BTreeSet<&AssetId> = pending
        .iter()
        .filter(|(_, &deps)| deps == 0)
        .map(|(&id, _)| id)
        .collect();
    let mut result = Vec::new();
    let mut layered = 0;

    while !current.is_empty() {
        let mut next = BTreeSet::new();
        for &id in &current {
            for dependent in graph.hard_dependents(id) {
                if let Some(deps) = pending.get_mut(dependent) {
                    *deps -= 1;
                    if *deps == 0 {
                        next.insert(dependent);
                    }
                }
            }
        }
        layered += current.len();
        result.push(current.into_iter().cloned().collect());
        current = next;
    }

    if layered != graph.len() {
        return Err(PlanError::Cycle {
            remaining: graph.len() - layered,
        });
    }
    Ok(result)
}

/// A plain topological order: the layers concatenated.
///
/// Every asset comes after all of its hard dependencies; ties are broken by
/// asset id within a layer.
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<AssetId>, PlanError> {
    Ok(layers(graph)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uefast_common::{AssetKind, AssetRecord, ContentHash};
    use uefast_graph::build_graph;

    fn record(id: &str, hard: &[&str]) -> AssetRecord {
        AssetRecord {
            id: AssetId::new(id),
            path: format!("Content/{id}.uasset"),
            kind: AssetKind::Package,
            content_hash: ContentHash::from_bytes(id.as_bytes()),
            size_bytes: 100,
            hard_deps: hard.iter().map(|d| AssetId::new(*d)).collect(),
            soft_deps: Vec::new(),
            startup_critical: false,
        }
    }

    fn ids(layer: &[AssetId]) -> Vec<&str> {
        layer.iter().map(AssetId::as_str).collect()
    }

    #[test]
    fn layers_follow_longest_dependency_chain() {
        let graph = build_graph(vec![
            record("A", &[]),
            record("B", &["A"]),
            record("C", &["A", "B"]),
            record("D", &[]),
            record("E", &["D"]),
        ])
        .graph;
        let layers = layers(&graph).unwrap();
        assert_eq!(layers.len(), 3);
        assert_eq!(ids(&layers[0]), vec!["A", "D"]);
        assert_eq!(ids(&layers[1]), vec!["B", "E"]);
        assert_eq!(ids(&layers[2]), vec!["C"]);
    }

    #[test]
    fn empty_graph_has_no_layers() {
        let graph = build_graph(Vec::new()).graph;
        assert!(layers(&graph).unwrap().is_empty());
    }

    #[test]
    fn topological_order_respects_dependencies() {
        let graph = build_graph(vec![
            record("Z", &[]),
            record("Y", &["Z"]),
            record("X", &["Y"]),
        ])
        .graph;
        let order = topological_order(&graph).unwrap();
        assert_eq!(ids(&order), vec!["Z", "Y", "X"]);
    }

    #[test]
    fn demoted_cycle_still_layers() {
        let graph = build_graph(vec![record("A", &["B"]), record("B", &["A"])]).graph;
        assert_eq!(topological_order(&graph).unwrap().len(), 2);
    }
}

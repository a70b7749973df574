//! The dependency graph type.

use std::collections::BTreeMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeFiltered, EdgeRef};
use petgraph::Direction;
use uefast_common::{AssetId, AssetRecord, DependencyEdge, EdgeKind};

use crate::error::GraphError;

/// Assets and their tagged dependency edges.
///
/// An edge `from -> to` means `from` references `to`. Nodes are stored in
/// asset id order and edges in `(from, to)` order, so iteration is
/// deterministic. The hard-edge subgraph is always acyclic.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub(crate) graph: DiGraph<AssetRecord, EdgeKind>,
    pub(crate) index: BTreeMap<AssetId, NodeIndex>,
    pub(crate) demoted: Vec<DependencyEdge>,
}

/// Summary counts over a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Number of assets.
    pub assets: usize,
    /// Number of hard edges.
    pub hard_edges: usize,
    /// Number of soft edges, including demoted ones.
    pub soft_edges: usize,
    /// Number of startup-critical assets.
    pub startup_assets: usize,
    /// Combined size of all assets.
    pub total_size_bytes: u64,
    /// Combined size of startup-critical assets.
    pub startup_size_bytes: u64,
    /// Number of hard edges demoted to break cycles.
    pub demoted_edges: usize,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: BTreeMap::new(),
            demoted: Vec::new(),
        }
    }

    /// Reassembles a graph from records, edges and demoted edges.
    ///
    /// Used when decoding a cache. Everything [`build_graph`](crate::build_graph)
    /// guarantees is checked: unique ids, edges between known assets, no self
    /// or duplicate edges, an acyclic hard subgraph, demoted edges present
    /// as soft edges, and record dependency lists that match the edges.
    pub fn from_parts(
        mut records: Vec<AssetRecord>,
        mut edges: Vec<DependencyEdge>,
        demoted: Vec<DependencyEdge>,
    ) -> Result<Self, GraphError> {
        records.sort_by(|a, b| a.id.cmp(&b.id));
        edges.sort();

        let mut graph = Self::new();
        for record in records {
            if graph.index.contains_key(&record.id) {
                return Err(GraphError::DuplicateAsset { id: record.id });
            }
            graph.add_record(record);
        }

        let mut previous: Option<(&AssetId, &AssetId)> = None;
        for edge in &edges {
            if edge.from == edge.to {
                return Err(GraphError::SelfEdge {
                    id: edge.from.clone(),
                });
            }
            if previous == Some((&edge.from, &edge.to)) {
                return Err(GraphError::DuplicateEdge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }
            previous = Some((&edge.from, &edge.to));
            let from = graph.node(&edge.from)?;
            let to = graph.node(&edge.to)?;
            graph.graph.add_edge(from, to, edge.kind);
        }

        for edge in &demoted {
            let present = edges
                .binary_search_by(|e| (&e.from, &e.to).cmp(&(&edge.from, &edge.to)))
                .is_ok_and(|i| edges[i].kind == EdgeKind::Soft);
            if !present || edge.kind != EdgeKind::Soft {
                return Err(GraphError::UnknownDemotedEdge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }
        }
        graph.demoted = demoted;

        if !graph.is_acyclic() {
            return Err(GraphError::Cycle);
        }

        for &node in graph.index.values() {
            let (hard, soft) = graph.edge_dependencies(node);
            let record = &graph.graph[node];
            if record.hard_deps != hard || record.soft_deps != soft {
                return Err(GraphError::DependencyMismatch {
                    id: record.id.clone(),
                });
            }
        }
        Ok(graph)
    }

    /// Hard and soft targets of a node's outgoing edges, each sorted.
    fn edge_dependencies(&self, node: NodeIndex) -> (Vec<AssetId>, Vec<AssetId>) {
        let mut hard = Vec::new();
        let mut soft = Vec::new();
        for edge in self.graph.edges_directed(node, Direction::Outgoing) {
            let to = self.graph[edge.target()].id.clone();
            match edge.weight() {
                EdgeKind::Hard => hard.push(to),
                EdgeKind::Soft => soft.push(to),
            }
        }
        hard.sort();
        soft.sort();
        (hard, soft)
    }

    /// Rewrites every record's dependency lists from the graph's edges.
    pub(crate) fn sync_record_dependencies(&mut self) {
        let nodes: Vec<NodeIndex> = self.index.values().copied().collect();
        for node in nodes {
            let (hard, soft) = self.edge_dependencies(node);
            let record = &mut self.graph[node];
            record.hard_deps = hard;
            record.soft_deps = soft;
        }
    }

    pub(crate) fn add_record(&mut self, record: AssetRecord) -> NodeIndex {
        let id = record.id.clone();
        let node = self.graph.add_node(record);
        self.index.insert(id, node);
        node
    }

    fn node(&self, id: &AssetId) -> Result<NodeIndex, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownAsset { id: id.clone() })
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph holds no assets.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns `true` if the asset is in the graph.
    pub fn contains(&self, id: &AssetId) -> bool {
        self.index.contains_key(id)
    }

    /// Looks up an asset record.
    pub fn get(&self, id: &AssetId) -> Option<&AssetRecord> {
        self.index.get(id).map(|&n| &self.graph[n])
    }

    /// All records in asset id order.
    pub fn records(&self) -> impl Iterator<Item = &AssetRecord> + '_ {
        self.index.values().map(|&n| &self.graph[n])
    }

    /// All asset ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &AssetId> + '_ {
        self.index.keys()
    }

    /// All edges, sorted by `(from, to)`.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self
            .graph
            .edge_references()
            .map(|e| DependencyEdge {
                from: self.graph[e.source()].id.clone(),
                to: self.graph[e.target()].id.clone(),
                kind: *e.weight(),
            })
            .collect();
        edges.sort();
        edges
    }

    /// Hard edges that were demoted to soft to break cycles.
    pub fn demoted_edges(&self) -> &[DependencyEdge] {
        &self.demoted
    }

    /// The assets `id` hard-depends on, sorted.
    pub fn hard_dependencies(&self, id: &AssetId) -> Vec<&AssetId> {
        self.hard_neighbors(id, Direction::Outgoing)
    }

    /// The assets that hard-depend on `id`, sorted.
    pub fn hard_dependents(&self, id: &AssetId) -> Vec<&AssetId> {
        self.hard_neighbors(id, Direction::Incoming)
    }

    fn hard_neighbors(&self, id: &AssetId, direction: Direction) -> Vec<&AssetId> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<&AssetId> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| *e.weight() == EdgeKind::Hard)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                &self.graph[other].id
            })
            .collect();
        ids.sort();
        ids
    }

    /// Returns `true` if the hard-edge subgraph has no cycle.
    pub fn is_acyclic(&self) -> bool {
        let hard = EdgeFiltered::from_fn(&self.graph, |e| *e.weight() == EdgeKind::Hard);
        !is_cyclic_directed(&hard)
    }

    /// The subgraph of startup-critical assets and the edges between them.
    pub fn startup_subgraph(&self) -> DependencyGraph {
        let mut sub = DependencyGraph::new();
        for record in self.records().filter(|r| r.startup_critical) {
            sub.add_record(record.clone());
        }
        for edge in self.edges() {
            if let (Some(&from), Some(&to)) = (sub.index.get(&edge.from), sub.index.get(&edge.to))
            {
                sub.graph.add_edge(from, to, edge.kind);
            }
        }
        sub.demoted = self
            .demoted
            .iter()
            .filter(|e| sub.contains(&e.from) && sub.contains(&e.to))
            .cloned()
            .collect();
        sub.sync_record_dependencies();
        sub
    }

    /// Summary counts.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            assets: self.len(),
            demoted_edges: self.demoted.len(),
            ..GraphStats::default()
        };
        for record in self.records() {
            stats.total_size_bytes += record.size_bytes;
            if record.startup_critical {
                stats.startup_assets += 1;
                stats.startup_size_bytes += record.size_bytes;
            }
        }
        for kind in self.graph.edge_weights() {
            match kind {
                EdgeKind::Hard => stats.hard_edges += 1,
                EdgeKind::Soft => stats.soft_edges += 1,
            }
        }
        stats
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.records().eq(other.records())
            && self.edges() == other.edges()
            && self.demoted == other.demoted
    }
}

impl Eq for DependencyGraph {}

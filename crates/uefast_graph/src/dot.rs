//! Graphviz DOT rendering.

use std::fmt::Write;

use uefast_common::EdgeKind;

use crate::graph::DependencyGraph;

impl DependencyGraph {
    /// Renders the graph in Graphviz DOT format.
    ///
    /// Startup-critical assets are filled, soft edges are dashed, and edges
    /// demoted to break a cycle are drawn red.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph dependencies {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, fontname=\"Helvetica\"];\n");

        for record in self.records() {
            let _ = write!(out, "    {}", quote(record.id.as_str()));
            if record.startup_critical {
                out.push_str(" [style=filled, fillcolor=lightblue]");
            }
            out.push_str(";\n");
        }

        for edge in self.edges() {
            let _ = write!(out, "    {} -> {}", quote(edge.from.as_str()), quote(edge.to.as_str()));
            let demoted = self
                .demoted_edges()
                .iter()
                .any(|d| d.from == edge.from && d.to == edge.to);
            match (edge.kind, demoted) {
                (EdgeKind::Hard, _) => {}
                (EdgeKind::Soft, false) => out.push_str(" [style=dashed]"),
                (EdgeKind::Soft, true) => out.push_str(" [style=dashed, color=red]"),
            }
            out.push_str(";\n");
        }

        out.push_str("}\n");
        out
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use uefast_common::{AssetId, AssetKind, AssetRecord, ContentHash};

    use crate::build_graph;

    fn record(id: &str, hard: &[&str], soft: &[&str], critical: bool) -> AssetRecord {
        AssetRecord {
            id: AssetId::new(id),
            path: format!("Content/{id}.uasset"),
            kind: AssetKind::Package,
            content_hash: ContentHash::from_bytes(id.as_bytes()),
            size_bytes: 1,
            hard_deps: hard.iter().map(|d| AssetId::new(*d)).collect(),
            soft_deps: soft.iter().map(|d| AssetId::new(*d)).collect(),
            startup_critical: critical,
        }
    }

    #[test]
    fn renders_nodes_and_edge_styles() {
        let graph = build_graph(vec![
            record("/Game/A", &[], &[], true),
            record("/Game/B", &["/Game/A"], &[], false),
            record("/Game/C", &[], &["/Game/A"], false),
        ])
        .graph;
        let dot = graph.to_dot();

        assert!(dot.starts_with("digraph dependencies {"));
        assert!(dot.contains("\"/Game/A\" [style=filled, fillcolor=lightblue];"));
        assert!(dot.contains("\"/Game/B\" -> \"/Game/A\";"));
        assert!(dot.contains("\"/Game/C\" -> \"/Game/A\" [style=dashed];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn demoted_edges_are_red() {
        let graph = build_graph(vec![
            record("/Game/A", &["/Game/B"], &[], false),
            record("/Game/B", &["/Game/A"], &[], false),
        ])
        .graph;
        assert!(graph
            .to_dot()
            .contains("\"/Game/B\" -> \"/Game/A\" [style=dashed, color=red];"));
    }
}

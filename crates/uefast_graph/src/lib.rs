//! Dependency graph construction for collected assets.
//!
//! [`build_graph`] turns collected [`AssetRecord`](uefast_common::AssetRecord)s
//! into a [`DependencyGraph`] whose hard-edge subgraph is acyclic: every hard
//! edge that closes a cycle is demoted to soft and reported. The graph can be
//! reassembled from decoded cache parts with [`DependencyGraph::from_parts`],
//! rendered as Graphviz DOT, and restricted to startup-critical assets.

#![warn(missing_docs)]

pub mod builder;
pub mod dot;
pub mod error;
pub mod graph;

pub use builder::{build_graph, GraphBuild};
pub use error::GraphError;
pub use graph::{DependencyGraph, GraphStats};

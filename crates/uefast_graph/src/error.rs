//! Error types for reassembling a graph from decoded parts.

use uefast_common::AssetId;

/// Structural problems found when reassembling a [`DependencyGraph`](crate::DependencyGraph).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Two records share an asset id.
    #[error("duplicate asset {id}")]
    DuplicateAsset {
        /// The repeated id.
        id: AssetId,
    },

    /// An edge names an asset that has no record.
    #[error("edge references unknown asset {id}")]
    UnknownAsset {
        /// The unknown id.
        id: AssetId,
    },

    /// An asset depends on itself.
    #[error("self edge on {id}")]
    SelfEdge {
        /// The asset.
        id: AssetId,
    },

    /// Two edges connect the same pair of assets.
    #[error("duplicate edge {from} -> {to}")]
    DuplicateEdge {
        /// The referring asset.
        from: AssetId,
        /// The referenced asset.
        to: AssetId,
    },

    /// A demoted edge is not present as a soft edge.
    #[error("demoted edge {from} -> {to} is not a soft edge of the graph")]
    UnknownDemotedEdge {
        /// The referring asset.
        from: AssetId,
        /// The referenced asset.
        to: AssetId,
    },

    /// A record's dependency lists disagree with its outgoing edges.
    #[error("dependencies recorded for {id} do not match its edges")]
    DependencyMismatch {
        /// The asset.
        id: AssetId,
    },

    /// The hard-edge subgraph contains a cycle.
    #[error("hard dependencies form a cycle")]
    Cycle,
}

//! Error types for load planning.

use uefast_common::AssetId;

/// Errors from layering a graph or checking a decoded load plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Some assets could not be layered because their hard dependencies
    /// form a cycle.
    #[error("hard dependency cycle through {remaining} assets")]
    Cycle {
        /// Number of assets left unlayered.
        remaining: usize,
    },

    /// A batch names an asset that is not in the graph.
    #[error("load plan references unknown asset {id}")]
    UnknownAsset {
        /// The unknown id.
        id: AssetId,
    },

    /// An asset appears in more than one batch.
    #[error("asset {id} is planned more than once")]
    DuplicateAsset {
        /// The repeated id.
        id: AssetId,
    },

    /// An asset of the graph is not in any batch.
    #[error("asset {id} is missing from the load plan")]
    MissingAsset {
        /// The missing id.
        id: AssetId,
    },

    /// A hard dependency is not loaded in an earlier batch than its referrer.
    #[error("{from} is planned in batch {from_batch} but its dependency {to} in batch {to_batch}")]
    OrderViolation {
        /// The referring asset.
        from: AssetId,
        /// Batch of the referring asset.
        from_batch: usize,
        /// The dependency.
        to: AssetId,
        /// Batch of the dependency.
        to_batch: usize,
    },

    /// Batch indices or layers are out of sequence.
    #[error("batch {index} is out of sequence: {reason}")]
    BatchSequence {
        /// Position of the batch in the plan.
        index: usize,
        /// What is wrong.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_violation_display() {
        let err = PlanError::OrderViolation {
            from: AssetId::new("/Game/B"),
            from_batch: 0,
            to: AssetId::new("/Game/A"),
            to_batch: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("/Game/B is planned in batch 0"));
        assert!(msg.contains("/Game/A in batch 1"));
    }
}

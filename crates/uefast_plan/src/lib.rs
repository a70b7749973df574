//! Load-order optimization.
//!
//! The hard-dependency graph is split into topological layers with Kahn's
//! algorithm, and each layer is packed into at most `P` parallel batches with
//! the longest-processing-time-first heuristic. Per-asset cost comes from an
//! [`AssetCost`] implementation, normally the configured [`CostModel`].

#![warn(missing_docs)]

pub mod cost;
pub mod error;
pub mod layers;
pub mod plan;

pub use cost::{AssetCost, CostModel};
pub use error::PlanError;
pub use layers::{layers, topological_order};
pub use plan::{optimize, LoadBatch, LoadPlan};

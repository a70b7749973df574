//! Load plans and the batch packing optimizer.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uefast_common::AssetId;
use uefast_graph::DependencyGraph;

use crate::cost::AssetCost;
use crate::error::PlanError;
use crate::layers::layers;

/// A set of assets loaded in parallel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBatch {
    /// Position of the batch in the plan.
    pub index: usize,
    /// Topological layer the batch belongs to.
    pub layer: usize,
    /// Assets in the batch, sorted by id.
    pub assets: Vec<AssetId>,
    /// Largest per-asset cost in the batch, in microseconds.
    pub estimated_us: u64,
}

/// An ordered sequence of load batches.
///
/// For every hard edge `A -> B`, B's batch index is strictly less than A's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadPlan {
    /// Worker count the plan was packed for.
    pub parallelism: usize,
    /// Batches in load order.
    pub batches: Vec<LoadBatch>,
    /// Sum over layers of the largest per-asset cost in the layer.
    pub estimated_total_us: u64,
    /// Sum of all per-asset costs, as if loaded one after another.
    pub serial_baseline_us: u64,
}

impl LoadPlan {
    /// Estimated time saved against serial loading.
    pub fn savings_us(&self) -> u64 {
        self.serial_baseline_us.saturating_sub(self.estimated_total_us)
    }

    /// Number of topological layers.
    pub fn layer_count(&self) -> usize {
        self.batches.last().map_or(0, |b| b.layer + 1)
    }

    /// Number of planned assets.
    pub fn asset_count(&self) -> usize {
        self.batches.iter().map(|b| b.assets.len()).sum()
    }

    /// All assets in batch order.
    pub fn load_order(&self) -> impl Iterator<Item = &AssetId> + '_ {
        self.batches.iter().flat_map(|b| b.assets.iter())
    }

    /// Index of the batch holding `id`.
    pub fn batch_of(&self, id: &AssetId) -> Option<usize> {
        self.batches
            .iter()
            .find(|b| b.assets.binary_search(id).is_ok())
            .map(|b| b.index)
    }

    /// Checks the plan against a graph.
    ///
    /// Every asset must be planned exactly once, batch indices must count up
    /// from zero with non-decreasing layers, and every hard dependency must
    /// sit in an earlier batch than its referrer.
    pub fn check(&self, graph: &DependencyGraph) -> Result<(), PlanError> {
        let mut batch_of: BTreeMap<&AssetId, usize> = BTreeMap::new();
        let mut previous_layer = 0;
        for (position, batch) in self.batches.iter().enumerate() {
            if batch.index != position {
                return Err(PlanError::BatchSequence {
                    index: position,
                    reason: format!("recorded index is {}", batch.index),
                });
            }
            if batch.layer < previous_layer || batch.layer > previous_layer + 1 {
                return Err(PlanError::BatchSequence {
                    index: position,
                    reason: format!("layer {} follows layer {previous_layer}", batch.layer),
                });
            }
            if position == 0 && batch.layer != 0 {
                return Err(PlanError::BatchSequence {
                    index: position,
                    reason: "first batch is not in layer 0".to_string(),
                });
            }
            if batch.assets.is_empty() {
                return Err(PlanError::BatchSequence {
                    index: position,
                    reason: "batch is empty".to_string(),
                });
            }
            previous_layer = batch.layer;
            for id in &batch.assets {
                if !graph.contains(id) {
                    return Err(PlanError::UnknownAsset { id: id.clone() });
                }
                if batch_of.insert(id, position).is_some() {
                    return Err(PlanError::DuplicateAsset { id: id.clone() });
                }
            }
        }

        for id in graph.ids() {
            let Some(&from_batch) = batch_of.get(id) else {
                return Err(PlanError::MissingAsset { id: id.clone() });
            };
            for dep in graph.hard_dependencies(id) {
                let Some(&to_batch) = batch_of.get(dep) else {
                    return Err(PlanError::MissingAsset { id: dep.clone() });
                };
                if to_batch >= from_batch {
                    return Err(PlanError::OrderViolation {
                        from: id.clone(),
                        from_batch,
                        to: dep.clone(),
                        to_batch,
                    });
                }
            }
        }
        Ok(())
    }
}

/// One bin during longest-processing-time packing.
#[derive(Default)]
struct Bin {
    load: u64,
    max: u64,
    assets: Vec<AssetId>,
}

/// Computes a load plan for the graph.
///
/// Each topological layer is packed into `min(parallelism, layer size)`
/// batches: assets are taken in order of decreasing cost (ties by ascending
/// id) and each goes to the batch with the smallest summed cost so far,
/// preferring emptier and then lower-indexed batches.
pub fn optimize(
    graph: &DependencyGraph,
    cost: &impl AssetCost,
    parallelism: NonZeroUsize,
) -> Result<LoadPlan, PlanError> {
    let layers = layers(graph)?;
    let mut plan = LoadPlan {
        parallelism: parallelism.get(),
        ..LoadPlan::default()
    };

    for (layer_index, layer) in layers.into_iter().enumerate() {
        let mut items: Vec<(u64, AssetId)> = layer
            .into_iter()
            .map(|id| {
                let c = graph.get(&id).map_or(0, |r| cost.cost_us(r));
                (c, id)
            })
            .collect();
        items.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let mut bins: Vec<Bin> = (0..parallelism.get().min(items.len()))
            .map(|_| Bin::default())
            .collect();
        let mut layer_max = 0;
        for (c, id) in items {
            plan.serial_baseline_us = plan.serial_baseline_us.saturating_add(c);
            layer_max = layer_max.max(c);
            let target = bins
                .iter_mut()
                .enumerate()
                .min_by_key(|(i, bin)| (bin.load, bin.assets.len(), *i))
                .map(|(_, bin)| bin);
            if let Some(bin) = target {
                bin.load = bin.load.saturating_add(c);
                bin.max = bin.max.max(c);
                bin.assets.push(id);
            }
        }

        for mut bin in bins {
            bin.assets.sort();
            plan.batches.push(LoadBatch {
                index: plan.batches.len(),
                layer: layer_index,
                assets: bin.assets,
                estimated_us: bin.max,
            });
        }
        plan.estimated_total_us = plan.estimated_total_us.saturating_add(layer_max);
        debug!("layer {layer_index}: critical cost {layer_max}us");
    }

    info!(
        "planned {} batches over {} layers: {}us estimated, {}us serial",
        plan.batches.len(),
        plan.layer_count(),
        plan.estimated_total_us,
        plan.serial_baseline_us
    );
    Ok(plan)
}

//! Per-asset load cost estimation.

use uefast_common::AssetRecord;
use uefast_config::CostConfig;

/// Estimates how long an asset takes to load, in microseconds.
pub trait AssetCost {
    /// The estimated load cost of `record`.
    fn cost_us(&self, record: &AssetRecord) -> u64;
}

impl<F> AssetCost for F
where
    F: Fn(&AssetRecord) -> u64,
{
    fn cost_us(&self, record: &AssetRecord) -> u64 {
        self(record)
    }
}

/// Fixed per-asset overhead plus a size-proportional read time.
///
/// `cost = overhead_us + size_bytes * 1000 / bytes_per_ms`, in whole
/// microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    /// Fixed cost per asset.
    pub overhead_us: u64,
    /// Read throughput in bytes per millisecond; at least 1.
    pub bytes_per_ms: u64,
}

impl CostModel {
    /// Creates a model. A zero throughput is treated as 1.
    pub fn new(overhead_us: u64, bytes_per_ms: u64) -> Self {
        Self {
            overhead_us,
            bytes_per_ms: bytes_per_ms.max(1),
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        CostConfig::default().into()
    }
}

impl From<CostConfig> for CostModel {
    fn from(config: CostConfig) -> Self {
        Self::new(config.overhead_us, config.bytes_per_ms)
    }
}

impl AssetCost for CostModel {
    fn cost_us(&self, record: &AssetRecord) -> u64 {
        let read_us = u128::from(record.size_bytes) * 1000 / u128::from(self.bytes_per_ms.max(1));
        self.overhead_us
            .saturating_add(u64::try_from(read_us).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uefast_common::{AssetId, AssetKind, ContentHash};

    fn sized(size_bytes: u64) -> AssetRecord {
        AssetRecord {
            id: AssetId::new("/Game/A"),
            path: "Content/A.uasset".to_string(),
            kind: AssetKind::Package,
            content_hash: ContentHash::from_bytes(b"a"),
            size_bytes,
            hard_deps: Vec::new(),
            soft_deps: Vec::new(),
            startup_critical: false,
        }
    }

    #[test]
    fn default_model() {
        let model = CostModel::default();
        assert_eq!(model.cost_us(&sized(0)), 500);
        // 1 MB at 100 kB/ms = 10 ms
        assert_eq!(model.cost_us(&sized(1_000_000)), 10_500);
    }

    #[test]
    fn rounds_down_to_whole_microseconds() {
        let model = CostModel::new(0, 3);
        assert_eq!(model.cost_us(&sized(1)), 333);
    }

    #[test]
    fn huge_sizes_saturate() {
        let model = CostModel::new(10, 1);
        assert_eq!(model.cost_us(&sized(u64::MAX)), u64::MAX);
    }

    #[test]
    fn zero_throughput_is_clamped() {
        assert_eq!(CostModel::new(0, 0).bytes_per_ms, 1);
    }

    #[test]
    fn closures_are_cost_functions() {
        let flat = |_: &AssetRecord| 42u64;
        assert_eq!(flat.cost_us(&sized(999)), 42);
    }
}

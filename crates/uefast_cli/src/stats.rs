//! `ue5-fast-startup stats` — summarize a cache file.

use uefast_cache::{CacheStats, StartupCache};

use crate::pipeline::format_us;
use crate::{GlobalArgs, StatsArgs};

/// Runs the `stats` command.
///
/// A cache that cannot be read or decoded is an error.
pub fn run(args: &StatsArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let data = std::fs::read(&args.cache)
        .map_err(|e| format!("cannot read {}: {e}", args.cache.display()))?;
    let cache = StartupCache::decode(&data)?;
    let stats = cache.stats(data.len() as u64);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", render(&stats));
    }
    Ok(0)
}

/// Renders the stats as aligned text.
pub fn render(stats: &CacheStats) -> String {
    let savings = stats.serial_baseline_us.saturating_sub(stats.estimated_total_us);
    let lines = [
        ("Format version", stats.format_version.to_string()),
        ("File size", format!("{} bytes", stats.file_bytes)),
        ("Assets", stats.assets.to_string()),
        ("Hashed assets", stats.hashed_assets.to_string()),
        ("Startup assets", stats.startup_assets.to_string()),
        ("Hard edges", stats.hard_edges.to_string()),
        ("Soft edges", stats.soft_edges.to_string()),
        ("Demoted edges", stats.demoted_edges.to_string()),
        ("Layers", stats.layers.to_string()),
        ("Batches", format!("{} (parallelism {})", stats.batches, stats.parallelism)),
        ("Estimated load", format_us(stats.estimated_total_us)),
        ("Serial load", format_us(stats.serial_baseline_us)),
        ("Savings", format_us(savings)),
    ];
    lines
        .iter()
        .map(|(label, value)| format!("{label:>16}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

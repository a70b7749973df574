//! Shared pipeline steps used by multiple commands.
//!
//! Configuration resolution, the collect → graph → plan build, output
//! writing, and time formatting.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use tracing::debug;
use uefast_collect::{Collection, Collector};
use uefast_common::{HashTable, Warning};
use uefast_config::ProjectConfig;
use uefast_graph::{build_graph, DependencyGraph};
use uefast_plan::{optimize, CostModel, LoadPlan};

use crate::{GlobalArgs, ScanOverrides};

/// Cache location the editor looks at, relative to the project root.
pub const DEFAULT_CACHE_PATH: &str = "Saved/FastStartup/startup.uefast";

/// Everything a build run produces.
pub struct BuildOutput {
    /// Dependency graph of the collected assets.
    pub graph: DependencyGraph,
    /// Load plan for the graph.
    pub plan: LoadPlan,
    /// Hash of every readable asset.
    pub hashes: HashTable,
    /// Warnings from every stage, in stage order.
    pub warnings: Vec<Warning>,
}

/// Loads the project configuration and applies command-line overrides.
///
/// `--config` replaces the project's `uefast.toml`; the merged result is
/// validated again.
pub fn resolve_config(
    project: &Path,
    global: &GlobalArgs,
    overrides: &ScanOverrides,
) -> Result<ProjectConfig, Box<dyn std::error::Error>> {
    let mut config = match &global.config {
        Some(path) => uefast_config::load_config_file(path)?,
        None => uefast_config::load_config(project)?,
    };

    if !overrides.include.is_empty() {
        config.scan.include = overrides.include.clone();
    }
    if !overrides.exclude.is_empty() {
        config.scan.exclude.extend(overrides.exclude.iter().cloned());
    }
    if let Some(workers) = overrides.workers {
        config.scan.workers = workers;
    }
    if let Some(parallelism) = overrides.parallelism {
        config.plan.parallelism = parallelism;
    }

    uefast_config::validate_config(&config)?;
    debug!("resolved configuration: {config:?}");
    Ok(config)
}

/// Returns the default cache path for a project.
pub fn default_cache_path(project: &Path) -> PathBuf {
    project.join(DEFAULT_CACHE_PATH)
}

/// Creates a collector for the project.
pub fn collector(
    project: &Path,
    config: &ProjectConfig,
) -> Result<Collector, Box<dyn std::error::Error>> {
    Ok(Collector::new(project, &config.scan, &config.startup)?)
}

/// Runs collection only.
pub fn collect(
    project: &Path,
    config: &ProjectConfig,
) -> Result<Collection, Box<dyn std::error::Error>> {
    Ok(collector(project, config)?.collect()?)
}

/// Runs the full build: collect, build the graph, and plan.
pub fn build(
    project: &Path,
    config: &ProjectConfig,
) -> Result<BuildOutput, Box<dyn std::error::Error>> {
    let collection = collect(project, config)?;
    let mut warnings = collection.warnings;

    let built = build_graph(collection.records);
    warnings.extend(built.warnings);

    let parallelism = NonZeroUsize::new(config.plan.parallelism)
        .ok_or("plan.parallelism must be at least 1")?;
    let plan = optimize(&built.graph, &CostModel::from(config.cost), parallelism)?;

    Ok(BuildOutput {
        graph: built.graph,
        plan,
        hashes: collection.hashes,
        warnings,
    })
}

/// Writes `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
            }
            std::fs::write(path, content)
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
        }
        None => println!("{content}"),
    }
    Ok(())
}

/// Converts microseconds to seconds.
pub fn seconds(us: u64) -> f64 {
    us as f64 / 1_000_000.0
}

/// Formats microseconds for humans, e.g. `1.234s` or `850.0ms`.
pub fn format_us(us: u64) -> String {
    if us >= 1_000_000 {
        format!("{:.3}s", seconds(us))
    } else {
        format!("{:.1}ms", us as f64 / 1000.0)
    }
}

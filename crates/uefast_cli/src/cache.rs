//! `ue5-fast-startup cache` — build and write the binary startup cache.

use tracing::info;
use uefast_cache::StartupCache;

use crate::pipeline::{build, collector, default_cache_path, format_us, resolve_config};
use crate::{CacheArgs, GlobalArgs};

/// Runs the `cache` command.
///
/// An existing cache that still validates against the project is kept unless
/// `--force` is given.
pub fn run(args: &CacheArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(&args.project, global, &args.overrides)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_cache_path(&args.project));

    if !args.force && output.exists() {
        let live = collector(&args.project, &config)?.hash_table()?;
        let verdict = uefast_cache::validate(&output, &live.hashes);
        if verdict.is_valid() {
            info!("{} is up to date", output.display());
            if !global.quiet {
                eprintln!("   Fresh {} ({})", output.display(), verdict.detail);
            }
            return Ok(0);
        }
        info!("rebuilding {}: {verdict}", output.display());
    }

    if !global.quiet {
        eprintln!("   Building startup cache for {}", args.project.display());
    }

    let built = build(&args.project, &config)?;
    let cache = StartupCache::new(built.graph, built.plan, built.hashes);
    let bytes = cache.write(&output)?;

    if !global.quiet {
        eprintln!(
            "   Wrote {} ({} assets, {} batches, {} bytes)",
            output.display(),
            cache.graph.len(),
            cache.plan.batches.len(),
            bytes
        );
        eprintln!(
            "   Estimated load: {} (serial {})",
            format_us(cache.plan.estimated_total_us),
            format_us(cache.plan.serial_baseline_us)
        );
        if !built.warnings.is_empty() {
            eprintln!("   {} warning(s)", built.warnings.len());
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{edit_asset, five_asset_project, quiet};
    use crate::ScanOverrides;
    use std::path::{Path, PathBuf};
    use uefast_cache::Reason;

    fn args(project: &Path, output: Option<PathBuf>, force: bool) -> CacheArgs {
        CacheArgs {
            project: project.to_path_buf(),
            output,
            force,
            overrides: ScanOverrides::default(),
        }
    }

    #[test]
    fn writes_to_default_location() {
        let project = five_asset_project();
        assert_eq!(run(&args(project.path(), None, false), &quiet()).unwrap(), 0);

        let path = default_cache_path(project.path());
        let cache = StartupCache::read(&path).unwrap();
        assert_eq!(cache.graph.len(), 5);
        assert_eq!(cache.hashes.len(), 5);
        assert_eq!(cache.plan.layer_count(), 3);
    }

    #[test]
    fn valid_cache_is_not_rewritten() {
        let project = five_asset_project();
        let output = project.path().join("startup.uefast");
        run(&args(project.path(), Some(output.clone()), false), &quiet()).unwrap();

        // Replace the file with a valid cache of different bytes; a skipped
        // rebuild leaves it untouched.
        let mut cache = StartupCache::read(&output).unwrap();
        cache.plan.parallelism += 1;
        let marker = cache.encode().unwrap();
        std::fs::write(&output, &marker).unwrap();

        run(&args(project.path(), Some(output.clone()), false), &quiet()).unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), marker);

        run(&args(project.path(), Some(output.clone()), true), &quiet()).unwrap();
        assert_ne!(std::fs::read(&output).unwrap(), marker);
    }

    #[test]
    fn stale_cache_is_rebuilt() {
        let project = five_asset_project();
        let output = project.path().join("startup.uefast");
        run(&args(project.path(), Some(output.clone()), false), &quiet()).unwrap();

        edit_asset(project.path(), "D");
        let live = collector(project.path(), &Default::default())
            .unwrap()
            .hash_table()
            .unwrap();
        assert_eq!(uefast_cache::validate(&output, &live.hashes).reason, Reason::Stale);

        run(&args(project.path(), Some(output.clone()), false), &quiet()).unwrap();
        assert!(uefast_cache::validate(&output, &live.hashes).is_valid());
    }

    #[test]
    fn corrupt_cache_is_rebuilt() {
        let project = five_asset_project();
        let output = project.path().join("startup.uefast");
        std::fs::write(&output, b"UEFAST01 but not really").unwrap();
        run(&args(project.path(), Some(output.clone()), false), &quiet()).unwrap();
        assert!(StartupCache::read(&output).is_ok());
    }
}

//! `ue5-fast-startup verify` — check a cache against the live project.

use crate::pipeline::{collector, default_cache_path, resolve_config};
use crate::{GlobalArgs, VerifyArgs};

/// Exit code for a cache that exists but cannot be used.
pub const EXIT_INVALID: i32 = 2;

/// Runs the `verify` command.
///
/// Returns 0 when the cache is valid and [`EXIT_INVALID`] otherwise. Only a
/// project that cannot be scanned is an error; cache problems are verdicts.
pub fn run(args: &VerifyArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(&args.project, global, &args.overrides)?;
    let cache_path = args
        .cache
        .clone()
        .unwrap_or_else(|| default_cache_path(&args.project));

    let live = collector(&args.project, &config)?.hash_table()?;
    let verdict = uefast_cache::validate(&cache_path, &live.hashes);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else if !global.quiet {
        eprintln!("   {}: {verdict}", cache_path.display());
        for id in &verdict.diff.changed {
            eprintln!("     changed  {id}");
        }
        for id in &verdict.diff.added {
            eprintln!("     added    {id}");
        }
        for id in &verdict.diff.removed {
            eprintln!("     removed  {id}");
        }
    }

    Ok(if verdict.is_valid() { 0 } else { EXIT_INVALID })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{edit_asset, five_asset_project, quiet};
    use crate::{CacheArgs, ScanOverrides};
    use std::path::Path;

    fn build_cache(project: &Path) {
        let args = CacheArgs {
            project: project.to_path_buf(),
            output: None,
            force: false,
            overrides: ScanOverrides::default(),
        };
        crate::cache::run(&args, &quiet()).unwrap();
    }

    fn verify(project: &Path) -> i32 {
        let args = VerifyArgs {
            project: project.to_path_buf(),
            cache: None,
            json: false,
            overrides: ScanOverrides::default(),
        };
        run(&args, &quiet()).unwrap()
    }

    #[test]
    fn fresh_cache_verifies() {
        let project = five_asset_project();
        build_cache(project.path());
        assert_eq!(verify(project.path()), 0);
    }

    #[test]
    fn missing_cache_is_invalid() {
        let project = five_asset_project();
        assert_eq!(verify(project.path()), EXIT_INVALID);
    }

    #[test]
    fn edited_asset_invalidates_cache() {
        let project = five_asset_project();
        build_cache(project.path());
        edit_asset(project.path(), "A");
        assert_eq!(verify(project.path()), EXIT_INVALID);
    }

    #[test]
    fn new_asset_invalidates_cache() {
        let project = five_asset_project();
        build_cache(project.path());
        std::fs::write(project.path().join("Content/F.uasset"), b"not parsed by verify").unwrap();
        assert_eq!(verify(project.path()), EXIT_INVALID);
    }

    #[test]
    fn corrupted_cache_is_invalid() {
        let project = five_asset_project();
        build_cache(project.path());
        let path = default_cache_path(project.path());
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();
        assert_eq!(verify(project.path()), EXIT_INVALID);
    }

    #[test]
    fn unreadable_project_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = VerifyArgs {
            project: dir.path().join("missing"),
            cache: None,
            json: true,
            overrides: ScanOverrides::default(),
        };
        assert!(run(&args, &quiet()).is_err());
    }
}

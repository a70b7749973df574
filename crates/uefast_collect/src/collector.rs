//! The collection pipeline: discover, read, hash, parse, mark.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use uefast_common::{AssetId, AssetRecord, ContentHash, HashTable, Warning, WarningCode};
use uefast_config::{ScanConfig, StartupConfig};

use crate::error::CollectError;
use crate::filter::AssetFilter;
use crate::hasher::{hash_asset, worker_pool};
use crate::package::PackageSummary;
use crate::startup::{mark_startup_critical, read_engine_ini_maps, resolve_roots};
use crate::walk::{discover_assets, DiscoveredAsset};

/// Result of a full collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// One record per readable, well-formed asset, sorted by id.
    pub records: Vec<AssetRecord>,
    /// Content hash of every readable asset, including malformed ones.
    pub hashes: HashTable,
    /// Startup roots that were resolved against the collected assets.
    pub roots: Vec<AssetId>,
    /// Problems that were recovered from.
    pub warnings: Vec<Warning>,
}

/// Result of a hash-only scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashScan {
    /// Content hash of every readable asset.
    pub hashes: HashTable,
    /// Problems that were recovered from.
    pub warnings: Vec<Warning>,
}

/// What one worker produced for one asset.
enum Outcome {
    Record(AssetRecord),
    Malformed(AssetId, ContentHash, Warning),
    Unreadable(Warning),
}

/// Collects asset metadata for one project.
#[derive(Debug, Clone)]
pub struct Collector {
    project_root: PathBuf,
    scan: ScanConfig,
    startup: StartupConfig,
    filter: AssetFilter,
}

impl Collector {
    /// Creates a collector. Fails only if a filter pattern is invalid.
    pub fn new(
        project_root: impl Into<PathBuf>,
        scan: &ScanConfig,
        startup: &StartupConfig,
    ) -> Result<Self, CollectError> {
        Ok(Self {
            project_root: project_root.into(),
            filter: AssetFilter::new(&scan.include, &scan.exclude)?,
            scan: scan.clone(),
            startup: startup.clone(),
        })
    }

    /// The project root this collector reads.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Runs the full collection: every discovered asset is read, hashed and
    /// parsed on the worker pool, then startup-critical assets are marked.
    pub fn collect(&self) -> Result<Collection, CollectError> {
        let mut warnings = Vec::new();
        let assets = discover_assets(&self.project_root, &self.scan, &self.filter, &mut warnings)?;
        info!("collecting {} assets", assets.len());

        let pool = worker_pool(self.scan.workers)?;
        let outcomes: Vec<Outcome> =
            pool.install(|| assets.par_iter().map(|a| self.process(a)).collect());

        // Workers own their outcomes; merging happens here, in id order.
        let mut records = Vec::with_capacity(outcomes.len());
        let mut hashes = HashTable::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Record(record) => {
                    hashes.insert(record.id.clone(), record.content_hash);
                    records.push(record);
                }
                Outcome::Malformed(id, hash, warning) => {
                    hashes.insert(id, hash);
                    warnings.push(warning);
                }
                Outcome::Unreadable(warning) => warnings.push(warning),
            }
        }

        let named = self.named_roots(&mut warnings);
        let roots = resolve_roots(&named, &records, &mut warnings);
        mark_startup_critical(&mut records, &roots);

        let critical = records.iter().filter(|r| r.startup_critical).count();
        info!(
            "collected {} assets ({} startup-critical, {} skipped)",
            records.len(),
            critical,
            assets.len() - records.len()
        );

        Ok(Collection {
            records,
            hashes,
            roots: roots.into_iter().collect(),
            warnings,
        })
    }

    /// Hashes every discovered asset without parsing it.
    ///
    /// Produces the same hash table as [`Collector::collect`] for the same
    /// project state; used to check a cache for staleness.
    pub fn hash_table(&self) -> Result<HashScan, CollectError> {
        let mut warnings = Vec::new();
        let assets = discover_assets(&self.project_root, &self.scan, &self.filter, &mut warnings)?;

        let pool = worker_pool(self.scan.workers)?;
        let results: Vec<Result<(AssetId, ContentHash), Warning>> = pool.install(|| {
            assets
                .par_iter()
                .map(|a| {
                    hash_asset(&a.path)
                        .map(|h| (a.id.clone(), h.content_hash))
                        .map_err(|e| unreadable(a, &e))
                })
                .collect()
        });

        let mut hashes = HashTable::new();
        for result in results {
            match result {
                Ok((id, hash)) => {
                    hashes.insert(id, hash);
                }
                Err(warning) => warnings.push(warning),
            }
        }
        debug!("hashed {} assets", hashes.len());
        Ok(HashScan { hashes, warnings })
    }

    fn process(&self, asset: &DiscoveredAsset) -> Outcome {
        let hashed = match hash_asset(&asset.path) {
            Ok(hashed) => hashed,
            Err(e) => return Outcome::Unreadable(unreadable(asset, &e)),
        };

        let summary = match PackageSummary::parse(&hashed.package) {
            Ok(summary) => summary,
            Err(source) => {
                let err = CollectError::Parse {
                    path: asset.path.clone(),
                    source,
                };
                warn!("skipping {}: {err}", asset.relative_path);
                let warning = Warning::new(
                    WarningCode::MalformedAsset,
                    asset.relative_path.clone(),
                    err.to_string(),
                );
                return Outcome::Malformed(asset.id.clone(), hashed.content_hash, warning);
            }
        };

        let refs = summary.references();
        let hard_deps = self.dependency_ids(&asset.id, &refs.hard);
        let mut soft_deps = self.dependency_ids(&asset.id, &refs.soft);
        soft_deps.retain(|d| hard_deps.binary_search(d).is_err());

        Outcome::Record(AssetRecord {
            id: asset.id.clone(),
            path: asset.relative_path.clone(),
            kind: asset.kind,
            content_hash: hashed.content_hash,
            size_bytes: hashed.size_bytes,
            hard_deps,
            soft_deps,
            startup_critical: false,
        })
    }

    /// Turns referenced package names into sorted, deduplicated asset ids
    /// under the mount point, dropping self references.
    fn dependency_ids(&self, own: &AssetId, packages: &[String]) -> Vec<AssetId> {
        let ids: BTreeSet<AssetId> = packages
            .iter()
            .filter_map(|p| AssetId::parse(p).ok())
            .filter(|id| id.is_under(&self.scan.mount_point) && id != own)
            .collect();
        ids.into_iter().collect()
    }

    /// Configured roots plus the engine ini default maps, deduplicated.
    fn named_roots(&self, warnings: &mut Vec<Warning>) -> Vec<AssetId> {
        let mut named: BTreeSet<AssetId> = self
            .startup
            .roots
            .iter()
            .filter_map(|r| AssetId::parse(r).ok())
            .collect();
        if self.startup.engine_ini {
            match read_engine_ini_maps(&self.project_root, &self.scan.mount_point) {
                Ok(maps) => named.extend(maps),
                Err(e) => {
                    warn!("{e}");
                    warnings.push(Warning::new(
                        WarningCode::UnreadableAsset,
                        crate::startup::ENGINE_INI,
                        e.to_string(),
                    ));
                }
            }
        }
        named.into_iter().collect()
    }
}

fn unreadable(asset: &DiscoveredAsset, err: &CollectError) -> Warning {
    warn!("skipping {}: {err}", asset.relative_path);
    Warning::new(
        WarningCode::UnreadableAsset,
        asset.relative_path.clone(),
        err.to_string(),
    )
}

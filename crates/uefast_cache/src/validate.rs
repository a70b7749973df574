//! Cache validation against the live project.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;
use uefast_common::{AssetId, HashTable};

use crate::cache::StartupCache;
use crate::error::CacheError;

/// Why a cache is or is not usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Reason {
    /// The cache file does not exist or cannot be read.
    Missing,
    /// The file is not a startup cache.
    BadMagic,
    /// The file was written by an incompatible format version.
    UnsupportedVersion,
    /// The body is corrupt or structurally inconsistent.
    ChecksumMismatch,
    /// Assets were added, removed or changed since the cache was built.
    Stale,
    /// The cache matches the project.
    Valid,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reason::Missing => "missing",
            Reason::BadMagic => "bad magic",
            Reason::UnsupportedVersion => "unsupported version",
            Reason::ChecksumMismatch => "checksum mismatch",
            Reason::Stale => "stale",
            Reason::Valid => "valid",
        };
        f.write_str(s)
    }
}

/// Differences between a cached hash table and the live one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HashDiff {
    /// Assets whose content hash changed.
    pub changed: Vec<AssetId>,
    /// Assets present now but not in the cache.
    pub added: Vec<AssetId>,
    /// Assets in the cache but gone now.
    pub removed: Vec<AssetId>,
}

impl HashDiff {
    /// Returns `true` if the tables are identical.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compares two hash tables. Every list is sorted by asset id.
pub fn diff_hashes(cached: &HashTable, live: &HashTable) -> HashDiff {
    let mut diff = HashDiff::default();
    for (id, hash) in cached {
        match live.get(id) {
            Some(now) if now == hash => {}
            Some(_) => diff.changed.push(id.clone()),
            None => diff.removed.push(id.clone()),
        }
    }
    diff.added = live
        .keys()
        .filter(|id| !cached.contains_key(*id))
        .cloned()
        .collect();
    diff
}

/// The outcome of validating a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Why the cache is or is not usable.
    pub reason: Reason,
    /// Human-readable explanation.
    pub detail: String,
    /// For [`Reason::Stale`], which assets differ.
    pub diff: HashDiff,
}

impl Verdict {
    fn new(reason: Reason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
            diff: HashDiff::default(),
        }
    }

    /// Returns `true` if the cache can be used.
    pub fn is_valid(&self) -> bool {
        self.reason == Reason::Valid
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.detail)
    }
}

/// Validates the cache at `path` against the live hash table.
///
/// Never fails; every problem is a verdict.
pub fn validate(path: &Path, live: &HashTable) -> Verdict {
    match std::fs::read(path) {
        Ok(data) => validate_bytes(&data, live),
        Err(e) => {
            debug!("cannot read cache {}: {e}", path.display());
            Verdict::new(Reason::Missing, format!("{}: {e}", path.display()))
        }
    }
}

/// Validates encoded cache bytes against the live hash table.
///
/// Checks run in order: magic, version, checksum and structure, then
/// staleness. Structural problems behind a valid checksum are reported as
/// [`Reason::ChecksumMismatch`]: the body cannot be trusted either way.
pub fn validate_bytes(data: &[u8], live: &HashTable) -> Verdict {
    let cache = match StartupCache::decode(data) {
        Ok(cache) => cache,
        Err(e) => {
            let reason = match &e {
                CacheError::BadMagic { .. } => Reason::BadMagic,
                CacheError::UnsupportedVersion { .. } => Reason::UnsupportedVersion,
                CacheError::Io { .. } => Reason::Missing,
                CacheError::ChecksumMismatch { .. }
                | CacheError::Truncated { .. }
                | CacheError::Structure { .. }
                | CacheError::Serialization { .. } => Reason::ChecksumMismatch,
            };
            return Verdict::new(reason, e.to_string());
        }
    };

    let diff = diff_hashes(&cache.hashes, live);
    if diff.is_empty() {
        return Verdict::new(
            Reason::Valid,
            format!("{} assets match", cache.hashes.len()),
        );
    }
    let detail = format!(
        "{} changed, {} added, {} removed",
        diff.changed.len(),
        diff.added.len(),
        diff.removed.len()
    );
    Verdict {
        reason: Reason::Stale,
        detail,
        diff,
    }
}

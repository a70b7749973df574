//! Asset identities, collected asset records, and dependency edges.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::ContentHash;

/// A stable asset identity in mounted package form, e.g. `/Game/Maps/Entry`.
///
/// Ordering is lexicographic on the underlying string; every deterministic
/// tie-break in the engine (load order, serialization order) uses it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

/// Error returned when a string is not a valid mounted asset path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid asset id '{0}': expected a mounted path such as /Game/Maps/Entry")]
pub struct InvalidAssetId(pub String);

impl AssetId {
    /// Creates an asset id without validation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a user-supplied asset id.
    ///
    /// Accepts object paths (`/Game/Maps/Entry.Entry`) and strips the object
    /// suffix, since identities are package-level.
    pub fn parse(s: &str) -> Result<Self, InvalidAssetId> {
        let trimmed = s.trim();
        let package = match trimmed.rsplit_once('/') {
            Some((dir, leaf)) => match leaf.split_once('.') {
                Some((name, _object)) => format!("{dir}/{name}"),
                None => trimmed.to_string(),
            },
            None => return Err(InvalidAssetId(s.to_string())),
        };
        if !package.starts_with('/') || package.len() < 2 || package.ends_with('/') {
            return Err(InvalidAssetId(s.to_string()));
        }
        Ok(Self(package))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this id lives under the given mount point (e.g. `/Game`).
    pub fn is_under(&self, mount_point: &str) -> bool {
        let mount = mount_point.trim_end_matches('/');
        self.0
            .strip_prefix(mount)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

/// What kind of package an asset is, derived from its file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// A regular package (`.uasset`).
    Package,
    /// A level (`.umap`).
    Map,
}

impl AssetKind {
    /// Classifies a file extension. Anything other than `umap` is a package.
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("umap") {
            AssetKind::Map
        } else {
            AssetKind::Package
        }
    }
}

/// Metadata for one collected asset.
///
/// Produced by the collector. The dependency graph takes ownership of every
/// record it holds and rewrites the dependency lists to match its final
/// edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Stable asset identity.
    pub id: AssetId,
    /// Package file path relative to the project root, `/`-separated.
    pub path: String,
    /// Package or map.
    pub kind: AssetKind,
    /// Hash over the package file and its companion files.
    pub content_hash: ContentHash,
    /// Combined size in bytes of the package file and its companion files.
    pub size_bytes: u64,
    /// Assets that must be loaded before this one, sorted and deduplicated.
    pub hard_deps: Vec<AssetId>,
    /// Assets referenced lazily, sorted and deduplicated.
    pub soft_deps: Vec<AssetId>,
    /// Whether the asset is reachable over hard edges from a startup root.
    pub startup_critical: bool,
}

/// Whether a dependency constrains load order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// The target must be loaded before the source.
    Hard,
    /// Informational only; never blocks loading.
    Soft,
}

/// A directed dependency: `from` references `to`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The referring asset.
    pub from: AssetId,
    /// The referenced asset.
    pub to: AssetId,
    /// Hard or soft.
    pub kind: EdgeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_package_path() {
        let id = AssetId::parse("/Game/Maps/Entry").unwrap();
        assert_eq!(id.as_str(), "/Game/Maps/Entry");
    }

    #[test]
    fn parse_strips_object_suffix() {
        let id = AssetId::parse("/Game/Maps/Entry.Entry").unwrap();
        assert_eq!(id.as_str(), "/Game/Maps/Entry");
    }

    #[test]
    fn parse_rejects_relative_paths() {
        assert!(AssetId::parse("Maps/Entry").is_err());
        assert!(AssetId::parse("Entry").is_err());
        assert!(AssetId::parse("/").is_err());
        assert!(AssetId::parse("/Game/").is_err());
    }

    #[test]
    fn is_under_mount_point() {
        let id = AssetId::new("/Game/Characters/Hero");
        assert!(id.is_under("/Game"));
        assert!(id.is_under("/Game/"));
        assert!(!id.is_under("/Engine"));
        assert!(!AssetId::new("/GameExtra/Hero").is_under("/Game"));
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut ids = vec![
            AssetId::new("/Game/C"),
            AssetId::new("/Game/A"),
            AssetId::new("/Game/B"),
        ];
        ids.sort();
        let names: Vec<_> = ids.iter().map(AssetId::as_str).collect();
        assert_eq!(names, vec!["/Game/A", "/Game/B", "/Game/C"]);
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(AssetKind::from_extension("umap"), AssetKind::Map);
        assert_eq!(AssetKind::from_extension("UMAP"), AssetKind::Map);
        assert_eq!(AssetKind::from_extension("uasset"), AssetKind::Package);
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let json = serde_json::to_string(&AssetId::new("/Game/A")).unwrap();
        assert_eq!(json, "\"/Game/A\"");
    }

    #[test]
    fn kind_serializes_by_variant_name() {
        assert_eq!(serde_json::to_string(&AssetKind::Map).unwrap(), "\"Map\"");
        assert_eq!(serde_json::to_string(&AssetKind::Package).unwrap(), "\"Package\"");
    }
}

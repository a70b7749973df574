//! Asset discovery under a project's content directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uefast_common::{AssetId, AssetKind, Warning, WarningCode};
use uefast_config::ScanConfig;

use crate::error::CollectError;
use crate::filter::AssetFilter;

/// An asset file found on disk, before it has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredAsset {
    /// Identity derived from the path below the content directory.
    pub id: AssetId,
    /// Package or map.
    pub kind: AssetKind,
    /// Absolute (or project-root-joined) path of the package file.
    pub path: PathBuf,
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
}

/// Checks that the project root is a readable directory.
pub fn check_project_root(project_root: &Path) -> Result<(), CollectError> {
    let metadata = std::fs::metadata(project_root).map_err(|e| CollectError::ProjectRoot {
        path: project_root.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(CollectError::ProjectRoot {
            path: project_root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        });
    }
    Ok(())
}

/// Discovers asset files below `<project_root>/<content_dir>`.
///
/// Returns assets sorted by id. Symbolic links are never followed. Skipped
/// links, subdirectories that cannot be listed, and files that map to an id
/// already taken are reported as warnings.
pub fn discover_assets(
    project_root: &Path,
    scan: &ScanConfig,
    filter: &AssetFilter,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<DiscoveredAsset>, CollectError> {
    check_project_root(project_root)?;

    let content_dir = project_root.join(&scan.content_dir);
    let entries = std::fs::read_dir(&content_dir).map_err(|e| CollectError::ContentDir {
        path: content_dir.clone(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => visit(project_root, &entry, &mut files, warnings),
            Err(e) => warnings.push(unreadable_dir(&content_dir, &e)),
        }
    }
    files.sort();

    let mut by_id: BTreeMap<AssetId, DiscoveredAsset> = BTreeMap::new();
    for path in files {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !scan.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)) {
            continue;
        }
        let Some(id) = asset_id_for(&content_dir, &path, &scan.mount_point) else {
            debug!("skipping {}: not a mountable asset path", path.display());
            continue;
        };
        if !filter.matches(&id) {
            continue;
        }
        let relative_path = relative_slash_path(project_root, &path);
        if let Some(existing) = by_id.get(&id) {
            let message = format!("asset id {id} already provided by {}", existing.relative_path);
            warn!("{relative_path}: {message}");
            warnings.push(Warning::new(WarningCode::DuplicateAssetId, relative_path, message));
            continue;
        }
        by_id.insert(
            id.clone(),
            DiscoveredAsset {
                id,
                kind: AssetKind::from_extension(ext),
                path,
                relative_path,
            },
        );
    }

    debug!("discovered {} assets in {}", by_id.len(), content_dir.display());
    Ok(by_id.into_values().collect())
}

/// Recursively collects regular files below a directory entry.
///
/// Uses the entry's own file type, so symbolic links are reported and
/// skipped instead of followed.
fn visit(
    project_root: &Path,
    entry: &std::fs::DirEntry,
    files: &mut Vec<PathBuf>,
    warnings: &mut Vec<Warning>,
) {
    let path = entry.path();
    let file_type = match entry.file_type() {
        Ok(file_type) => file_type,
        Err(e) => {
            warnings.push(unreadable_dir(&path, &e));
            return;
        }
    };

    if file_type.is_symlink() {
        let subject = relative_slash_path(project_root, &path);
        warn!("{subject}: symbolic link not followed");
        warnings.push(Warning::new(
            WarningCode::SkippedSymlink,
            subject,
            "symbolic link not followed",
        ));
        return;
    }
    if !file_type.is_dir() {
        files.push(path);
        return;
    }
    match std::fs::read_dir(&path) {
        Ok(entries) => {
            for entry in entries {
                match entry {
                    Ok(entry) => visit(project_root, &entry, files, warnings),
                    Err(e) => warnings.push(unreadable_dir(&path, &e)),
                }
            }
        }
        Err(e) => warnings.push(unreadable_dir(&path, &e)),
    }
}

fn unreadable_dir(path: &Path, err: &std::io::Error) -> Warning {
    warn!("cannot list {}: {err}", path.display());
    Warning::new(
        WarningCode::UnreadableDirectory,
        path.display().to_string(),
        err.to_string(),
    )
}

/// Maps `<content_dir>/Maps/Entry.umap` to `<mount_point>/Maps/Entry`.
pub fn asset_id_for(content_dir: &Path, path: &Path, mount_point: &str) -> Option<AssetId> {
    let relative = path.strip_prefix(content_dir).ok()?.with_extension("");
    let mut id = mount_point.trim_end_matches('/').to_string();
    for component in relative.components() {
        id.push('/');
        id.push_str(component.as_os_str().to_str()?);
    }
    AssetId::parse(&id).ok()
}

/// Returns `path` relative to `root` with `/` separators.
pub fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn asset_id_mapping() {
        let content = Path::new("/proj/Content");
        let id = asset_id_for(content, Path::new("/proj/Content/Maps/Entry.umap"), "/Game");
        assert_eq!(id, Some(AssetId::new("/Game/Maps/Entry")));
    }

    #[test]
    fn asset_id_outside_content_is_none() {
        let content = Path::new("/proj/Content");
        assert!(asset_id_for(content, Path::new("/proj/Other/A.uasset"), "/Game").is_none());
    }

    #[test]
    fn discovers_sorted_assets_with_matching_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Content/Maps/Entry.umap");
        touch(dir.path(), "Content/Characters/Hero.uasset");
        touch(dir.path(), "Content/Characters/Hero.uexp");
        touch(dir.path(), "Content/readme.txt");

        let mut warnings = Vec::new();
        let assets = discover_assets(
            dir.path(),
            &ScanConfig::default(),
            &AssetFilter::default(),
            &mut warnings,
        )
        .unwrap();

        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["/Game/Characters/Hero", "/Game/Maps/Entry"]);
        assert_eq!(assets[1].kind, AssetKind::Map);
        assert_eq!(assets[0].relative_path, "Content/Characters/Hero.uasset");
        assert!(warnings.is_empty());
    }

    #[test]
    fn duplicate_ids_warn() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Content/Level.uasset");
        touch(dir.path(), "Content/Level.umap");

        let mut warnings = Vec::new();
        let assets = discover_assets(
            dir.path(),
            &ScanConfig::default(),
            &AssetFilter::default(),
            &mut warnings,
        )
        .unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::DuplicateAssetId);
        assert_eq!(warnings[0].subject, "Content/Level.umap");
        assert_eq!(assets[0].kind, AssetKind::Package);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Content/Maps/Entry.umap");
        let content = dir.path().join("Content");
        std::os::unix::fs::symlink(&content, content.join("Loop")).unwrap();

        let mut warnings = Vec::new();
        let assets = discover_assets(
            dir.path(),
            &ScanConfig::default(),
            &AssetFilter::default(),
            &mut warnings,
        )
        .unwrap();

        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["/Game/Maps/Entry"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::SkippedSymlink);
        assert_eq!(warnings[0].subject, "Content/Loop");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_package_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Content/Hero.uasset");
        let content = dir.path().join("Content");
        std::os::unix::fs::symlink(content.join("Hero.uasset"), content.join("Alias.uasset"))
            .unwrap();

        let mut warnings = Vec::new();
        let assets = discover_assets(
            dir.path(),
            &ScanConfig::default(),
            &AssetFilter::default(),
            &mut warnings,
        )
        .unwrap();

        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id.as_str(), "/Game/Hero");
        assert_eq!(warnings[0].code, WarningCode::SkippedSymlink);
    }

    #[test]
    fn filter_applies() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Content/Maps/Entry.umap");
        touch(dir.path(), "Content/Developers/Test.uasset");

        let filter = AssetFilter::new(&[], &["/Game/Developers/**".to_string()]).unwrap();
        let mut warnings = Vec::new();
        let assets =
            discover_assets(dir.path(), &ScanConfig::default(), &filter, &mut warnings).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].id.as_str(), "/Game/Maps/Entry");
    }

    #[test]
    fn missing_project_root_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_assets(
            &dir.path().join("missing"),
            &ScanConfig::default(),
            &AssetFilter::default(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CollectError::ProjectRoot { .. }));
    }

    #[test]
    fn missing_content_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_assets(
            dir.path(),
            &ScanConfig::default(),
            &AssetFilter::default(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CollectError::ContentDir { .. }));
    }
}

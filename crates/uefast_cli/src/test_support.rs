//! Fixture projects for command tests.

use std::path::Path;

use tempfile::TempDir;
use uefast_collect::package::PackageSummary;

use crate::GlobalArgs;

/// Global flags with output suppressed.
pub fn quiet() -> GlobalArgs {
    GlobalArgs {
        quiet: true,
        verbose: false,
        config: None,
    }
}

fn write(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// Five assets with hard edges B -> A, C -> A, C -> B and E -> D.
///
/// C is a map and therefore the only startup root.
pub fn five_asset_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "Content/A.uasset", &PackageSummary::new("/Game/A").encode());
    write(
        root,
        "Content/B.uasset",
        &PackageSummary::new("/Game/B").with_import("/Game/A").encode(),
    );
    write(
        root,
        "Content/C.umap",
        &PackageSummary::new("/Game/C")
            .with_import("/Game/A")
            .with_import("/Game/B")
            .encode(),
    );
    write(root, "Content/D.uasset", &PackageSummary::new("/Game/D").encode());
    write(
        root,
        "Content/E.uasset",
        &PackageSummary::new("/Game/E").with_import("/Game/D").encode(),
    );
    dir
}

/// Changes an asset's content without breaking its package summary.
pub fn edit_asset(project: &Path, name: &str) {
    write(project, &format!("Content/{name}.uexp"), b"edited export data");
}

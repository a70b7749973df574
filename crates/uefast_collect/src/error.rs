//! Error types for asset collection.

use std::path::PathBuf;

use crate::package::PackageError;

/// Errors that can occur while collecting asset metadata.
///
/// `ProjectRoot`, `ContentDir` and `WorkerPool` abort the whole run. `Io` and
/// `Parse` concern a single asset; the collector turns them into warnings and
/// skips the asset.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The project root does not exist or is not a readable directory.
    #[error("cannot read project root {path}: {source}")]
    ProjectRoot {
        /// The project root that was given.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The content directory below the project root cannot be listed.
    #[error("cannot read content directory {path}: {source}")]
    ContentDir {
        /// The content directory path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An asset file could not be read.
    #[error("cannot read asset {path}: {source}")]
    Io {
        /// The asset file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An asset's package summary is malformed.
    #[error("malformed package {path}: {source}")]
    Parse {
        /// The asset file path.
        path: PathBuf,
        /// What was wrong with the summary.
        source: PackageError,
    },

    /// An include or exclude pattern is not a valid glob.
    #[error("invalid filter pattern '{pattern}': {reason}")]
    Filter {
        /// The offending pattern.
        pattern: String,
        /// Description of the problem.
        reason: String,
    },

    /// The hashing worker pool could not be started.
    #[error("failed to start hashing workers: {reason}")]
    WorkerPool {
        /// Description of the failure.
        reason: String,
    },
}

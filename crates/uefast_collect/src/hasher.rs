//! Content hashing of package files and their companions.

use std::io::Read;
use std::path::{Path, PathBuf};

use uefast_common::{ContentHash, ContentHasher};

use crate::error::CollectError;

/// Extensions of files that belong to a package and are hashed with it.
pub const COMPANION_EXTENSIONS: [&str; 2] = ["uexp", "ubulk"];

const CHUNK_SIZE: usize = 64 * 1024;

/// Frame tag of the package file itself.
const PACKAGE_TAG: &str = "package";

/// The hash and size of one asset, plus the package file bytes.
#[derive(Debug, Clone)]
pub struct HashedAsset {
    /// Hash over the framed package file followed by each existing companion.
    pub content_hash: ContentHash,
    /// Combined size of all hashed files.
    pub size_bytes: u64,
    /// Raw bytes of the package file, for summary parsing.
    pub package: Vec<u8>,
}

/// Returns the companion file paths for a package file, in hashing order.
pub fn companion_paths(path: &Path) -> Vec<PathBuf> {
    COMPANION_EXTENSIONS
        .iter()
        .map(|ext| path.with_extension(ext))
        .collect()
}

/// Reads and hashes a package file and any companion files next to it.
///
/// Each file enters the hash as a frame: its role tag, its length, then its
/// bytes. Moving bytes between files or renaming a companion changes the
/// hash. A missing companion is skipped. A companion that exists but cannot
/// be read fails the whole asset.
pub fn hash_asset(path: &Path) -> Result<HashedAsset, CollectError> {
    let package = std::fs::read(path).map_err(|e| io_error(path, e))?;
    let mut hasher = ContentHasher::new();
    write_frame_header(&mut hasher, PACKAGE_TAG, package.len() as u64);
    hasher.update(&package);
    let mut size_bytes = package.len() as u64;

    for (ext, companion) in COMPANION_EXTENSIONS.iter().zip(companion_paths(path)) {
        if !companion.is_file() {
            continue;
        }
        size_bytes += hash_file_into(&companion, ext, &mut hasher)?;
    }

    Ok(HashedAsset {
        content_hash: hasher.finish(),
        size_bytes,
        package,
    })
}

/// Feeds a frame header: tag length, tag, and little-endian payload length.
fn write_frame_header(hasher: &mut ContentHasher, tag: &str, len: u64) {
    hasher.update(&[tag.len() as u8]);
    hasher.update(tag.as_bytes());
    hasher.update(&len.to_le_bytes());
}

/// Streams a file into `hasher` as one frame, returning its length.
///
/// A file whose length changes while it is read is an I/O error.
fn hash_file_into(path: &Path, tag: &str, hasher: &mut ContentHasher) -> Result<u64, CollectError> {
    let mut file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    let expected = file.metadata().map_err(|e| io_error(path, e))?.len();
    write_frame_header(hasher, tag, expected);

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = file.read(&mut buf).map_err(|e| io_error(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    if total != expected {
        return Err(io_error(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("file changed while hashing: expected {expected} bytes, read {total}"),
            ),
        ));
    }
    Ok(total)
}

fn io_error(path: &Path, source: std::io::Error) -> CollectError {
    CollectError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Builds the bounded worker pool used for reading and hashing.
///
/// `workers == 0` lets rayon pick one thread per available CPU.
pub fn worker_pool(workers: usize) -> Result<rayon::ThreadPool, CollectError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("uefast-hash-{i}"))
        .build()
        .map_err(|e| CollectError::WorkerPool {
            reason: e.to_string(),
        })
}

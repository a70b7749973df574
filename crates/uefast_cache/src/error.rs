//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while encoding, decoding, reading or writing a cache.
///
/// Decoding is fail-closed: every structural inconsistency is an error, never
/// a best-effort repair.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing the cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The data is shorter than the header or the declared body.
    #[error("cache truncated: expected {expected} bytes, found {found}")]
    Truncated {
        /// Bytes required.
        expected: u64,
        /// Bytes available.
        found: u64,
    },

    /// The file does not start with the cache magic.
    #[error("bad cache magic {found:?}")]
    BadMagic {
        /// The first eight bytes of the file.
        found: [u8; 8],
    },

    /// The format version is not one this engine reads.
    #[error("unsupported cache format version: expected {expected}, got {actual}")]
    UnsupportedVersion {
        /// The version this engine writes.
        expected: u32,
        /// The version found in the header.
        actual: u32,
    },

    /// The body checksum does not match the header.
    #[error("cache checksum mismatch: header {expected:#010x}, body {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum recorded in the header.
        expected: u32,
        /// Checksum of the body as read.
        actual: u32,
    },

    /// The body decoded but its contents are inconsistent.
    #[error("invalid cache structure: {reason}")]
    Structure {
        /// Description of the inconsistency.
        reason: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

//! The startup cache file: encoding, atomic writing, and validation.
//!
//! A cache file is a fixed 24-byte header followed by a bincode body:
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 8 | magic `UEFAST01` |
//! | 8 | 4 | format version, little-endian |
//! | 12 | 4 | XXH32 (seed 0) of the body, little-endian |
//! | 16 | 8 | body length, little-endian |
//! | 24 | n | body |
//!
//! Decoding fails closed on any mismatch. Files are replaced atomically, so a
//! reader sees either the previous complete cache or the new one.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod header;
pub mod validate;
pub mod write;

pub use cache::{CacheStats, StartupCache};
pub use error::CacheError;
pub use header::{CacheHeader, CACHE_MAGIC, FORMAT_VERSION, HEADER_LEN};
pub use validate::{diff_hashes, validate, validate_bytes, HashDiff, Reason, Verdict};
pub use write::write_atomic;

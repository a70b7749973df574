//! Shared foundational types for the startup accelerator.
//!
//! This crate provides asset identities, content hashing, the immutable
//! [`AssetRecord`] produced by collection, tagged dependency edges, and the
//! warning type every stage uses to report recovered problems.

#![warn(missing_docs)]

pub mod asset;
pub mod hash;
pub mod warning;

pub use asset::{AssetId, AssetKind, AssetRecord, DependencyEdge, EdgeKind, InvalidAssetId};
pub use hash::{ContentHash, ContentHasher, HashTable};
pub use warning::{Warning, WarningCode};

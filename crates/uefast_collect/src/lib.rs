//! Asset metadata collection.
//!
//! Walks a project's content directory, reads each package's reference table,
//! hashes its content on a bounded worker pool, and marks the assets reachable
//! from the startup roots. One unreadable or malformed asset never aborts the
//! run: it is reported as a [`Warning`](uefast_common::Warning) and skipped.

#![warn(missing_docs)]

pub mod collector;
pub mod error;
pub mod filter;
pub mod hasher;
pub mod package;
pub mod startup;
pub mod walk;

pub use collector::{Collection, Collector, HashScan};
pub use error::CollectError;
pub use filter::AssetFilter;
pub use package::{PackageError, PackageSummary};
pub use walk::DiscoveredAsset;

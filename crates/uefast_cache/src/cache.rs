//! The startup cache contents and their binary encoding.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uefast_common::{AssetId, AssetRecord, ContentHash, DependencyEdge, HashTable};
use uefast_graph::DependencyGraph;
use uefast_plan::LoadPlan;

use crate::error::CacheError;
use crate::header::{CacheHeader, FORMAT_VERSION, HEADER_LEN};
use crate::write::write_atomic;

/// Everything a build run persists: the graph, its load plan, and the
/// content hash of every asset seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupCache {
    /// Dependency graph, with demoted edges stored as soft.
    pub graph: DependencyGraph,
    /// Load plan computed from the graph.
    pub plan: LoadPlan,
    /// Content hash per asset, including assets skipped as malformed.
    pub hashes: HashTable,
}

/// On-disk body layout. Every list is sorted by asset id.
#[derive(Serialize, Deserialize)]
struct CacheBody {
    hashes: Vec<(AssetId, ContentHash)>,
    records: Vec<AssetRecord>,
    edges: Vec<DependencyEdge>,
    demoted: Vec<DependencyEdge>,
    plan: LoadPlan,
}

/// Summary of a cache file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Format version of the file.
    pub format_version: u32,
    /// Total file size.
    pub file_bytes: u64,
    /// Assets in the graph.
    pub assets: usize,
    /// Entries in the hash table.
    pub hashed_assets: usize,
    /// Hard edges.
    pub hard_edges: usize,
    /// Soft edges, including demoted ones.
    pub soft_edges: usize,
    /// Edges demoted to break cycles.
    pub demoted_edges: usize,
    /// Startup-critical assets.
    pub startup_assets: usize,
    /// Load batches.
    pub batches: usize,
    /// Topological layers.
    pub layers: usize,
    /// Worker count the plan was packed for.
    pub parallelism: usize,
    /// Estimated parallel load time.
    pub estimated_total_us: u64,
    /// Estimated serial load time.
    pub serial_baseline_us: u64,
}

impl StartupCache {
    /// Bundles a graph, plan and hash table.
    pub fn new(graph: DependencyGraph, plan: LoadPlan, hashes: HashTable) -> Self {
        Self {
            graph,
            plan,
            hashes,
        }
    }

    /// Encodes the cache: header followed by body.
    ///
    /// Identical contents always produce identical bytes.
    pub fn encode(&self) -> Result<Vec<u8>, CacheError> {
        let body = CacheBody {
            hashes: self.hashes.iter().map(|(id, h)| (id.clone(), *h)).collect(),
            records: self.graph.records().cloned().collect(),
            edges: self.graph.edges(),
            demoted: self.graph.demoted_edges().to_vec(),
            plan: self.plan.clone(),
        };
        let body = bincode::serde::encode_to_vec(&body, bincode::config::standard()).map_err(
            |e| CacheError::Serialization {
                reason: e.to_string(),
            },
        )?;

        let header = CacheHeader::for_body(&body);
        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decodes and fully checks a cache.
    pub fn decode(data: &[u8]) -> Result<Self, CacheError> {
        let (_, body) = CacheHeader::verify(data)?;

        let (decoded, read): (CacheBody, usize) =
            bincode::serde::decode_from_slice(body, bincode::config::standard()).map_err(|e| {
                CacheError::Serialization {
                    reason: e.to_string(),
                }
            })?;
        if read != body.len() {
            return Err(structure(format!(
                "{} trailing bytes after body",
                body.len() - read
            )));
        }

        let mut hashes = HashTable::new();
        let mut previous: Option<&AssetId> = None;
        for (id, hash) in &decoded.hashes {
            if previous.is_some_and(|p| p >= id) {
                return Err(structure(format!("hash table not strictly sorted at {id}")));
            }
            previous = Some(id);
            hashes.insert(id.clone(), *hash);
        }

        for pair in decoded.records.windows(2) {
            if pair[0].id >= pair[1].id {
                return Err(structure(format!("records not strictly sorted at {}", pair[1].id)));
            }
        }
        for record in &decoded.records {
            match hashes.get(&record.id) {
                Some(hash) if *hash == record.content_hash => {}
                Some(_) => {
                    return Err(structure(format!("hash table disagrees on {}", record.id)));
                }
                None => return Err(structure(format!("{} has no hash entry", record.id))),
            }
        }
        let graph = DependencyGraph::from_parts(decoded.records, decoded.edges, decoded.demoted)
            .map_err(|e| structure(e.to_string()))?;
        decoded
            .plan
            .check(&graph)
            .map_err(|e| structure(e.to_string()))?;

        Ok(Self {
            graph,
            plan: decoded.plan,
            hashes,
        })
    }

    /// Encodes the cache and atomically replaces `path` with it.
    pub fn write(&self, path: &Path) -> Result<u64, CacheError> {
        let bytes = self.encode()?;
        write_atomic(path, &bytes)?;
        info!(
            "wrote startup cache {} ({} assets, {} bytes)",
            path.display(),
            self.graph.len(),
            bytes.len()
        );
        Ok(bytes.len() as u64)
    }

    /// Reads and decodes a cache file.
    pub fn read(path: &Path) -> Result<Self, CacheError> {
        let data = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("read {} bytes from {}", data.len(), path.display());
        Self::decode(&data)
    }

    /// Summarizes the cache. `file_bytes` is the encoded size.
    pub fn stats(&self, file_bytes: u64) -> CacheStats {
        let graph = self.graph.stats();
        CacheStats {
            format_version: FORMAT_VERSION,
            file_bytes,
            assets: graph.assets,
            hashed_assets: self.hashes.len(),
            hard_edges: graph.hard_edges,
            soft_edges: graph.soft_edges,
            demoted_edges: graph.demoted_edges,
            startup_assets: graph.startup_assets,
            batches: self.plan.batches.len(),
            layers: self.plan.layer_count(),
            parallelism: self.plan.parallelism,
            estimated_total_us: self.plan.estimated_total_us,
            serial_baseline_us: self.plan.serial_baseline_us,
        }
    }
}

fn structure(reason: String) -> CacheError {
    CacheError::Structure { reason }
}

//! Startup roots and startup-critical reachability.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

use tracing::{debug, warn};
use uefast_common::{AssetId, AssetKind, AssetRecord, Warning, WarningCode};

use crate::error::CollectError;

/// Engine configuration file holding the default map settings.
pub const ENGINE_INI: &str = "Config/DefaultEngine.ini";

/// Keys in [`ENGINE_INI`] whose values are maps loaded at startup.
pub const ENGINE_INI_MAP_KEYS: [&str; 3] =
    ["GameDefaultMap", "EditorStartupMap", "ServerDefaultMap"];

/// Reads the default map settings from `Config/DefaultEngine.ini`.
///
/// Only values under `mount_point` are returned; engine-provided maps are
/// outside the project and cannot be roots. A missing file yields no roots.
pub fn read_engine_ini_maps(
    project_root: &Path,
    mount_point: &str,
) -> Result<Vec<AssetId>, CollectError> {
    let path = project_root.join(ENGINE_INI);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CollectError::Io { path, source: e }),
    };
    Ok(parse_engine_ini_maps(&content, mount_point))
}

/// Extracts the default map values from engine ini text.
pub fn parse_engine_ini_maps(content: &str, mount_point: &str) -> Vec<AssetId> {
    let mut maps = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with(';') || line.starts_with('[') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if !ENGINE_INI_MAP_KEYS.contains(&key.trim()) {
            continue;
        }
        let value = value.trim().trim_matches('"');
        if value.is_empty() {
            continue;
        }
        match AssetId::parse(value) {
            Ok(id) if id.is_under(mount_point) => maps.push(id),
            Ok(id) => debug!("ignoring startup map outside {mount_point}: {id}"),
            Err(e) => debug!("ignoring {key}: {e}"),
        }
    }
    maps
}

/// Resolves the set of startup roots against the collected assets.
///
/// When `named` is empty every map is a root. Named roots that were not
/// collected produce a [`WarningCode::UnknownStartupRoot`] warning.
pub fn resolve_roots(
    named: &[AssetId],
    records: &[AssetRecord],
    warnings: &mut Vec<Warning>,
) -> BTreeSet<AssetId> {
    if named.is_empty() {
        let maps: BTreeSet<AssetId> = records
            .iter()
            .filter(|r| r.kind == AssetKind::Map)
            .map(|r| r.id.clone())
            .collect();
        debug!("no startup roots named; using {} maps", maps.len());
        return maps;
    }

    let known: BTreeSet<&AssetId> = records.iter().map(|r| &r.id).collect();
    let mut roots = BTreeSet::new();
    for id in named {
        if known.contains(id) {
            roots.insert(id.clone());
        } else {
            warn!("startup root {id} is not a collected asset");
            warnings.push(Warning::new(
                WarningCode::UnknownStartupRoot,
                id.as_str(),
                "startup root is not a collected asset",
            ));
        }
    }
    roots
}

/// Sets `startup_critical` on every record reachable from `roots` over hard
/// dependencies, and clears it everywhere else.
pub fn mark_startup_critical(records: &mut [AssetRecord], roots: &BTreeSet<AssetId>) {
    let index: BTreeMap<AssetId, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.clone(), i))
        .collect();

    let mut reached = vec![false; records.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for root in roots {
        if let Some(&i) = index.get(root) {
            if !reached[i] {
                reached[i] = true;
                queue.push_back(i);
            }
        }
    }
    while let Some(i) = queue.pop_front() {
        for dep in &records[i].hard_deps {
            if let Some(&j) = index.get(dep) {
                if !reached[j] {
                    reached[j] = true;
                    queue.push_back(j);
                }
            }
        }
    }

    for (record, critical) in records.iter_mut().zip(reached) {
        record.startup_critical = critical;
    }
}

//! JSON report types shared by `scan` and `analyze`.

use serde::Serialize;
use uefast_common::{AssetKind, AssetRecord, Warning};

/// One asset as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReport {
    /// Asset id, e.g. `/Game/Maps/Entry`.
    pub id: String,
    /// Package file relative to the project root.
    pub path: String,
    /// `Package` or `Map`.
    pub kind: AssetKind,
    /// Package plus companion file bytes.
    pub size_bytes: u64,
    /// Content hash as 32 hex digits.
    pub content_hash: String,
    /// Hard dependency ids.
    pub hard_dependencies: Vec<String>,
    /// Soft dependency ids.
    pub soft_dependencies: Vec<String>,
    /// Reachable from a startup root over hard edges.
    pub startup_critical: bool,
}

impl From<&AssetRecord> for AssetReport {
    fn from(record: &AssetRecord) -> Self {
        Self {
            id: record.id.to_string(),
            path: record.path.clone(),
            kind: record.kind,
            size_bytes: record.size_bytes,
            content_hash: record.content_hash.to_string(),
            hard_dependencies: record.hard_deps.iter().map(ToString::to_string).collect(),
            soft_dependencies: record.soft_deps.iter().map(ToString::to_string).collect(),
            startup_critical: record.startup_critical,
        }
    }
}

/// A recovered problem as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningReport {
    /// Code such as `W102`.
    pub code: String,
    /// Asset id or path concerned.
    pub subject: String,
    /// What went wrong.
    pub message: String,
}

impl From<&Warning> for WarningReport {
    fn from(warning: &Warning) -> Self {
        Self {
            code: warning.code.to_string(),
            subject: warning.subject.clone(),
            message: warning.message.clone(),
        }
    }
}

/// Converts warnings for a report.
pub fn warning_reports(warnings: &[Warning]) -> Vec<WarningReport> {
    warnings.iter().map(WarningReport::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uefast_common::{AssetId, ContentHash, WarningCode};

    #[test]
    fn asset_report_is_camel_case() {
        let record = AssetRecord {
            id: AssetId::new("/Game/Maps/Entry"),
            path: "Content/Maps/Entry.umap".to_string(),
            kind: AssetKind::Map,
            content_hash: ContentHash::from_bytes(b"entry"),
            size_bytes: 2048,
            hard_deps: vec![AssetId::new("/Game/Characters/Hero")],
            soft_deps: vec![],
            startup_critical: true,
        };
        let json = serde_json::to_value(AssetReport::from(&record)).unwrap();
        assert_eq!(json["id"], "/Game/Maps/Entry");
        assert_eq!(json["kind"], "Map");
        assert_eq!(json["sizeBytes"], 2048);
        assert_eq!(json["contentHash"].as_str().unwrap().len(), 32);
        assert_eq!(json["hardDependencies"][0], "/Game/Characters/Hero");
        assert_eq!(json["startupCritical"], true);
    }

    #[test]
    fn warning_code_is_rendered() {
        let warning = Warning::new(WarningCode::MalformedAsset, "/Game/Broken", "bad magic");
        let report = WarningReport::from(&warning);
        assert_eq!(report.code, "W102");
        assert_eq!(report.subject, "/Game/Broken");
    }
}

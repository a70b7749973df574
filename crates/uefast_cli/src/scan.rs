//! `ue5-fast-startup scan` — run the collector only.

use serde::Serialize;

use crate::pipeline::{collect, resolve_config, write_output};
use crate::report::{warning_reports, AssetReport, WarningReport};
use crate::{GlobalArgs, ScanArgs};

/// The `scan` JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Well-formed assets, sorted by id.
    pub assets: Vec<AssetReport>,
    /// Startup roots found among the assets.
    pub roots: Vec<String>,
    /// Readable assets, including malformed ones.
    pub hashed_assets: usize,
    /// Problems recovered from during the scan.
    pub warnings: Vec<WarningReport>,
}

/// Runs the `scan` command.
pub fn run(args: &ScanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(&args.project, global, &args.overrides)?;
    let collection = collect(&args.project, &config)?;

    let report = ScanReport {
        assets: collection.records.iter().map(AssetReport::from).collect(),
        roots: collection.roots.iter().map(ToString::to_string).collect(),
        hashed_assets: collection.hashes.len(),
        warnings: warning_reports(&collection.warnings),
    };
    write_output(args.output.as_deref(), &serde_json::to_string_pretty(&report)?)?;

    if !global.quiet {
        eprintln!(
            "   Scanned {} assets, {} root(s), {} warning(s)",
            report.assets.len(),
            report.roots.len(),
            report.warnings.len()
        );
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{five_asset_project, quiet};
    use crate::ScanOverrides;

    fn scan(project: &std::path::Path, overrides: ScanOverrides) -> serde_json::Value {
        let output = project.join("scan.json");
        let args = ScanArgs {
            project: project.to_path_buf(),
            output: Some(output.clone()),
            overrides,
        };
        assert_eq!(run(&args, &quiet()).unwrap(), 0);
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap()
    }

    #[test]
    fn lists_assets_and_roots() {
        let project = five_asset_project();
        let report = scan(project.path(), ScanOverrides::default());
        assert_eq!(report["assets"].as_array().unwrap().len(), 5);
        assert_eq!(report["roots"], serde_json::json!(["/Game/C"]));
        assert_eq!(report["hashedAssets"], 5);
        assert_eq!(report["assets"][1]["hardDependencies"], serde_json::json!(["/Game/A"]));
    }

    #[test]
    fn exclude_override_filters_assets() {
        let project = five_asset_project();
        let overrides = ScanOverrides {
            exclude: vec!["/Game/D".to_string(), "/Game/E".to_string()],
            ..ScanOverrides::default()
        };
        let report = scan(project.path(), overrides);
        let ids: Vec<_> = report["assets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["/Game/A", "/Game/B", "/Game/C"]);
    }
}

//! `ue5-fast-startup analyze` — collect, graph, plan, and report as JSON.

use serde::Serialize;
use uefast_common::Warning;
use uefast_graph::DependencyGraph;
use uefast_plan::LoadPlan;

use crate::pipeline::{build, resolve_config, seconds, write_output, BuildOutput};
use crate::report::{warning_reports, AssetReport, WarningReport};
use crate::{AnalyzeArgs, GlobalArgs};

/// The `analyze` JSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Every collected asset, sorted by id.
    pub assets: Vec<AssetReport>,
    /// Number of assets in the graph.
    pub total_assets: usize,
    /// Number of startup-critical assets.
    pub startup_assets: usize,
    /// Combined size of all assets.
    pub total_size_bytes: u64,
    /// Combined size of startup-critical assets.
    pub startup_size_bytes: u64,
    /// Hard plus soft edges.
    pub dependency_count: usize,
    /// Hard edges demoted to break cycles.
    pub demoted_edges: usize,
    /// Topological layers in the plan.
    pub layer_count: usize,
    /// Batches in the plan.
    pub batch_count: usize,
    /// Estimated parallel load time.
    pub estimated_total_seconds: f64,
    /// Estimated load time without batching.
    pub serial_baseline_seconds: f64,
    /// Baseline minus parallel estimate.
    pub estimated_savings_seconds: f64,
    /// Problems recovered from during the run.
    pub warnings: Vec<WarningReport>,
}

impl AnalysisReport {
    /// Summarizes a finished build.
    pub fn new(graph: &DependencyGraph, plan: &LoadPlan, warnings: &[Warning]) -> Self {
        let stats = graph.stats();
        Self {
            assets: graph.records().map(AssetReport::from).collect(),
            total_assets: stats.assets,
            startup_assets: stats.startup_assets,
            total_size_bytes: stats.total_size_bytes,
            startup_size_bytes: stats.startup_size_bytes,
            dependency_count: stats.hard_edges + stats.soft_edges,
            demoted_edges: stats.demoted_edges,
            layer_count: plan.layer_count(),
            batch_count: plan.batches.len(),
            estimated_total_seconds: seconds(plan.estimated_total_us),
            serial_baseline_seconds: seconds(plan.serial_baseline_us),
            estimated_savings_seconds: seconds(plan.savings_us()),
            warnings: warning_reports(warnings),
        }
    }
}

/// Runs the `analyze` command.
///
/// Writes the report to `--output` or stdout. Returns 0 on success; a bad
/// project root or unwritable output is an error.
pub fn run(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(&args.project, global, &args.overrides)?;

    if !global.quiet {
        eprintln!("   Analyzing {}", args.project.display());
    }

    let BuildOutput {
        graph,
        plan,
        warnings,
        ..
    } = build(&args.project, &config)?;
    let report = AnalysisReport::new(&graph, &plan, &warnings);

    let json = serde_json::to_string_pretty(&report)?;
    write_output(args.output.as_deref(), &json)?;

    if !global.quiet {
        eprintln!(
            "   {} assets ({} startup-critical), {} batches in {} layers, {} warning(s)",
            report.total_assets,
            report.startup_assets,
            report.batch_count,
            report.layer_count,
            report.warnings.len()
        );
        eprintln!(
            "   Estimated savings: {:.3}s ({:.3}s -> {:.3}s)",
            report.estimated_savings_seconds,
            report.serial_baseline_seconds,
            report.estimated_total_seconds
        );
        if let Some(path) = &args.output {
            eprintln!("   Report written to {}", path.display());
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{five_asset_project, quiet};
    use crate::ScanOverrides;

    fn args(project: &std::path::Path, output: std::path::PathBuf) -> AnalyzeArgs {
        AnalyzeArgs {
            project: project.to_path_buf(),
            output: Some(output),
            overrides: ScanOverrides::default(),
        }
    }

    fn read_report(path: &std::path::Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn analyze_end_to_end() {
        let project = five_asset_project();
        let output = project.path().join("out/report.json");
        let code = run(&args(project.path(), output.clone()), &quiet()).unwrap();
        assert_eq!(code, 0);

        let report = read_report(&output);
        assert_eq!(report["totalAssets"], 5);
        assert_eq!(report["startupAssets"], 3);
        assert_eq!(report["dependencyCount"], 4);
        assert_eq!(report["layerCount"], 3);
        assert_eq!(report["assets"].as_array().unwrap().len(), 5);
        assert_eq!(report["assets"][0]["id"], "/Game/A");
        assert_eq!(report["assets"][2]["kind"], "Map");
        assert!(report["warnings"].as_array().unwrap().is_empty());
        assert!(report["estimatedSavingsSeconds"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn savings_match_plan() {
        let project = five_asset_project();
        let output = project.path().join("report.json");
        run(&args(project.path(), output.clone()), &quiet()).unwrap();
        let report = read_report(&output);
        let total = report["estimatedTotalSeconds"].as_f64().unwrap();
        let serial = report["serialBaselineSeconds"].as_f64().unwrap();
        let savings = report["estimatedSavingsSeconds"].as_f64().unwrap();
        assert!((serial - total - savings).abs() < 1e-9);
    }

    #[test]
    fn malformed_asset_is_reported_not_fatal() {
        let project = five_asset_project();
        std::fs::write(project.path().join("Content/Broken.uasset"), b"garbage").unwrap();
        let output = project.path().join("report.json");
        assert_eq!(run(&args(project.path(), output.clone()), &quiet()).unwrap(), 0);

        let report = read_report(&output);
        assert_eq!(report["totalAssets"], 5);
        assert_eq!(report["warnings"][0]["code"], "W102");
        assert_eq!(report["warnings"][0]["subject"], "Content/Broken.uasset");
    }

    #[test]
    fn asset_dependencies_follow_demoted_edges() {
        use uefast_collect::PackageSummary;

        let project = tempfile::tempdir().unwrap();
        let content = project.path().join("Content");
        std::fs::create_dir_all(&content).unwrap();
        let a = PackageSummary::new("/Game/A").with_import("/Game/B");
        let b = PackageSummary::new("/Game/B").with_import("/Game/A");
        std::fs::write(content.join("A.uasset"), a.encode()).unwrap();
        std::fs::write(content.join("B.uasset"), b.encode()).unwrap();

        let output = project.path().join("report.json");
        run(&args(project.path(), output.clone()), &quiet()).unwrap();
        let report = read_report(&output);

        assert_eq!(report["demotedEdges"], 1);
        assert_eq!(report["warnings"][0]["code"], "W201");
        assert_eq!(report["assets"][0]["hardDependencies"], serde_json::json!(["/Game/B"]));
        assert_eq!(report["assets"][1]["hardDependencies"], serde_json::json!([]));
        assert_eq!(report["assets"][1]["softDependencies"], serde_json::json!(["/Game/A"]));
    }

    #[test]
    fn missing_project_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = run(&args(&missing, dir.path().join("report.json")), &quiet());
        assert!(result.is_err());
    }
}

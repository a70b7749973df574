//! ue5-fast-startup — builds and validates the startup cache of a UE5 project.
//!
//! `analyze` reports on a project's assets and load plan, `cache` writes the
//! binary startup cache, and `verify` tells the editor whether an existing
//! cache can still be used. `scan`, `stats` and `graph` expose the individual
//! stages for inspection.

#![warn(missing_docs)]

mod analyze;
mod cache;
mod graph;
mod pipeline;
mod report;
mod scan;
mod stats;
mod verify;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::Level;

/// Precomputes and validates an optimized startup load plan for UE5 projects.
#[derive(Parser, Debug)]
#[command(name = "ue5-fast-startup", version, about = "UE5 startup cache builder")]
pub struct Cli {
    /// Only print warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `uefast.toml` to use instead of the project's own.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect assets, build the graph and plan, and write a JSON report.
    Analyze(AnalyzeArgs),
    /// Build the binary startup cache.
    Cache(CacheArgs),
    /// Check an existing cache against the project.
    Verify(VerifyArgs),
    /// Print a summary of a cache file.
    Stats(StatsArgs),
    /// Write the dependency graph in Graphviz DOT format.
    Graph(GraphArgs),
    /// Collect assets only and list them as JSON.
    Scan(ScanArgs),
}

/// Command-line overrides of the `[scan]` and `[plan]` configuration.
#[derive(Args, Debug, Default, Clone)]
pub struct ScanOverrides {
    /// Only collect assets whose id matches one of these globs.
    #[arg(long, num_args = 1..)]
    pub include: Vec<String>,

    /// Never collect assets whose id matches one of these globs.
    #[arg(long, num_args = 1..)]
    pub exclude: Vec<String>,

    /// Hashing worker threads (0 = one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Number of parallel load workers to plan for.
    #[arg(short = 'j', long)]
    pub parallelism: Option<usize>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Project root directory.
    #[arg(short, long)]
    pub project: PathBuf,

    /// Where to write the JSON report (default: stdout).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ScanOverrides,
}

/// Arguments for the `cache` subcommand.
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Project root directory.
    #[arg(short, long)]
    pub project: PathBuf,

    /// Cache file to write (default: `<project>/Saved/FastStartup/startup.uefast`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rebuild even if the existing cache is still valid.
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub overrides: ScanOverrides,
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Project root directory.
    #[arg(short, long)]
    pub project: PathBuf,

    /// Cache file to check (default: `<project>/Saved/FastStartup/startup.uefast`).
    #[arg(short, long)]
    pub cache: Option<PathBuf>,

    /// Print the verdict as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: ScanOverrides,
}

/// Arguments for the `stats` subcommand.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Cache file to summarize.
    #[arg(short, long)]
    pub cache: PathBuf,

    /// Print the summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `graph` subcommand.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Project root directory.
    #[arg(short, long)]
    pub project: PathBuf,

    /// Where to write the DOT file (default: stdout).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only include startup-critical assets.
    #[arg(long)]
    pub startup_only: bool,

    #[command(flatten)]
    pub overrides: ScanOverrides,
}

/// Arguments for the `scan` subcommand.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Project root directory.
    #[arg(short, long)]
    pub project: PathBuf,

    /// Where to write the JSON asset list (default: stdout).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ScanOverrides,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// The most detailed log level to emit.
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    tracing_subscriber::fmt()
        .with_max_level(global.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Analyze(ref args) => analyze::run(args, &global),
        Command::Cache(ref args) => cache::run(args, &global),
        Command::Verify(ref args) => verify::run(args, &global),
        Command::Stats(ref args) => stats::run(args, &global),
        Command::Graph(ref args) => graph::run(args, &global),
        Command::Scan(ref args) => scan::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

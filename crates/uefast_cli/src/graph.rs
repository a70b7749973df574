//! `ue5-fast-startup graph` — export the dependency graph as Graphviz DOT.

use uefast_graph::build_graph;

use crate::pipeline::{collect, resolve_config, write_output};
use crate::{GlobalArgs, GraphArgs};

/// Runs the `graph` command.
pub fn run(args: &GraphArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(&args.project, global, &args.overrides)?;
    let collection = collect(&args.project, &config)?;
    let built = build_graph(collection.records);

    let graph = if args.startup_only {
        built.graph.startup_subgraph()
    } else {
        built.graph
    };
    write_output(args.output.as_deref(), &graph.to_dot())?;

    if !global.quiet {
        if let Some(path) = &args.output {
            eprintln!("   Wrote {} ({} assets)", path.display(), graph.len());
        }
    }
    Ok(0)
}

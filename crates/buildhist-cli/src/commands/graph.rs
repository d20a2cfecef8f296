use anyhow::Result;

use buildhist_core::config::DEFAULT_DATABASE;
use buildhist_core::graph::dag::DependencyGraph;
use buildhist_core::graph::visualize::{self, GraphFormat as VizFormat};
use buildhist_core::schema::warehouse::warehouse_schema;

use crate::args::GraphArgs;

pub fn run(args: &GraphArgs) -> Result<()> {
    let schema = warehouse_schema(DEFAULT_DATABASE);
    let dep_graph = DependencyGraph::from_schema(&schema);

    let format = match args.format {
        crate::args::GraphFormat::Mermaid => VizFormat::Mermaid,
        crate::args::GraphFormat::Dot => VizFormat::Dot,
    };

    println!("{}", visualize::visualize(&dep_graph, format));
    Ok(())
}

use petgraph::algo::toposort;

use crate::error::{BuildHistError, Result};
use crate::graph::dag::DependencyGraph;

/// Tables ordered for safe creation and insertion (parents before children).
#[derive(Debug, Clone)]
pub struct InsertionOrder {
    pub tables: Vec<String>,
}

/// Compute topological sort of the dependency graph.
/// Returns tables in insertion order (parents before children).
pub fn topological_sort(graph: &DependencyGraph) -> Result<InsertionOrder> {
    // Edges run child → parent, so petgraph yields children first; reverse it.
    match toposort(&graph.graph, None) {
        Ok(sorted_indices) => {
            let tables: Vec<String> = sorted_indices
                .iter()
                .rev()
                .map(|&idx| graph.table_name(idx).to_string())
                .collect();

            Ok(InsertionOrder { tables })
        }
        Err(cycle_node) => Err(BuildHistError::CircularDependency {
            table: graph.table_name(cycle_node.node_id()).to_string(),
        }),
    }
}

use crate::graph::dag::{DependencyGraph, EdgeInfo};
use petgraph::visit::EdgeRef;

/// Output format for graph visualization.
#[derive(Debug, Clone, Copy)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}

/// Generate a visualization of the dependency graph.
pub fn visualize(graph: &DependencyGraph, format: GraphFormat) -> String {
    match format {
        GraphFormat::Mermaid => generate_mermaid(graph),
        GraphFormat::Dot => generate_dot(graph),
    }
}

/// `"User_ID (FK_Fact_User)"`, or just the columns for unnamed constraints.
fn edge_label(info: &EdgeInfo) -> String {
    let columns = info.source_columns.join(", ");
    match &info.constraint_name {
        Some(name) => format!("{} ({})", columns, name),
        None => columns,
    }
}

fn generate_mermaid(graph: &DependencyGraph) -> String {
    let mut output = String::from("graph TD\n");

    for node in graph.graph.node_indices() {
        let name = graph.table_name(node);
        output.push_str(&format!("    {}[{}]\n", name, name));
    }

    output.push('\n');

    for edge in graph.graph.edge_references() {
        let from = graph.table_name(edge.source());
        let to = graph.table_name(edge.target());
        output.push_str(&format!(
            "    {} -->|{}| {}\n",
            from,
            edge_label(edge.weight()),
            to
        ));
    }

    output
}

fn generate_dot(graph: &DependencyGraph) -> String {
    let mut output = String::from("digraph dependencies {\n");
    output.push_str("    rankdir=TB;\n");
    output.push_str("    node [shape=box, style=rounded];\n\n");

    for edge in graph.graph.edge_references() {
        let from = graph.table_name(edge.source());
        let to = graph.table_name(edge.target());
        output.push_str(&format!(
            "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
            from,
            to,
            edge_label(edge.weight())
        ));
    }

    output.push_str("}\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::warehouse::warehouse_schema;

    #[test]
    fn test_mermaid_output() {
        let graph = DependencyGraph::from_schema(&warehouse_schema("dw"));
        let output = visualize(&graph, GraphFormat::Mermaid);

        assert!(output.starts_with("graph TD\n"));
        assert!(output.contains("    Dim_Users[Dim_Users]"));
        assert!(output.contains(
            "    Fact_ChangeHistory -->|Build_ID (FK_Fact_Build)| Dim_Builds"
        ));
    }

    #[test]
    fn test_dot_output() {
        let graph = DependencyGraph::from_schema(&warehouse_schema("dw"));
        let output = visualize(&graph, GraphFormat::Dot);

        assert!(output.starts_with("digraph dependencies {"));
        assert!(output.contains(
            "\"Dim_UserRole\" -> \"Dim_Users\" [label=\"User_ID (FK_UserRole_User)\"];"
        ));
        assert!(output.trim_end().ends_with('}'));
        assert_eq!(output.matches(" -> ").count(), 5);
    }
}

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::schema::types::DatabaseSchema;

/// A directed graph representing table dependencies via foreign keys.
/// Edges point from dependent table to referenced table (child → parent).
pub struct DependencyGraph {
    pub graph: DiGraph<String, EdgeInfo>,
    pub node_indices: HashMap<String, NodeIndex>,
}

/// Information about an edge (foreign key relationship).
#[derive(Debug, Clone)]
pub struct EdgeInfo {
    /// Name of the FK constraint
    pub constraint_name: Option<String>,
    /// Source columns in the dependent table
    pub source_columns: Vec<String>,
    /// Referenced columns in the parent table
    pub referenced_columns: Vec<String>,
}

impl DependencyGraph {
    /// Build a dependency graph from a schema.
    /// Each table becomes a node, each FK becomes a directed edge from child to parent.
    pub fn from_schema(schema: &DatabaseSchema) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for table_name in schema.tables.keys() {
            let idx = graph.add_node(table_name.clone());
            node_indices.insert(table_name.clone(), idx);
        }

        for (table_name, table) in &schema.tables {
            for fk in &table.foreign_keys {
                if let (Some(&from_idx), Some(&to_idx)) = (
                    node_indices.get(table_name),
                    node_indices.get(&fk.referenced_table),
                ) {
                    graph.add_edge(
                        from_idx,
                        to_idx,
                        EdgeInfo {
                            constraint_name: fk.name.clone(),
                            source_columns: fk.source_columns.clone(),
                            referenced_columns: fk.referenced_columns.clone(),
                        },
                    );
                }
            }
        }

        Self {
            graph,
            node_indices,
        }
    }

    /// Get the table name for a node index.
    pub fn table_name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// Get node index for a table name.
    pub fn node_index(&self, table_name: &str) -> Option<NodeIndex> {
        self.node_indices.get(table_name).copied()
    }

    /// Get the number of tables.
    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of FK edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Tables referenced by `table_name` through a foreign key.
    pub fn parents_of(&self, table_name: &str) -> Vec<&str> {
        let Some(idx) = self.node_index(table_name) else {
            return Vec::new();
        };
        let mut parents: Vec<&str> = self
            .graph
            .neighbors(idx)
            .map(|n| self.table_name(n))
            .collect();
        parents.sort_unstable();
        parents.dedup();
        parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::warehouse::{self, warehouse_schema};

    #[test]
    fn test_build_graph() {
        let schema = warehouse_schema("dw");
        let graph = DependencyGraph::from_schema(&schema);

        assert_eq!(graph.table_count(), 6);
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_fact_table_depends_on_users_and_builds() {
        let graph = DependencyGraph::from_schema(&warehouse_schema("dw"));

        assert_eq!(
            graph.parents_of(warehouse::CHANGE_HISTORY),
            vec![warehouse::BUILDS, warehouse::USERS]
        );
        assert_eq!(graph.parents_of(warehouse::TYPE), vec![warehouse::BUILDS]);
        assert!(graph.parents_of(warehouse::USERS).is_empty());
        assert!(graph.parents_of("missing").is_empty());
    }
}

//! # DDL Rendering
//!
//! Turns the dialect-independent schema model into `CREATE`/`DROP`
//! statements for PostgreSQL, MySQL and SQLite.
//!
//! Table and column identifiers are emitted bare. They are fixed, plain
//! ASCII names, and leaving them unquoted lets PostgreSQL fold them the same
//! way it folds identifiers in ad-hoc queries (`SELECT COUNT(*) FROM
//! Fact_ChangeHistory` resolves on every backend). Database names come from
//! user configuration and are always quoted.

use crate::error::Result;
use crate::graph::dag::DependencyGraph;
use crate::graph::topo::topological_sort;
use crate::schema::types::{DatabaseSchema, DatabaseType, Table};

/// Quote an identifier for the given backend.
pub fn quote_identifier(name: &str, db_type: DatabaseType) -> String {
    match db_type {
        DatabaseType::MySQL => format!("`{}`", name.replace('`', "``")),
        _ => format!("\"{}\"", name.replace('"', "\"\"")),
    }
}

/// `CREATE TABLE` with inline primary and foreign key constraints.
pub fn create_table_sql(table: &Table, db_type: DatabaseType) -> String {
    let mut lines: Vec<String> = table
        .columns
        .values()
        .map(|col| {
            format!(
                "    {} {} {}",
                col.name,
                col.data_type.sql_type(db_type),
                if col.nullable { "NULL" } else { "NOT NULL" }
            )
        })
        .collect();

    if let Some(pk) = &table.primary_key {
        let constraint = match &pk.name {
            Some(name) => format!("CONSTRAINT {} ", name),
            None => String::new(),
        };
        lines.push(format!(
            "    {}PRIMARY KEY ({})",
            constraint,
            pk.columns.join(", ")
        ));
    }

    for fk in &table.foreign_keys {
        let constraint = match &fk.name {
            Some(name) => format!("CONSTRAINT {} ", name),
            None => String::new(),
        };
        lines.push(format!(
            "    {}FOREIGN KEY ({}) REFERENCES {}({})",
            constraint,
            fk.source_columns.join(", "),
            fk.referenced_table,
            fk.referenced_columns.join(", ")
        ));
    }

    format!("CREATE TABLE {} (\n{}\n)", table.name, lines.join(",\n"))
}

pub fn drop_table_sql(table_name: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", table_name)
}

/// `DROP DATABASE` for server backends. SQLite has no server-side database
/// and returns `None`; its file is removed instead.
pub fn drop_database_sql(database: &str, db_type: DatabaseType) -> Option<String> {
    let quoted = quote_identifier(database, db_type);
    match db_type {
        // FORCE terminates other sessions still attached to the old database.
        DatabaseType::PostgreSQL => Some(format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", quoted)),
        DatabaseType::MySQL => Some(format!("DROP DATABASE IF EXISTS {}", quoted)),
        DatabaseType::SQLite => None,
    }
}

pub fn create_database_sql(database: &str, db_type: DatabaseType) -> Option<String> {
    match db_type {
        DatabaseType::PostgreSQL | DatabaseType::MySQL => Some(format!(
            "CREATE DATABASE {}",
            quote_identifier(database, db_type)
        )),
        DatabaseType::SQLite => None,
    }
}

/// Ordered DDL for rebuilding every table: drops run children first, creates
/// run parents first.
#[derive(Debug, Clone)]
pub struct TableScript {
    pub drops: Vec<String>,
    pub creates: Vec<String>,
}

impl TableScript {
    pub fn build(schema: &DatabaseSchema, db_type: DatabaseType) -> Result<Self> {
        let graph = DependencyGraph::from_schema(schema);
        let order = topological_sort(&graph)?;

        let drops = order
            .tables
            .iter()
            .rev()
            .map(|name| drop_table_sql(name))
            .collect();
        let creates = order
            .tables
            .iter()
            .filter_map(|name| schema.tables.get(name))
            .map(|table| create_table_sql(table, db_type))
            .collect();

        Ok(Self { drops, creates })
    }

    /// Render as a standalone script, one statement per block.
    pub fn to_script(&self) -> String {
        let mut out = String::new();
        for stmt in self.drops.iter().chain(self.creates.iter()) {
            out.push_str(stmt);
            out.push_str(";\n\n");
        }
        out
    }
}

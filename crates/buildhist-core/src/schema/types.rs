use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dialect-independent description of a set of tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub name: String,
    pub tables: IndexMap<String, Table>,
}

impl DatabaseSchema {
    pub fn new(name: String) -> Self {
        Self {
            name,
            tables: IndexMap::new(),
        }
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn foreign_key_count(&self) -> usize {
        self.tables.values().map(|t| t.foreign_keys.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseType {
    PostgreSQL,
    MySQL,
    SQLite,
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::MySQL => write!(f, "MySQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// A table with its columns and keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: IndexMap<String, Column>,
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: String) -> Self {
        Self {
            name,
            columns: IndexMap::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
        }
    }

    /// Append a column, keeping declaration order.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.insert(column.name.clone(), column);
        self
    }

    pub fn primary_key(mut self, name: &str, columns: &[&str]) -> Self {
        self.primary_key = Some(PrimaryKey {
            name: Some(name.to_string()),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn foreign_key(
        mut self,
        name: &str,
        source_column: &str,
        referenced_table: &str,
        referenced_column: &str,
    ) -> Self {
        self.foreign_keys.push(ForeignKey {
            name: Some(name.to_string()),
            source_columns: vec![source_column.to_string()],
            referenced_table: referenced_table.to_string(),
            referenced_columns: vec![referenced_column.to_string()],
        });
        self
    }
}

/// A single column in a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Column {
    /// A `NOT NULL` column.
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Column types used by the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit integer
    Integer,
    /// Variable-length string with a maximum length
    VarChar(u32),
    /// Unbounded text
    Text,
    /// Date and time without timezone
    DateTime,
}

impl DataType {
    /// Render the column type for a specific backend.
    ///
    /// PostgreSQL has no `DATETIME`; it gets `TIMESTAMP` (without time zone),
    /// which holds the same values.
    pub fn sql_type(&self, db_type: DatabaseType) -> String {
        match self {
            DataType::Integer => "INT".to_string(),
            DataType::VarChar(len) => format!("VARCHAR({})", len),
            DataType::Text => "TEXT".to_string(),
            DataType::DateTime => match db_type {
                DatabaseType::PostgreSQL => "TIMESTAMP".to_string(),
                DatabaseType::MySQL | DatabaseType::SQLite => "DATETIME".to_string(),
            },
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::DateTime)
    }
}


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub columns: Vec<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub source_columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_renders_per_dialect() {
        assert_eq!(
            DataType::DateTime.sql_type(DatabaseType::PostgreSQL),
            "TIMESTAMP"
        );
        assert_eq!(DataType::DateTime.sql_type(DatabaseType::MySQL), "DATETIME");
        assert_eq!(DataType::DateTime.sql_type(DatabaseType::SQLite), "DATETIME");
    }

    #[test]
    fn test_varchar_keeps_length() {
        assert_eq!(
            DataType::VarChar(50).sql_type(DatabaseType::MySQL),
            "VARCHAR(50)"
        );
    }

    #[test]
    fn test_table_builder_preserves_column_order() {
        let table = Table::new("t".to_string())
            .column(Column::new("b", DataType::Integer))
            .column(Column::new("a", DataType::Text).nullable())
            .primary_key("PK_t", &["b"]);

        let names: Vec<&String> = table.columns.keys().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(table.columns["a"].nullable);
        assert!(!table.columns["b"].nullable);
        assert_eq!(table.primary_key.unwrap().columns, vec!["b".to_string()]);
    }
}

//! # Error Types
//!
//! Defines `BuildHistError`, the unified error enum for every failure mode in
//! the provisioning and seeding pipeline. Each variant carries the table name,
//! statement preview or sanitized connection hint needed to act on it without
//! re-running with debug logging.

use thiserror::Error;

/// All errors that can occur in buildhist operations.
#[derive(Error, Debug)]
pub enum BuildHistError {
    #[error("Database connection failed: {message}\n  Connection string: {connection_hint}\n  Cause: {source}")]
    Connection {
        message: String,
        connection_hint: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Unsupported database scheme '{scheme}'. Supported: postgres://, mysql://, sqlite://")]
    UnsupportedDatabase { scheme: String },

    #[error("Circular foreign key dependency involving table '{table}'; tables cannot be created in a valid order")]
    CircularDependency { table: String },

    #[error("Provisioning failed: {message}\n  SQL: {sql_preview}\n  DB error: {source}")]
    Provision {
        message: String,
        sql_preview: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Insert failed on {table} row {row_index}: {message}\n  SQL: {sql_preview}\n  DB error: {source}")]
    InsertFailed {
        table: String,
        row_index: usize,
        message: String,
        sql_preview: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Verification query failed for check '{check}': {source}\n  SQL: {sql_preview}")]
    Verify {
        check: String,
        sql_preview: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Foreign key resolution failed: {source_table}.{source_column} references {target_table}, but no {target_table} rows were generated")]
    ForeignKeyResolution {
        source_table: String,
        source_column: String,
        target_table: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{message}: {source}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BuildHistError>;

/// Shorten a SQL statement for inclusion in an error message.
pub fn truncate_sql(sql: &str, max_len: usize) -> String {
    match sql.char_indices().nth(max_len) {
        None => sql.to_string(),
        Some((cut, _)) => format!("{}...", &sql[..cut]),
    }
}

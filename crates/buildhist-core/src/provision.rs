//! # Schema Provisioning
//!
//! Drops and recreates the warehouse database, then rebuilds its six tables
//! in foreign-key order. Nothing is confirmed or retried: an unreachable
//! server or a missing privilege ends the run with the underlying error.
//!
//! On PostgreSQL and MySQL the database is recreated through an
//! administrative connection. On SQLite the "server" is a directory and the
//! database is a file inside it, which is deleted and recreated.

use std::path::Path;

use tracing::{debug, info};

use crate::config::WarehouseConfig;
use crate::db::{admin_url, database_type_from_url, database_url, sqlite_file, Warehouse};
use crate::error::{truncate_sql, BuildHistError, Result};
use crate::schema::ddl::{create_database_sql, drop_database_sql, TableScript};
use crate::schema::types::{DatabaseSchema, DatabaseType};
use crate::schema::warehouse::warehouse_schema;

/// Provision a fresh, empty warehouse and return an open connection to it.
pub async fn provision(config: &WarehouseConfig) -> Result<Warehouse> {
    config.validate()?;

    let warehouse = recreate_database(&config.server, &config.database).await?;
    let schema = warehouse_schema(&config.database);
    recreate_tables(&warehouse, &schema).await?;

    info!(
        database = %config.database,
        location = %warehouse.location(),
        tables = schema.table_count(),
        "Warehouse provisioned"
    );
    Ok(warehouse)
}

/// Drop the database if it exists, create it again and connect to it.
pub async fn recreate_database(server: &str, database: &str) -> Result<Warehouse> {
    let db_type = database_type_from_url(server)?;

    if db_type == DatabaseType::SQLite {
        return recreate_sqlite_file(&sqlite_file(server, database)).await;
    }

    let admin = Warehouse::connect(&admin_url(server, db_type)?, db_type).await?;
    let statements = [
        drop_database_sql(database, db_type),
        create_database_sql(database, db_type),
    ];
    for sql in statements.into_iter().flatten() {
        debug!(sql = %sql, "Executing");
        if let Err(e) = admin.execute_raw(&sql).await {
            admin.close().await;
            return Err(BuildHistError::Provision {
                message: format!("Failed to recreate database '{}'", database),
                sql_preview: truncate_sql(&sql, 200),
                source: e,
            });
        }
    }
    admin.close().await;
    info!(database, %db_type, "Database recreated");

    Warehouse::connect(&database_url(server, database, db_type)?, db_type).await
}

async fn recreate_sqlite_file(path: &Path) -> Result<Warehouse> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed existing database file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No existing database file to drop");
        }
        Err(e) => {
            return Err(BuildHistError::Io {
                message: format!("Failed to remove {}", path.display()),
                source: e,
            })
        }
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| BuildHistError::Io {
                message: format!("Failed to create directory {}", dir.display()),
                source: e,
            })?;
    }

    let warehouse = Warehouse::connect_sqlite(path, true).await?;
    info!(path = %path.display(), "Database recreated");
    Ok(warehouse)
}

/// Drop every warehouse table (children first) and create it again
/// (parents first).
pub async fn recreate_tables(warehouse: &Warehouse, schema: &DatabaseSchema) -> Result<()> {
    let script = TableScript::build(schema, warehouse.database_type())?;

    for sql in script.drops.iter().chain(script.creates.iter()) {
        debug!(sql = %sql, "Executing");
        warehouse
            .execute_raw(sql)
            .await
            .map_err(|e| BuildHistError::Provision {
                message: "DDL statement failed".to_string(),
                sql_preview: truncate_sql(sql, 200),
                source: e,
            })?;
    }

    Ok(())
}

//! # Database Connections
//!
//! Resolves the configured server and database name into backend-specific
//! connection targets and wraps the resulting sqlx pool in `Warehouse`, so
//! the provisioning, loading and verification code can issue statements
//! without matching on the backend everywhere.
//!
//! - **PostgreSQL**: `postgres://host[:port]`. Administrative statements run
//!   against the `postgres` maintenance database.
//! - **MySQL**: `mysql://host[:port]`. Administrative statements run without
//!   a default database.
//! - **SQLite**: `sqlite://<dir>`. The warehouse is the file
//!   `<dir>/<database>.db`.
//!
//! Integrated authentication means URLs carry no password: PostgreSQL falls
//! back to `PGUSER`/trust/peer authentication, MySQL to socket auth.
//! Credentials that are present are masked in every message.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::WarehouseConfig;
use crate::error::{BuildHistError, Result};
use crate::schema::types::DatabaseType;

/// Maintenance database PostgreSQL administrative sessions attach to.
const POSTGRES_ADMIN_DATABASE: &str = "postgres";

/// Determine the database type from a server URL.
pub fn database_type_from_url(url: &str) -> Result<DatabaseType> {
    let scheme = url.split(':').next().unwrap_or("");
    match scheme {
        "postgres" | "postgresql" => Ok(DatabaseType::PostgreSQL),
        "mysql" | "mariadb" => Ok(DatabaseType::MySQL),
        "sqlite" | "file" => Ok(DatabaseType::SQLite),
        other => Err(BuildHistError::UnsupportedDatabase {
            scheme: other.to_string(),
        }),
    }
}

/// Replace the path of a server URL, keeping host, port, user and query.
fn with_path(server: &str, path: &str) -> Result<String> {
    let mut parsed = url::Url::parse(server).map_err(|e| BuildHistError::Config {
        message: format!("Invalid server URL '{}': {}", sanitize_url(server), e),
    })?;
    parsed.set_path(path);
    Ok(parsed.to_string())
}

/// URL for administrative (drop/create database) statements.
pub fn admin_url(server: &str, db_type: DatabaseType) -> Result<String> {
    match db_type {
        DatabaseType::PostgreSQL => with_path(server, &format!("/{}", POSTGRES_ADMIN_DATABASE)),
        DatabaseType::MySQL => with_path(server, ""),
        DatabaseType::SQLite => Err(BuildHistError::Config {
            message: "SQLite has no server; the database file is managed directly".to_string(),
        }),
    }
}

/// URL of the warehouse database on a server backend.
pub fn database_url(server: &str, database: &str, db_type: DatabaseType) -> Result<String> {
    match db_type {
        DatabaseType::PostgreSQL | DatabaseType::MySQL => {
            with_path(server, &format!("/{}", database))
        }
        DatabaseType::SQLite => Ok(format!(
            "sqlite://{}",
            sqlite_file(server, database).display()
        )),
    }
}

/// File backing a SQLite warehouse: `<dir>/<database>.db`.
pub fn sqlite_file(server: &str, database: &str) -> PathBuf {
    let dir = server
        .strip_prefix("sqlite://")
        .or_else(|| server.strip_prefix("sqlite:"))
        .or_else(|| server.strip_prefix("file://"))
        .or_else(|| server.strip_prefix("file:"))
        .unwrap_or(server);
    let dir = if dir.is_empty() { "." } else { dir };
    Path::new(dir).join(format!("{}.db", database))
}

/// Sanitize a database URL for error messages (hide password).
pub fn sanitize_url(db_url: &str) -> String {
    if let Ok(mut parsed) = url::Url::parse(db_url) {
        if parsed.password().is_some() {
            let _ = parsed.set_password(Some("****"));
        }
        return parsed.to_string();
    }
    // SQLite paths and malformed URLs are returned as-is
    db_url.to_string()
}

enum WarehousePool {
    Postgres(PgPool),
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

/// An open single-connection pool to a database.
///
/// Every statement autocommits; nothing here opens a transaction.
pub struct Warehouse {
    db_type: DatabaseType,
    location: String,
    pool: WarehousePool,
}

impl Warehouse {
    /// Connect to an existing warehouse described by `config`.
    pub async fn open(config: &WarehouseConfig) -> Result<Self> {
        let db_type = database_type_from_url(&config.server)?;
        match db_type {
            DatabaseType::SQLite => {
                Self::connect_sqlite(&sqlite_file(&config.server, &config.database), false).await
            }
            _ => {
                let url = database_url(&config.server, &config.database, db_type)?;
                Self::connect(&url, db_type).await
            }
        }
    }

    /// Connect to a server backend URL.
    pub async fn connect(url: &str, db_type: DatabaseType) -> Result<Self> {
        let location = sanitize_url(url);
        let connection_error = |e: sqlx::Error| BuildHistError::Connection {
            message: format!("Failed to connect to {}", db_type),
            connection_hint: location.clone(),
            source: e,
        };

        let pool = match db_type {
            DatabaseType::PostgreSQL => WarehousePool::Postgres(
                PgPoolOptions::new()
                    .max_connections(1)
                    .connect(url)
                    .await
                    .map_err(connection_error)?,
            ),
            DatabaseType::MySQL => WarehousePool::MySql(
                MySqlPoolOptions::new()
                    .max_connections(1)
                    .connect(url)
                    .await
                    .map_err(connection_error)?,
            ),
            DatabaseType::SQLite => {
                let options = SqliteConnectOptions::from_str(url).map_err(connection_error)?;
                WarehousePool::Sqlite(
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .connect_with(options)
                        .await
                        .map_err(connection_error)?,
                )
            }
        };

        Ok(Self {
            db_type,
            location,
            pool,
        })
    }

    /// Open a SQLite file with foreign key enforcement on.
    pub async fn connect_sqlite(path: &Path, create_if_missing: bool) -> Result<Self> {
        let location = path.display().to_string();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create_if_missing)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| BuildHistError::Connection {
                message: "Failed to open SQLite database".to_string(),
                connection_hint: location.clone(),
                source: e,
            })?;

        Ok(Self {
            db_type: DatabaseType::SQLite,
            location,
            pool: WarehousePool::Sqlite(pool),
        })
    }

    pub fn database_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Sanitized URL or file path, safe to log.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run a single statement as a prepared query; returns rows affected.
    pub async fn execute(&self, sql: &str) -> std::result::Result<u64, sqlx::Error> {
        let affected = match &self.pool {
            WarehousePool::Postgres(pool) => sqlx::query(sql).execute(pool).await?.rows_affected(),
            WarehousePool::MySql(pool) => sqlx::query(sql).execute(pool).await?.rows_affected(),
            WarehousePool::Sqlite(pool) => sqlx::query(sql).execute(pool).await?.rows_affected(),
        };
        Ok(affected)
    }

    /// Run a statement through the simple query protocol.
    ///
    /// PostgreSQL refuses `CREATE/DROP DATABASE` as prepared statements.
    pub async fn execute_raw(&self, sql: &str) -> std::result::Result<(), sqlx::Error> {
        match &self.pool {
            WarehousePool::Postgres(pool) => sqlx::raw_sql(sql).execute(pool).await.map(|_| ()),
            WarehousePool::MySql(pool) => sqlx::raw_sql(sql).execute(pool).await.map(|_| ()),
            WarehousePool::Sqlite(pool) => sqlx::raw_sql(sql).execute(pool).await.map(|_| ()),
        }
    }

    /// Run a `SELECT COUNT(*) ...` query.
    pub async fn fetch_count(&self, sql: &str) -> std::result::Result<i64, sqlx::Error> {
        match &self.pool {
            WarehousePool::Postgres(pool) => sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await,
            WarehousePool::MySql(pool) => sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await,
            WarehousePool::Sqlite(pool) => sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await,
        }
    }

    pub async fn close(self) {
        match self.pool {
            WarehousePool::Postgres(pool) => pool.close().await,
            WarehousePool::MySql(pool) => pool.close().await,
            WarehousePool::Sqlite(pool) => pool.close().await,
        }
    }
}

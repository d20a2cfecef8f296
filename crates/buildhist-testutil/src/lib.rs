use std::path::Path;

use buildhist_core::generate::engine::{self, GeneratedData};
use buildhist_core::output::direct::insert_direct;
use buildhist_core::provision::provision;
use buildhist_core::{Warehouse, WarehouseConfig};

/// Fixed base time for deterministic tests.
pub fn fixed_base_time() -> chrono::NaiveDateTime {
    chrono::NaiveDateTime::new(
        chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
    )
}

/// The end-to-end sizing: 10 users, 10 builds, 100 changes, one year back.
pub fn small_config(server: &str) -> WarehouseConfig {
    WarehouseConfig {
        server: server.to_string(),
        database: "buildhist_test".to_string(),
        users_count: 10,
        builds_count: 10,
        fact_rows: 100,
        years_back: 1,
        seed: Some(42),
    }
}

/// `small_config` against a SQLite directory.
pub fn sqlite_config(dir: &Path) -> WarehouseConfig {
    small_config(&format!("sqlite://{}", dir.display()))
}

/// Provision, generate and load in one go, as `buildhist generate` does.
pub async fn seed_warehouse(config: &WarehouseConfig) -> (Warehouse, GeneratedData) {
    let warehouse = provision(config).await.expect("provision failed");
    let data = engine::generate(config, config.seed.unwrap_or(42), fixed_base_time(), None)
        .expect("generate failed");
    insert_direct(&data, &warehouse, None)
        .await
        .expect("insert failed");
    (warehouse, data)
}

/// `SELECT COUNT(*)`, panicking on failure.
pub async fn count(warehouse: &Warehouse, sql: &str) -> i64 {
    warehouse
        .fetch_count(sql)
        .await
        .unwrap_or_else(|e| panic!("count query failed: {}\nSQL: {}", e, sql))
}

/// Temporary directory to act as a SQLite "server".
pub fn scratch_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

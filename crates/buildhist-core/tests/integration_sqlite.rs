//! End-to-end tests against SQLite. These always run: each test provisions
//! its warehouse inside a fresh temporary directory.

use buildhist_core::check::verify;
use buildhist_core::generate::engine;
use buildhist_core::output::direct::insert_direct;
use buildhist_core::provision::provision;
use buildhist_core::schema::warehouse::{
    BUILDS, CHANGE_HISTORY, STATUS, TYPE, USERS, USER_ROLE,
};
use buildhist_core::{BuildHistError, Warehouse};
use buildhist_testutil::{count, fixed_base_time, scratch_dir, seed_warehouse, sqlite_config};

#[tokio::test]
async fn test_sqlite_end_to_end_counts() {
    let dir = scratch_dir();
    let (warehouse, _) = seed_warehouse(&sqlite_config(dir.path())).await;

    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Fact_ChangeHistory").await, 100);
    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Dim_Users").await, 10);
    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Dim_UserRole").await, 10);
    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Dim_Builds").await, 10);
    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Dim_Status").await, 10);
    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Dim_Type").await, 10);
    assert_eq!(
        count(
            &warehouse,
            "SELECT COUNT(*) FROM Fact_ChangeHistory WHERE Build_ID < 1 OR Build_ID > 10"
        )
        .await,
        0,
        "every fact Build_ID must be in 1..=10"
    );
    warehouse.close().await;
}

#[tokio::test]
async fn test_sqlite_no_orphans() {
    let dir = scratch_dir();
    let (warehouse, _) = seed_warehouse(&sqlite_config(dir.path())).await;

    let orphans = [
        "SELECT COUNT(*) FROM Dim_UserRole r LEFT JOIN Dim_Users u ON r.User_ID = u.User_ID WHERE u.User_ID IS NULL",
        "SELECT COUNT(*) FROM Dim_Status s LEFT JOIN Dim_Builds b ON s.Build_ID = b.Build_ID WHERE b.Build_ID IS NULL",
        "SELECT COUNT(*) FROM Dim_Type t LEFT JOIN Dim_Builds b ON t.Build_ID = b.Build_ID WHERE b.Build_ID IS NULL",
        "SELECT COUNT(*) FROM Fact_ChangeHistory f LEFT JOIN Dim_Users u ON f.User_ID = u.User_ID WHERE u.User_ID IS NULL",
        "SELECT COUNT(*) FROM Fact_ChangeHistory f LEFT JOIN Dim_Builds b ON f.Build_ID = b.Build_ID WHERE b.Build_ID IS NULL",
    ];
    for sql in orphans {
        assert_eq!(count(&warehouse, sql).await, 0, "orphans found by: {}", sql);
    }
    warehouse.close().await;
}

#[tokio::test]
async fn test_sqlite_rerun_replaces_data() {
    let dir = scratch_dir();
    let config = sqlite_config(dir.path());

    let (warehouse, _) = seed_warehouse(&config).await;
    warehouse.close().await;
    let (warehouse, _) = seed_warehouse(&config).await;

    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Dim_Users").await, 10);
    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Fact_ChangeHistory").await, 100);
    assert_eq!(
        count(&warehouse, "SELECT COUNT(DISTINCT Change_ID) FROM Fact_ChangeHistory").await,
        100
    );
    warehouse.close().await;
}

#[tokio::test]
async fn test_sqlite_verify_passes_after_seeding() {
    let dir = scratch_dir();
    let config = sqlite_config(dir.path());
    let (warehouse, _) = seed_warehouse(&config).await;

    let report = verify(&warehouse, &config, fixed_base_time()).await.unwrap();
    assert!(report.passed(), "{}", report.summary());
    warehouse.close().await;
}

#[tokio::test]
async fn test_sqlite_verify_flags_missing_rows() {
    let dir = scratch_dir();
    let config = sqlite_config(dir.path());
    let (warehouse, _) = seed_warehouse(&config).await;

    warehouse
        .execute("DELETE FROM Fact_ChangeHistory WHERE Change_ID > 90")
        .await
        .unwrap();

    let report = verify(&warehouse, &config, fixed_base_time()).await.unwrap();
    assert!(!report.passed());
    let failed: Vec<&str> = report
        .checks
        .iter()
        .filter(|c| !c.passed)
        .map(|c| c.name.as_str())
        .collect();
    assert!(failed.contains(&"Fact_ChangeHistory row count"));
    warehouse.close().await;
}

#[tokio::test]
async fn test_sqlite_table_callback_reports_each_table() {
    let dir = scratch_dir();
    let config = sqlite_config(dir.path());
    let warehouse = provision(&config).await.unwrap();
    let data = engine::generate(&config, 7, fixed_base_time(), None).unwrap();

    let reported = std::sync::Mutex::new(Vec::new());
    let on_table_done = |table: &str, rows: usize| {
        reported.lock().unwrap().push((table.to_string(), rows));
    };
    let total = insert_direct(&data, &warehouse, Some(&on_table_done))
        .await
        .unwrap();

    assert_eq!(total, 150);
    assert_eq!(
        reported.into_inner().unwrap(),
        vec![
            (USERS.to_string(), 10),
            (USER_ROLE.to_string(), 10),
            (BUILDS.to_string(), 10),
            (STATUS.to_string(), 10),
            (TYPE.to_string(), 10),
            (CHANGE_HISTORY.to_string(), 100),
        ]
    );
    warehouse.close().await;
}

#[tokio::test]
async fn test_sqlite_zero_facts_with_empty_dimensions() {
    let dir = scratch_dir();
    let mut config = sqlite_config(dir.path());
    config.users_count = 0;
    config.builds_count = 0;
    config.fact_rows = 0;

    let (warehouse, data) = seed_warehouse(&config).await;
    assert_eq!(data.total_rows(), 0);
    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Dim_Users").await, 0);

    let report = verify(&warehouse, &config, fixed_base_time()).await.unwrap();
    assert!(report.passed(), "{}", report.summary());
    warehouse.close().await;
}

#[tokio::test]
async fn test_sqlite_failed_batch_keeps_earlier_tables() {
    let dir = scratch_dir();
    let config = sqlite_config(dir.path());
    let warehouse = provision(&config).await.unwrap();
    let data = engine::generate(&config, 1, fixed_base_time(), None).unwrap();

    // A pre-existing fact row collides with Change_ID 1 of the load.
    warehouse
        .execute("INSERT INTO Dim_Users (User_ID, Login, Full_Name, Registration_Date) VALUES (999, 'x', 'x', '2024-01-01 00:00:00')")
        .await
        .unwrap();
    warehouse
        .execute("INSERT INTO Dim_Builds (Build_ID, Version, Link, Creation_Date) VALUES (999, 'v0', 'l', '2024-01-01 00:00:00')")
        .await
        .unwrap();
    warehouse
        .execute("INSERT INTO Fact_ChangeHistory (Change_ID, Ex_Status, New_Status, Change_Date, User_ID, Build_ID) VALUES (1, 'Testing', 'Release', '2024-01-01 00:00:00', 999, 999)")
        .await
        .unwrap();

    let err = insert_direct(&data, &warehouse, None).await.unwrap_err();
    match err {
        BuildHistError::InsertFailed {
            table, row_index, ..
        } => {
            assert_eq!(table, CHANGE_HISTORY);
            assert_eq!(row_index, 0);
        }
        other => panic!("expected InsertFailed, got {}", other),
    }

    // No transaction: dimension rows loaded before the failure stay.
    assert_eq!(count(&warehouse, "SELECT COUNT(*) FROM Dim_Type").await, 10);
    warehouse.close().await;
}

#[tokio::test]
async fn test_sqlite_open_missing_database_fails() {
    let dir = scratch_dir();
    let config = sqlite_config(dir.path());

    let result = Warehouse::open(&config).await;
    assert!(matches!(result, Err(BuildHistError::Connection { .. })));
}

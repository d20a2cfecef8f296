//! # Warehouse Verification
//!
//! Re-checks a populated warehouse against the shape a generation run
//! promises: exact row counts, dense 1-based ids, no orphaned references,
//! fact statuses from the status enumeration and timestamps inside the
//! lookback window.
//!
//! Every check is a single `SELECT COUNT(*)` so the same statements run on
//! all backends and decode identically.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::WarehouseConfig;
use crate::db::Warehouse;
use crate::error::{truncate_sql, BuildHistError, Result};
use crate::generate::providers::window_start;
use crate::generate::value::TIMESTAMP_FORMAT;
use crate::schema::types::DatabaseSchema;
use crate::schema::warehouse::{
    warehouse_schema, BUILDS, CHANGE_HISTORY, STATUS, STATUSES, TYPE, USERS, USER_ROLE,
};

/// Outcome of one verification query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub expected: i64,
    pub actual: i64,
    pub passed: bool,
}

/// All checks run against one warehouse.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub database: String,
    pub as_of: String,
    pub checks: Vec<CheckResult>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    /// Plain-text rendering, one line per check.
    pub fn summary(&self) -> String {
        let mut out = format!("Verification of {} (as of {})\n", self.database, self.as_of);
        for check in &self.checks {
            let mark = if check.passed { "ok  " } else { "FAIL" };
            out.push_str(&format!(
                "  [{}] {}: expected {}, got {}\n",
                mark, check.name, check.expected, check.actual
            ));
        }
        out.push_str(&format!(
            "{} of {} checks passed\n",
            self.checks.len() - self.failed_count(),
            self.checks.len()
        ));
        out
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BuildHistError::Config {
            message: format!("Failed to serialize verification report: {}", e),
        })
    }
}

/// A check before it has been run: the SQL and the count it must return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckQuery {
    pub name: String,
    pub sql: String,
    pub expected: i64,
}

impl CheckQuery {
    fn new(name: impl Into<String>, sql: String, expected: i64) -> Self {
        Self {
            name: name.into(),
            sql,
            expected,
        }
    }
}

/// The id column and expected row count of each table.
fn expected_rows(config: &WarehouseConfig) -> [(&'static str, &'static str, usize); 6] {
    [
        (USERS, "User_ID", config.users_count),
        (USER_ROLE, "User_ID", config.users_count),
        (BUILDS, "Build_ID", config.builds_count),
        (STATUS, "Build_ID", config.builds_count),
        (TYPE, "Build_ID", config.builds_count),
        (CHANGE_HISTORY, "Change_ID", config.fact_rows),
    ]
}

pub fn row_count_sql(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", table)
}

pub fn distinct_count_sql(table: &str, column: &str) -> String {
    format!("SELECT COUNT(DISTINCT {}) FROM {}", column, table)
}

/// Rows whose id falls outside `1..=max`.
pub fn out_of_range_sql(table: &str, column: &str, max: usize) -> String {
    format!(
        "SELECT COUNT(*) FROM {} WHERE {} < 1 OR {} > {}",
        table, column, column, max
    )
}

/// Rows of `table` whose `column` matches no `parent.parent_column`.
pub fn orphan_sql(table: &str, column: &str, parent: &str, parent_column: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM {t} c LEFT JOIN {p} p ON c.{col} = p.{pcol} WHERE p.{pcol} IS NULL",
        t = table,
        p = parent,
        col = column,
        pcol = parent_column
    )
}

/// Rows whose `column` is not one of `allowed`.
pub fn outside_domain_sql(table: &str, column: &str, allowed: &[&str]) -> String {
    let list = allowed
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT COUNT(*) FROM {} WHERE {} NOT IN ({})",
        table, column, list
    )
}

/// Rows whose `column` lies outside `[start, end]`.
pub fn outside_window_sql(
    table: &str,
    column: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> String {
    format!(
        "SELECT COUNT(*) FROM {} WHERE {} < '{}' OR {} > '{}'",
        table,
        column,
        start.format(TIMESTAMP_FORMAT),
        column,
        end.format(TIMESTAMP_FORMAT)
    )
}

/// Build every check for a warehouse generated with `config`, with the
/// lookback window ending at `as_of`.
pub fn plan_checks(
    schema: &DatabaseSchema,
    config: &WarehouseConfig,
    as_of: NaiveDateTime,
) -> Vec<CheckQuery> {
    let mut checks = Vec::new();

    for (table, id_column, rows) in expected_rows(config) {
        checks.push(CheckQuery::new(
            format!("{} row count", table),
            row_count_sql(table),
            rows as i64,
        ));
        checks.push(CheckQuery::new(
            format!("{}.{} distinct", table, id_column),
            distinct_count_sql(table, id_column),
            rows as i64,
        ));
        checks.push(CheckQuery::new(
            format!("{}.{} outside 1..={}", table, id_column, rows),
            out_of_range_sql(table, id_column, rows),
            0,
        ));
    }

    for table in schema.tables.values() {
        for fk in &table.foreign_keys {
            let (Some(column), Some(parent_column)) =
                (fk.source_columns.first(), fk.referenced_columns.first())
            else {
                continue;
            };
            let name = fk
                .name
                .clone()
                .unwrap_or_else(|| format!("{}.{}", table.name, column));
            checks.push(CheckQuery::new(
                format!("{} orphans", name),
                orphan_sql(&table.name, column, &fk.referenced_table, parent_column),
                0,
            ));
        }
    }

    for column in ["Ex_Status", "New_Status"] {
        checks.push(CheckQuery::new(
            format!("{}.{} outside status set", CHANGE_HISTORY, column),
            outside_domain_sql(CHANGE_HISTORY, column, STATUSES),
            0,
        ));
    }

    let start = window_start(as_of, config.years_back);
    for table in schema.tables.values() {
        for column in table.columns.values().filter(|c| c.data_type.is_temporal()) {
            checks.push(CheckQuery::new(
                format!("{}.{} outside lookback window", table.name, column.name),
                outside_window_sql(&table.name, &column.name, start, as_of),
                0,
            ));
        }
    }

    checks
}

/// Run every check against an open warehouse.
///
/// `as_of` is the end of the lookback window and should be the base time of
/// the run that populated the warehouse. The window start moves with it, so
/// checking an old warehouse against the current time flags its oldest rows.
pub async fn verify(
    warehouse: &Warehouse,
    config: &WarehouseConfig,
    as_of: NaiveDateTime,
) -> Result<VerifyReport> {
    config.validate()?;

    let schema = warehouse_schema(&config.database);
    let queries = plan_checks(&schema, config, as_of);
    let mut checks = Vec::with_capacity(queries.len());

    for query in queries {
        debug!(check = %query.name, sql = %query.sql, "Running check");
        let actual = warehouse
            .fetch_count(&query.sql)
            .await
            .map_err(|e| BuildHistError::Verify {
                check: query.name.clone(),
                sql_preview: truncate_sql(&query.sql, 200),
                source: e,
            })?;
        checks.push(CheckResult {
            passed: actual == query.expected,
            name: query.name,
            expected: query.expected,
            actual,
        });
    }

    let report = VerifyReport {
        database: config.database.clone(),
        as_of: as_of.format(TIMESTAMP_FORMAT).to_string(),
        checks,
    };
    info!(
        database = %report.database,
        checks = report.checks.len(),
        failed = report.failed_count(),
        "Verification finished"
    );
    Ok(report)
}

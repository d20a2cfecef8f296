//! # Direct Database Insertion
//!
//! Loads generated rows into the provisioned warehouse, table by table in
//! population order. Rows are sent as multi-row `INSERT ... VALUES (...),
//! (...)` statements of up to `INSERT_BATCH_SIZE` rows.
//!
//! No transaction wraps the load. Each statement autocommits, so if a batch
//! fails the rows of earlier batches stay in place and the error names the
//! table and the index of the first row of the failed batch.

use tracing::{debug, info};

use crate::db::Warehouse;
use crate::error::{truncate_sql, BuildHistError, Result};
use crate::generate::engine::{GeneratedData, Row};

/// Batch size for multi-row INSERT statements.
const INSERT_BATCH_SIZE: usize = 100;

/// Callback invoked once per table after its last row is inserted, with the
/// table name and the number of rows inserted into it.
pub type TableDoneCallback<'a> = &'a (dyn Fn(&str, usize) + Send + Sync);

/// Insert generated data into an open warehouse.
///
/// Returns the total number of rows inserted. Tables with no rows are
/// skipped, but still reported to `on_table_done` with a count of 0.
pub async fn insert_direct(
    data: &GeneratedData,
    warehouse: &Warehouse,
    on_table_done: Option<TableDoneCallback<'_>>,
) -> Result<usize> {
    let mut total_inserted = 0usize;

    for (table_name, rows) in &data.tables {
        let inserted = insert_table(warehouse, table_name, rows).await?;
        total_inserted += inserted;

        info!(table = %table_name, rows = inserted, "Table populated");
        if let Some(cb) = on_table_done {
            cb(table_name, inserted);
        }
    }

    Ok(total_inserted)
}

async fn insert_table(warehouse: &Warehouse, table_name: &str, rows: &[Row]) -> Result<usize> {
    let Some(first) = rows.first() else {
        return Ok(0);
    };
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut inserted = 0usize;
    for chunk in rows.chunks(INSERT_BATCH_SIZE) {
        let sql = build_batched_insert(table_name, &columns, chunk);

        let affected = warehouse
            .execute(&sql)
            .await
            .map_err(|e| BuildHistError::InsertFailed {
                table: table_name.to_string(),
                row_index: inserted,
                message: "Batched INSERT failed".to_string(),
                sql_preview: truncate_sql(&sql, 200),
                source: e,
            })?;

        debug!(table = %table_name, batch_rows = chunk.len(), affected, "Inserted batch");
        inserted += chunk.len();
    }

    Ok(inserted)
}

/// Build a batched multi-row INSERT statement.
///
/// Produces: `INSERT INTO Table (Col1, Col2) VALUES (v1, v2), (v3, v4)`
pub fn build_batched_insert(table_name: &str, columns: &[&str], rows: &[Row]) -> String {
    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ",
        table_name,
        columns.join(", ")
    );

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for (j, col) in columns.iter().enumerate() {
            if j > 0 {
                sql.push_str(", ");
            }
            let literal = row
                .get(*col)
                .map(|v| v.to_sql_literal())
                .unwrap_or_else(|| "NULL".to_string());
            sql.push_str(&literal);
        }
        sql.push(')');
    }

    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::value::Value;
    use std::borrow::Cow;

    fn role_row(user_id: i64, role: &'static str) -> Row {
        let mut row = Row::new();
        row.insert("User_ID".to_string(), Value::Int(user_id));
        row.insert("Role_Name".to_string(), Value::String(Cow::Borrowed(role)));
        row
    }

    #[test]
    fn test_build_batched_insert() {
        let rows = [role_row(1, "Admin"), role_row(2, "Tester")];
        let sql = build_batched_insert("Dim_UserRole", &["User_ID", "Role_Name"], &rows);

        assert_eq!(
            sql,
            "INSERT INTO Dim_UserRole (User_ID, Role_Name) VALUES (1, 'Admin'), (2, 'Tester')"
        );
    }

    #[test]
    fn test_missing_column_becomes_null() {
        let mut row = Row::new();
        row.insert("Build_ID".to_string(), Value::Int(3));

        let sql = build_batched_insert("Dim_Builds", &["Build_ID", "Changelog"], &[row]);
        assert!(sql.ends_with("VALUES (3, NULL)"));
    }

    #[test]
    fn test_timestamps_are_quoted_literals() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let mut row = Row::new();
        row.insert("User_ID".to_string(), Value::Int(1));
        row.insert("Registration_Date".to_string(), Value::Timestamp(ts));

        let sql = build_batched_insert("Dim_Users", &["User_ID", "Registration_Date"], &[row]);
        assert!(sql.contains("(1, '2024-05-01 08:30:00')"));
    }

    #[test]
    fn test_batches_split_at_batch_size() {
        let rows: Vec<Row> = (1..=250).map(|id| role_row(id, "Developer")).collect();
        let chunks: Vec<usize> = rows.chunks(INSERT_BATCH_SIZE).map(|c| c.len()).collect();
        assert_eq!(chunks, vec![100, 100, 50]);
    }
}

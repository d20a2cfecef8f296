//! # Build Change-History Warehouse
//!
//! The star schema this tool provisions: five dimension tables describing
//! users and builds, and one fact table recording build status changes.
//!
//! ```text
//! Dim_UserRole ──► Dim_Users ◄── Fact_ChangeHistory ──► Dim_Builds ◄── Dim_Status
//!                                                            ▲
//!                                                            └──────── Dim_Type
//! ```

use crate::schema::types::{Column, DataType, DatabaseSchema, Table};

pub const USERS: &str = "Dim_Users";
pub const USER_ROLE: &str = "Dim_UserRole";
pub const BUILDS: &str = "Dim_Builds";
pub const STATUS: &str = "Dim_Status";
pub const TYPE: &str = "Dim_Type";
pub const CHANGE_HISTORY: &str = "Fact_ChangeHistory";

/// Roles assigned to users, one per user.
pub const ROLES: &[&str] = &["Developer", "Tester", "Admin", "Manager"];

/// Build statuses, used both by `Dim_Status` and the fact table.
pub const STATUSES: &[&str] = &["Testing", "Release", "Rejected"];

/// Build types, one per build.
pub const BUILD_TYPES: &[&str] = &["dev", "beta", "release"];

/// Build the warehouse schema.
///
/// Tables are declared in population order: every table appears after the
/// tables it references.
pub fn warehouse_schema(database_name: &str) -> DatabaseSchema {
    let mut schema = DatabaseSchema::new(database_name.to_string());

    schema.add_table(
        Table::new(USERS.to_string())
            .column(Column::new("User_ID", DataType::Integer))
            .column(Column::new("Login", DataType::VarChar(50)))
            .column(Column::new("Full_Name", DataType::VarChar(100)))
            .column(Column::new("Registration_Date", DataType::DateTime))
            .primary_key("PK_Dim_Users", &["User_ID"]),
    );

    schema.add_table(
        Table::new(USER_ROLE.to_string())
            .column(Column::new("User_ID", DataType::Integer))
            .column(Column::new("Role_Name", DataType::VarChar(50)))
            .primary_key("PK_Dim_UserRole", &["User_ID"])
            .foreign_key("FK_UserRole_User", "User_ID", USERS, "User_ID"),
    );

    schema.add_table(
        Table::new(BUILDS.to_string())
            .column(Column::new("Build_ID", DataType::Integer))
            .column(Column::new("Version", DataType::VarChar(50)))
            .column(Column::new("Link", DataType::VarChar(100)))
            .column(Column::new("Creation_Date", DataType::DateTime))
            .column(Column::new("Changelog", DataType::Text).nullable())
            .primary_key("PK_Dim_Builds", &["Build_ID"]),
    );

    schema.add_table(
        Table::new(STATUS.to_string())
            .column(Column::new("Build_ID", DataType::Integer))
            .column(Column::new("Status_Name", DataType::VarChar(50)))
            .primary_key("PK_Dim_Status", &["Build_ID"])
            .foreign_key("FK_Status_Build", "Build_ID", BUILDS, "Build_ID"),
    );

    schema.add_table(
        Table::new(TYPE.to_string())
            .column(Column::new("Build_ID", DataType::Integer))
            .column(Column::new("Type_Name", DataType::VarChar(50)))
            .primary_key("PK_Dim_Type", &["Build_ID"])
            .foreign_key("FK_Type_Build", "Build_ID", BUILDS, "Build_ID"),
    );

    schema.add_table(
        Table::new(CHANGE_HISTORY.to_string())
            .column(Column::new("Change_ID", DataType::Integer))
            .column(Column::new("Ex_Status", DataType::VarChar(50)))
            .column(Column::new("New_Status", DataType::VarChar(50)))
            .column(Column::new("Change_Date", DataType::DateTime))
            .column(Column::new("User_ID", DataType::Integer))
            .column(Column::new("Build_ID", DataType::Integer))
            .primary_key("PK_Fact_ChangeHistory", &["Change_ID"])
            .foreign_key("FK_Fact_User", "User_ID", USERS, "User_ID")
            .foreign_key("FK_Fact_Build", "Build_ID", BUILDS, "Build_ID"),
    );

    schema
}

use anyhow::Result;

use buildhist_core::config::DEFAULT_DATABASE;
use buildhist_core::schema::ddl::{create_database_sql, drop_database_sql, TableScript};
use buildhist_core::schema::warehouse::warehouse_schema;
use buildhist_core::DatabaseType;

use crate::args::{DdlArgs, Dialect};

pub fn run(args: &DdlArgs) -> Result<()> {
    let database = args.database.as_deref().unwrap_or(DEFAULT_DATABASE);
    let db_type = match args.dialect {
        Dialect::Postgres => DatabaseType::PostgreSQL,
        Dialect::Mysql => DatabaseType::MySQL,
        Dialect::Sqlite => DatabaseType::SQLite,
    };
    print!("{}", render(database, db_type)?);
    Ok(())
}

/// Database-level statements (server backends only) followed by the table
/// script.
fn render(database: &str, db_type: DatabaseType) -> Result<String> {
    let mut out = String::new();
    for stmt in [
        drop_database_sql(database, db_type),
        create_database_sql(database, db_type),
    ]
    .into_iter()
    .flatten()
    {
        out.push_str(&stmt);
        out.push_str(";\n\n");
    }

    let script = TableScript::build(&warehouse_schema(database), db_type)?;
    out.push_str(&script.to_script());
    Ok(out)
}

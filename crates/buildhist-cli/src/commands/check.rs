use std::process;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use buildhist_core::check::verify;
use buildhist_core::generate::engine::now_base_time;
use buildhist_core::generate::value::TIMESTAMP_FORMAT;
use buildhist_core::Warehouse;

use crate::args::{CheckArgs, CheckFormat};
use crate::commands::resolve_config;

/// Verify a populated warehouse.
///
/// Exit codes:
///   0: every check passed
///   1: at least one check failed, or an error
pub async fn run(args: &CheckArgs) -> Result<()> {
    let config = resolve_config(&args.connection, &args.sizes, None)?;
    let as_of = match args.as_of.as_deref() {
        Some(s) => NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .with_context(|| format!("Invalid --as-of '{}', expected YYYY-MM-DD HH:MM:SS", s))?,
        None => now_base_time(),
    };

    let warehouse = Warehouse::open(&config)
        .await
        .with_context(|| format!("Failed to open database '{}'", config.database))?;
    let report = verify(&warehouse, &config, as_of).await;
    warehouse.close().await;
    let report = report?;

    match args.format {
        CheckFormat::Json => println!("{}", report.to_json()?),
        CheckFormat::Text => print!("{}", report.summary()),
    }

    if !report.passed() {
        process::exit(1);
    }
    Ok(())
}

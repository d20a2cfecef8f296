use std::io::Write;
use std::sync::Mutex;

use anyhow::{Context, Result};
use indicatif::ProgressBar;

use buildhist_core::generate::engine::{self, now_base_time, resolve_seed};
use buildhist_core::generate::value::TIMESTAMP_FORMAT;
use buildhist_core::output::direct::insert_direct;
use buildhist_core::provision::provision;

use crate::args::GenerateArgs;
use crate::commands::{resolve_config, row_bar, spinner};

pub async fn run(args: &GenerateArgs) -> Result<()> {
    let config = resolve_config(&args.connection, &args.sizes, args.seed)?;
    let seed = resolve_seed(&config);
    let base_time = now_base_time();

    // Phase 1: Provision
    let pb = spinner("1/3", &format!("Provisioning {}...", config.database))?;
    let warehouse = provision(&config)
        .await
        .with_context(|| format!("Failed to provision database '{}'", config.database))?;
    pb.finish_with_message(format!(
        "Provisioning {}... ✓ {}",
        config.database,
        warehouse.location()
    ));
    eprintln!("Schema created.");

    // Phase 2: Generate
    let total_rows = 2 * config.users_count + 3 * config.builds_count + config.fact_rows;
    let pb2 = row_bar("2/3", "Generating data", total_rows)?;
    let data = engine::generate(
        &config,
        seed,
        base_time,
        Some(&|_table, current, _total| {
            pb2.set_position(current as u64);
        }),
    )?;
    pb2.finish_with_message(format!("Generating data... ✓ ({} rows)", total_rows));

    // Phase 3: Insert
    let pb3 = spinner("3/3", "Inserting into database...")?;
    let stderr = Mutex::new(std::io::stderr());
    let on_table_done = table_reporter(&pb3, &stderr);
    let inserted = insert_direct(&data, &warehouse, Some(&on_table_done))
        .await
        .context("Failed to insert generated data")?;
    pb3.finish_with_message(format!("Inserting into database... ✓ ({} rows)", inserted));
    warehouse.close().await;

    eprintln!(
        "\n✓ Inserted {} rows across {} tables into {}",
        inserted,
        data.tables.len(),
        config.database
    );
    eprintln!(
        "Replay with --seed {}; verify with: buildhist check --as-of '{}'",
        seed,
        base_time.format(TIMESTAMP_FORMAT)
    );

    Ok(())
}

/// Per-table progress line, written around the spinner so it is emitted
/// even when the bar is hidden (stderr is not a terminal).
fn table_reporter<'a, W: Write + Send>(
    pb: &'a ProgressBar,
    out: &'a Mutex<W>,
) -> impl Fn(&str, usize) + Send + Sync + 'a {
    move |table: &str, rows: usize| {
        pb.suspend(|| {
            if let Ok(mut w) = out.lock() {
                let _ = writeln!(w, "Inserted {} rows into {}", rows, table);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildhist_core::schema::warehouse::{
        BUILDS, CHANGE_HISTORY, STATUS, TYPE, USERS, USER_ROLE,
    };
    use buildhist_testutil::{fixed_base_time, scratch_dir, sqlite_config};

    #[tokio::test]
    async fn test_table_lines_reach_non_terminal_output() {
        let dir = scratch_dir();
        let config = sqlite_config(dir.path());
        let warehouse = provision(&config).await.unwrap();
        let data = engine::generate(&config, 1, fixed_base_time(), None).unwrap();

        let pb = ProgressBar::hidden();
        let out = Mutex::new(Vec::<u8>::new());
        let on_table_done = table_reporter(&pb, &out);
        insert_direct(&data, &warehouse, Some(&on_table_done))
            .await
            .unwrap();
        warehouse.close().await;
        drop(on_table_done);

        let text = String::from_utf8(out.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                format!("Inserted 10 rows into {}", USERS),
                format!("Inserted 10 rows into {}", USER_ROLE),
                format!("Inserted 10 rows into {}", BUILDS),
                format!("Inserted 10 rows into {}", STATUS),
                format!("Inserted 10 rows into {}", TYPE),
                format!("Inserted 100 rows into {}", CHANGE_HISTORY),
            ]
        );
    }
}

use anyhow::Result;
use comfy_table::Table as ComfyTable;

use buildhist_core::config::read_config;
use buildhist_core::generate::engine::{self, now_base_time};
use buildhist_core::WarehouseConfig;

use crate::args::PreviewArgs;

/// Longest cell rendered before truncation.
const MAX_CELL_CHARS: usize = 40;

pub fn run(args: &PreviewArgs) -> Result<()> {
    let file = read_config(std::path::Path::new("."))?;
    let config = WarehouseConfig {
        users_count: args.rows,
        builds_count: args.rows,
        fact_rows: args.rows,
        ..WarehouseConfig::from_file(file.as_ref())
    };

    let data = engine::generate(&config, args.seed, now_base_time(), None)?;

    for (table_name, rows) in &data.tables {
        if rows.is_empty() {
            continue;
        }

        println!("━━━ {} ({} rows) ━━━", table_name, rows.len());

        let columns: Vec<&String> = rows[0].keys().collect();

        let mut t = ComfyTable::new();
        t.set_header(columns.iter().map(|c| c.as_str()).collect::<Vec<_>>());

        for row in rows {
            let values: Vec<String> = columns
                .iter()
                .map(|col| {
                    row.get(*col)
                        .map(|v| truncate_cell(&v.to_string()))
                        .unwrap_or_else(|| "NULL".to_string())
                })
                .collect();
            t.add_row(values);
        }

        println!("{}\n", t);
    }

    Ok(())
}

fn truncate_cell(s: &str) -> String {
    if s.chars().count() > MAX_CELL_CHARS {
        let head: String = s.chars().take(MAX_CELL_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

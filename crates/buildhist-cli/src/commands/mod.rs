pub mod check;
pub mod ddl;
pub mod generate;
pub mod graph;
pub mod preview;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use buildhist_core::config::read_config;
use buildhist_core::WarehouseConfig;

use crate::args::{ConnectionArgs, SizeArgs};

/// Layer CLI flags (and `BUILDHIST_SERVER`) over buildhist.toml and defaults.
pub fn resolve_config(
    connection: &ConnectionArgs,
    sizes: &SizeArgs,
    seed: Option<u64>,
) -> Result<WarehouseConfig> {
    let file = read_config(Path::new("."))?;
    let mut config = WarehouseConfig::from_file(file.as_ref());

    if let Some(ref server) = connection.server {
        config.server = server.clone();
    }
    if let Some(ref database) = connection.database {
        config.database = database.clone();
    }
    if let Some(users) = sizes.users {
        config.users_count = users;
    }
    if let Some(builds) = sizes.builds {
        config.builds_count = builds;
    }
    if let Some(fact_rows) = sizes.fact_rows {
        config.fact_rows = fact_rows;
    }
    if let Some(years_back) = sizes.years_back {
        config.years_back = years_back;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

/// A ticking spinner labelled `[step] message`.
pub fn spinner(step: &str, message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} [{prefix}] {msg}")?);
    pb.set_prefix(step.to_string());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// A bar for `len` rows labelled `[step] message`.
pub fn row_bar(step: &str, message: &str, len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.cyan}} [{}] {}... {{bar:40.cyan/dim}} {{pos}}/{{len}} ({{eta}})",
                step, message
            ))?
            .progress_chars("█▓░"),
    );
    Ok(pb)
}

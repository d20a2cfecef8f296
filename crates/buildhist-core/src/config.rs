//! # Configuration
//!
//! `WarehouseConfig` is the explicit parameter set passed into provisioning
//! and generation. It is assembled from, lowest precedence first:
//!
//! 1. built-in defaults (`WarehouseConfig::default()`)
//! 2. an optional `buildhist.toml` in the working directory
//! 3. the `BUILDHIST_SERVER` environment variable (CLI, via clap `env`)
//! 4. CLI flags
//!
//! Example `buildhist.toml`:
//!
//! ```toml
//! [database]
//! server = "postgres://localhost"
//! name = "CAD_Builds_DW"
//!
//! [generate]
//! users = 50
//! builds = 300
//! fact_rows = 12000
//! years_back = 5
//! seed = 42
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BuildHistError, Result};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "buildhist.toml";

pub const DEFAULT_SERVER: &str = "postgres://localhost";
pub const DEFAULT_DATABASE: &str = "CAD_Builds_DW";
pub const DEFAULT_USERS_COUNT: usize = 50;
pub const DEFAULT_BUILDS_COUNT: usize = 300;
pub const DEFAULT_FACT_ROWS: usize = 12_000;
pub const DEFAULT_YEARS_BACK: u32 = 5;

/// Longest lookback accepted. MySQL `DATETIME` starts at 1000-01-01, so the
/// window must not reach further back than that from the present.
pub const MAX_YEARS_BACK: u32 = 1000;

/// Everything a provisioning + generation run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Server URL without a database path (`postgres://host`, `mysql://host`,
    /// `sqlite://<dir>`).
    pub server: String,
    /// Name of the database to drop and recreate.
    pub database: String,
    pub users_count: usize,
    pub builds_count: usize,
    pub fact_rows: usize,
    /// Lookback window for generated timestamps, in 365-day years.
    pub years_back: u32,
    /// Fixed RNG seed. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            users_count: DEFAULT_USERS_COUNT,
            builds_count: DEFAULT_BUILDS_COUNT,
            fact_rows: DEFAULT_FACT_ROWS,
            years_back: DEFAULT_YEARS_BACK,
            seed: None,
        }
    }
}

impl WarehouseConfig {
    /// Defaults overlaid with whatever the config file sets.
    pub fn from_file(file: Option<&BuildHistConfig>) -> Self {
        let mut config = Self::default();
        let Some(file) = file else {
            return config;
        };

        if let Some(ref server) = file.database.server {
            config.server = server.clone();
        }
        if let Some(ref name) = file.database.name {
            config.database = name.clone();
        }
        if let Some(users) = file.generate.users {
            config.users_count = users;
        }
        if let Some(builds) = file.generate.builds {
            config.builds_count = builds;
        }
        if let Some(fact_rows) = file.generate.fact_rows {
            config.fact_rows = fact_rows;
        }
        if let Some(years_back) = file.generate.years_back {
            config.years_back = years_back;
        }
        if file.generate.seed.is_some() {
            config.seed = file.generate.seed;
        }
        config
    }

    /// Reject parameter combinations that cannot produce a valid warehouse.
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(BuildHistError::Config {
                message: "Database name must not be empty".to_string(),
            });
        }
        if !self
            .database
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(BuildHistError::Config {
                message: format!(
                    "Database name '{}' may only contain ASCII letters, digits and '_'",
                    self.database
                ),
            });
        }
        if self.server.is_empty() {
            return Err(BuildHistError::Config {
                message: "Server URL must not be empty".to_string(),
            });
        }
        if self.fact_rows > 0 && (self.users_count == 0 || self.builds_count == 0) {
            return Err(BuildHistError::Config {
                message: format!(
                    "Cannot generate {} change events with {} users and {} builds: \
                     every event references a user and a build",
                    self.fact_rows, self.users_count, self.builds_count
                ),
            });
        }
        if self.years_back > MAX_YEARS_BACK {
            return Err(BuildHistError::Config {
                message: format!(
                    "years_back = {} exceeds the supported maximum of {}",
                    self.years_back, MAX_YEARS_BACK
                ),
            });
        }
        // IDs are stored in INT columns.
        let max_id = i32::MAX as usize;
        for (name, count) in [
            ("users", self.users_count),
            ("builds", self.builds_count),
            ("fact_rows", self.fact_rows),
        ] {
            if count > max_id {
                return Err(BuildHistError::Config {
                    message: format!("{} = {} exceeds the INT id range", name, count),
                });
            }
        }
        Ok(())
    }
}

/// Top-level buildhist.toml structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildHistConfig {
    pub database: DatabaseSection,
    pub generate: GenerateSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub server: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateSection {
    pub users: Option<usize>,
    pub builds: Option<usize>,
    pub fact_rows: Option<usize>,
    pub years_back: Option<u32>,
    pub seed: Option<u64>,
}

/// Read and parse a buildhist.toml file from the given directory.
///
/// Returns `None` if the file doesn't exist (config is optional).
/// Returns an error if the file exists but can't be parsed.
pub fn read_config(dir: &Path) -> Result<Option<BuildHistConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| BuildHistError::Config {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let config: BuildHistConfig = toml::from_str(&content).map_err(|e| BuildHistError::Config {
        message: format!("Failed to parse {}: {}", path.display(), e),
    })?;

    Ok(Some(config))
}

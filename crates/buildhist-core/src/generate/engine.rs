use chrono::{NaiveDateTime, Timelike};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::WarehouseConfig;
use crate::error::{BuildHistError, Result};
use crate::generate::foreign_key::ForeignKeyPool;
use crate::generate::providers::{self, pick, random_datetime_within_years};
use crate::generate::value::Value;
use crate::schema::warehouse::{
    BUILDS, BUILD_TYPES, CHANGE_HISTORY, ROLES, STATUS, STATUSES, TYPE, USERS, USER_ROLE,
};

/// One generated row, columns in declaration order.
pub type Row = IndexMap<String, Value>;

/// The result of generating data for all tables.
#[derive(Debug)]
pub struct GeneratedData {
    /// Table name → rows, in population order (parents before children).
    pub tables: IndexMap<String, Vec<Row>>,
    /// Seed the RNG was created from; replaying it with the same base time
    /// reproduces every row.
    pub seed: u64,
    /// "Now" for this run. Every timestamp lies at or before it.
    pub base_time: NaiveDateTime,
}

impl GeneratedData {
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(|rows| rows.len()).sum()
    }

    pub fn row_count(&self, table_name: &str) -> usize {
        self.tables.get(table_name).map(|rows| rows.len()).unwrap_or(0)
    }
}

/// Progress reporting batch size, avoids terminal I/O overhead on every row.
const PROGRESS_BATCH_SIZE: usize = 100;

/// Seed from the config, or from the clock when none is pinned.
pub fn resolve_seed(config: &WarehouseConfig) -> u64 {
    config.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    })
}

/// Current local wall-clock time, truncated to whole seconds.
pub fn now_base_time() -> NaiveDateTime {
    let now = chrono::Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

struct Progress<'a> {
    callback: Option<&'a dyn Fn(&str, usize, usize)>,
    generated: usize,
    total: usize,
}

impl Progress<'_> {
    fn tick(&mut self, table_name: &str) {
        self.generated += 1;
        if let Some(cb) = self.callback {
            if self.generated % PROGRESS_BATCH_SIZE == 0 || self.generated == self.total {
                cb(table_name, self.generated, self.total);
            }
        }
    }
}

/// Generate every warehouse table in memory.
///
/// Dimension tables come first (users, roles, builds, statuses, types), then
/// the fact table, which draws its user and build references from the keys
/// generated before it. IDs are dense and start at 1.
///
/// The callback receives (table, rows_generated_so_far, total_rows).
pub fn generate(
    config: &WarehouseConfig,
    seed: u64,
    base_time: NaiveDateTime,
    progress_callback: Option<&dyn Fn(&str, usize, usize)>,
) -> Result<GeneratedData> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut fk_pool = ForeignKeyPool::new();
    let mut progress = Progress {
        callback: progress_callback,
        generated: 0,
        total: 2 * config.users_count + 3 * config.builds_count + config.fact_rows,
    };
    let mut tables: IndexMap<String, Vec<Row>> = IndexMap::new();

    info!(
        seed,
        base_time = %base_time,
        users = config.users_count,
        builds = config.builds_count,
        fact_rows = config.fact_rows,
        "Generating warehouse data"
    );

    let mut users = Vec::with_capacity(config.users_count);
    for user_id in 1..=config.users_count as i64 {
        let mut row = Row::new();
        row.insert("User_ID".to_string(), Value::Int(user_id));
        row.insert("Login".to_string(), providers::login(user_id));
        row.insert("Full_Name".to_string(), providers::full_name(user_id));
        row.insert(
            "Registration_Date".to_string(),
            Value::Timestamp(random_datetime_within_years(
                &mut rng,
                base_time,
                config.years_back,
            )),
        );
        fk_pool.record_value(USERS, "User_ID", Value::Int(user_id));
        users.push(row);
        progress.tick(USERS);
    }
    tables.insert(USERS.to_string(), users);

    let mut roles = Vec::with_capacity(config.users_count);
    for user_id in 1..=config.users_count as i64 {
        let mut row = Row::new();
        row.insert("User_ID".to_string(), Value::Int(user_id));
        row.insert("Role_Name".to_string(), pick(ROLES, &mut rng));
        roles.push(row);
        progress.tick(USER_ROLE);
    }
    tables.insert(USER_ROLE.to_string(), roles);

    let mut builds = Vec::with_capacity(config.builds_count);
    for build_id in 1..=config.builds_count as i64 {
        let mut row = Row::new();
        row.insert("Build_ID".to_string(), Value::Int(build_id));
        row.insert("Version".to_string(), providers::version(build_id));
        row.insert("Link".to_string(), providers::link(build_id));
        row.insert(
            "Creation_Date".to_string(),
            Value::Timestamp(random_datetime_within_years(
                &mut rng,
                base_time,
                config.years_back,
            )),
        );
        row.insert("Changelog".to_string(), providers::changelog(build_id));
        fk_pool.record_value(BUILDS, "Build_ID", Value::Int(build_id));
        builds.push(row);
        progress.tick(BUILDS);
    }
    tables.insert(BUILDS.to_string(), builds);

    for (table_name, column, values) in [
        (STATUS, "Status_Name", STATUSES),
        (TYPE, "Type_Name", BUILD_TYPES),
    ] {
        let mut rows = Vec::with_capacity(config.builds_count);
        for build_id in 1..=config.builds_count as i64 {
            let mut row = Row::new();
            row.insert("Build_ID".to_string(), Value::Int(build_id));
            row.insert(column.to_string(), pick(values, &mut rng));
            rows.push(row);
            progress.tick(table_name);
        }
        tables.insert(table_name.to_string(), rows);
    }

    let mut changes = Vec::with_capacity(config.fact_rows);
    for change_id in 1..=config.fact_rows as i64 {
        // Prior and new status are independent; they may coincide.
        let ex_status = pick(STATUSES, &mut rng);
        let new_status = pick(STATUSES, &mut rng);
        let change_date = random_datetime_within_years(&mut rng, base_time, config.years_back);
        let user_id = reference(&fk_pool, USERS, "User_ID", &mut rng)?;
        let build_id = reference(&fk_pool, BUILDS, "Build_ID", &mut rng)?;

        let mut row = Row::new();
        row.insert("Change_ID".to_string(), Value::Int(change_id));
        row.insert("Ex_Status".to_string(), ex_status);
        row.insert("New_Status".to_string(), new_status);
        row.insert("Change_Date".to_string(), Value::Timestamp(change_date));
        row.insert("User_ID".to_string(), user_id);
        row.insert("Build_ID".to_string(), build_id);
        changes.push(row);
        progress.tick(CHANGE_HISTORY);
    }
    tables.insert(CHANGE_HISTORY.to_string(), changes);

    for (name, rows) in &tables {
        debug!(table = %name, rows = rows.len(), "Generated table");
    }

    Ok(GeneratedData {
        tables,
        seed,
        base_time,
    })
}

fn reference(
    fk_pool: &ForeignKeyPool,
    target_table: &str,
    column: &str,
    rng: &mut StdRng,
) -> Result<Value> {
    fk_pool
        .pick_reference(target_table, column, rng)
        .ok_or_else(|| BuildHistError::ForeignKeyResolution {
            source_table: CHANGE_HISTORY.to_string(),
            source_column: column.to_string(),
            target_table: target_table.to_string(),
        })
}

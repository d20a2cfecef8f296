//! # Foreign Key Value Pool
//!
//! Holds the primary keys of rows already generated so that dependent rows
//! can reference them. Parents are generated first, so by the time the fact
//! table is built the user and build pools are complete and every pick is a
//! key that exists.

use rand::Rng;
use std::collections::HashMap;

use crate::generate::value::Value;

/// Generated primary key values, keyed by (table, column).
#[derive(Debug, Default)]
pub struct ForeignKeyPool {
    pools: HashMap<(String, String), Vec<Value>>,
}

impl ForeignKeyPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generated key value.
    pub fn record_value(&mut self, table_name: &str, column_name: &str, value: Value) {
        self.pools
            .entry((table_name.to_string(), column_name.to_string()))
            .or_default()
            .push(value);
    }

    /// Pick a recorded key uniformly at random; `None` if nothing was recorded.
    pub fn pick_reference(
        &self,
        table_name: &str,
        column_name: &str,
        rng: &mut impl Rng,
    ) -> Option<Value> {
        self.get_pool(table_name, column_name).and_then(|pool| {
            if pool.is_empty() {
                None
            } else {
                Some(pool[rng.random_range(0..pool.len())].clone())
            }
        })
    }

    pub fn pool_size(&self, table_name: &str, column_name: &str) -> usize {
        self.get_pool(table_name, column_name)
            .map(|p| p.len())
            .unwrap_or(0)
    }

    pub fn get_pool(&self, table_name: &str, column_name: &str) -> Option<&[Value]> {
        self.pools
            .get(&(table_name.to_string(), column_name.to_string()))
            .map(|v| v.as_slice())
    }
}

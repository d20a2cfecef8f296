pub mod check;
pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod graph;
pub mod output;
pub mod provision;
pub mod schema;

// Re-export key types for convenience
pub use config::WarehouseConfig;
pub use db::Warehouse;
pub use error::{BuildHistError, Result};
pub use schema::types::{DatabaseSchema, DatabaseType};

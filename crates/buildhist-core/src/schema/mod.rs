pub mod ddl;
pub mod types;
pub mod warehouse;

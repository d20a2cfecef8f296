pub mod engine;
pub mod foreign_key;
pub mod providers;
pub mod value;

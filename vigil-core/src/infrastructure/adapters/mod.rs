// vigil-core/src/infrastructure/adapters/mod.rs

pub mod duckdb;
pub mod session;
pub mod sql_engine;

pub use duckdb::DuckDbDatabase;
pub use session::LocalSessionFactory;
pub use sql_engine::SqlRuleEngine;

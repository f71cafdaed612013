// vigil-core/src/ports/mod.rs

pub mod database;
pub mod engine;

pub use database::Database;
pub use engine::{EngineError, LenderSession, RuleEngine, SessionFactory};

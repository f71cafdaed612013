// vigil-core/src/infrastructure/config/mod.rs

pub mod rules;
pub mod secrets;

pub use rules::{CatalogFinding, RuleCatalog, load_rule_catalog};
pub use secrets::{EmailConfig, SecretsFile, load_secrets};

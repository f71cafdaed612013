// vigil-core/src/domain/lender.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Connection identity of one lender database. Immutable for the run.
///
/// The `database` field is engine-dependent: a schema name for a remote
/// warehouse, a file path for the bundled DuckDB adapter.
#[derive(Debug, Deserialize, Clone)]
pub struct LenderCredentials {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(rename = "db")]
    pub database: String,
}

fn default_port() -> u16 {
    3306
}

/// lender id -> credentials, as loaded from secrets.toml.
pub type LenderVault = BTreeMap<String, LenderCredentials>;

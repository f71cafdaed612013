// vigil-core/src/infrastructure/adapters/session.rs

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::lender::LenderCredentials;
use crate::error::VigilError;
use crate::infrastructure::adapters::duckdb::DuckDbDatabase;
use crate::infrastructure::adapters::sql_engine::SqlRuleEngine;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::engine::{LenderSession, SessionFactory};

/// Session factory over embedded DuckDB files: the credential's `db`
/// field is a file path. Every `connect` opens a fresh connection, so
/// concurrent lenders never share engine state.
pub struct LocalSessionFactory;

#[async_trait]
impl SessionFactory for LocalSessionFactory {
    async fn connect(
        &self,
        lender_id: &str,
        creds: &LenderCredentials,
    ) -> Result<LenderSession, VigilError> {
        let path = creds.database.as_str();

        // DuckDB happily creates a missing file; for a validation run
        // that would mean silently checking an empty database. Refuse
        // instead so the lender surfaces as CRITICAL_ERROR.
        if path != ":memory:" && !Path::new(path).exists() {
            return Err(VigilError::Infrastructure(
                InfrastructureError::ConfigError(format!(
                    "Database file not found for lender '{}': {}",
                    lender_id, path
                )),
            ));
        }

        let database = Arc::new(DuckDbDatabase::new(path)?);

        Ok(LenderSession {
            engine: Box::new(SqlRuleEngine::new(database.clone())),
            database,
        })
    }
}

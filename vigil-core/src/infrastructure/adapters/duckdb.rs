// vigil-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::{Config, Connection};
use std::sync::{Arc, Mutex};

// Imports Hexagonaux
use crate::error::VigilError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::database::Database;

/// Embedded DuckDB behind the `Database` port. This is what local runs,
/// demos and the integration suite validate against; production swaps in
/// an adapter for whatever the lender warehouses actually speak.
pub struct DuckDbDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbDatabase {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, VigilError> {
        self.conn.lock().map_err(|_| {
            VigilError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

#[async_trait]
impl Database for DuckDbDatabase {
    async fn execute(&self, query: &str) -> Result<(), VigilError> {
        let conn = self.lock_conn()?;
        conn.execute_batch(query).map_err(|e| {
            VigilError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
        })
    }

    async fn query_scalar(&self, query: &str) -> Result<u64, VigilError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(query).map_err(|e| {
            VigilError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
        })?;

        let mut rows = stmt.query([]).map_err(|e| {
            VigilError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
        })?;

        let row = rows
            .next()
            .map_err(|e| {
                VigilError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
            })?
            .ok_or_else(|| VigilError::InternalError("No scalar value returned".into()))?;

        let value: u64 = row.get(0).map_err(|e| {
            VigilError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
        })?;

        Ok(value)
    }
}

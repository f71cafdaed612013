// vigil-core/src/ports/database.rs

// This file defines what the application needs from a lender database,
// without knowing which driver provides it. The orchestration layer only
// ever runs violation-counting queries and the fallback COUNT(*); whether
// that hits DuckDB, MySQL or a test double is not its problem.

use crate::error::VigilError;
use async_trait::async_trait;

#[async_trait]
pub trait Database: Send + Sync {
    async fn execute(&self, query: &str) -> Result<(), VigilError>;

    /// Run a query expected to return exactly one numeric value
    /// (violation counts, row counts).
    async fn query_scalar(&self, query: &str) -> Result<u64, VigilError>;
}

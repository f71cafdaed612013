// vigil-core/src/application/reconcile.rs

use tracing::warn;

use crate::ports::database::Database;

/// Resolves the true population size of a table when the rule engine did
/// not report one.
///
/// Scoped to a single table's rule batch: the fallback COUNT(*) runs at
/// most once no matter how many rules on that table come back without an
/// element count. The orchestrator builds a fresh reconciler per table,
/// so the cache never leaks across tables or lenders and needs no
/// locking.
pub struct RowCountReconciler<'a> {
    database: &'a dyn Database,
    table: String,
    fallback: Option<u64>,
}

impl<'a> RowCountReconciler<'a> {
    pub fn new(database: &'a dyn Database, table: &str) -> Self {
        RowCountReconciler {
            database,
            table: table.to_string(),
            fallback: None,
        }
    }

    /// Cheap path: a reported count > 0 is trusted as-is. Otherwise fall
    /// back to one cached COUNT(*). A failed fallback resolves to 0; a
    /// missing count must never block the rest of the validation run.
    pub async fn resolve_total(&mut self, reported_element_count: u64) -> u64 {
        if reported_element_count > 0 {
            return reported_element_count;
        }

        if let Some(cached) = self.fallback {
            return cached;
        }

        let query = format!("SELECT count(*) FROM \"{}\"", self.table);
        let total = match self.database.query_scalar(&query).await {
            Ok(n) => n,
            Err(e) => {
                warn!(table = %self.table, error = %e, "Fallback row count failed, degrading to 0");
                0
            }
        };

        // The failure result is cached too: retrying per rule would just
        // hammer a table we already know we cannot count.
        self.fallback = Some(total);
        total
    }
}

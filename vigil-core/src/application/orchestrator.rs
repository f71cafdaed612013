// vigil-core/src/application/orchestrator.rs

use tracing::{error, info, warn};

use crate::application::classify::classify;
use crate::application::reconcile::RowCountReconciler;
use crate::domain::check::{CheckResult, LenderReport};
use crate::domain::lender::LenderCredentials;
use crate::domain::outcome::{ExceptionInfo, RawOutcome};
use crate::infrastructure::config::rules::RuleCatalog;
use crate::ports::engine::SessionFactory;

/// Run every configured rule for one lender and collect the results.
///
/// `table_filter` narrows the run to a single table (the dashboard path);
/// a table missing from the catalog is skipped with a warning, not an
/// error, since we have no rules for it and nothing to run.
///
/// Failure containment, lowest level first:
/// - a rule the engine refuses becomes an ERROR row, the batch continues;
/// - a table that fails setup is skipped, the lender continues;
/// - a lender whose session cannot be built yields exactly one
///   CRITICAL_ERROR record, so the fleet report stays well-formed.
pub async fn run_lender(
    factory: &dyn SessionFactory,
    lender_id: &str,
    creds: &LenderCredentials,
    catalog: &RuleCatalog,
    table_filter: Option<&str>,
) -> LenderReport {
    info!(lender = lender_id, "Initializing validation session");

    let session = match factory.connect(lender_id, creds).await {
        Ok(s) => s,
        Err(e) => {
            error!(lender = lender_id, error = %e, "Critical failure, lender unreachable");
            return vec![CheckResult::system_failure(lender_id, e.to_string())];
        }
    };

    // Decide which tables to process
    let target_tables: Vec<&str> = match table_filter {
        Some(requested) => {
            if !catalog.contains(requested) {
                warn!(
                    lender = lender_id,
                    table = requested,
                    "Table requested but not found in the rule catalog"
                );
                return Vec::new();
            }
            vec![requested]
        }
        None => catalog.table_names(),
    };

    let mut report = Vec::new();

    for table in target_tables {
        let Some(rules) = catalog.rules_for(table) else {
            continue;
        };

        if let Err(e) = session.engine.prepare(table).await {
            warn!(lender = lender_id, table, error = %e, "Table setup failed, skipping table");
            continue;
        }

        // One reconciler per table: the fallback-count cache is scoped to
        // exactly this batch of rules.
        let mut reconciler = RowCountReconciler::new(session.database.as_ref(), table);

        for rule in rules {
            let outcome = match session.engine.execute(table, rule).await {
                Ok(outcome) => outcome,
                // The engine refused the rule outright (unknown type, bad
                // kwargs). That still produces a row in the report; the
                // remaining rules of the table run normally.
                Err(e) => {
                    warn!(lender = lender_id, table, rule = %rule.rule_type, error = %e, "Rule rejected by engine");
                    RawOutcome::errored(rule.clone(), ExceptionInfo::from_message(e.to_string()))
                }
            };

            report.push(classify(lender_id, table, &outcome, &mut reconciler).await);
        }
    }

    info!(lender = lender_id, results = report.len(), "Lender run finished");
    report
}

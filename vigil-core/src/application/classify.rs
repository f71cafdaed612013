// vigil-core/src/application/classify.rs

use crate::application::reconcile::RowCountReconciler;
use crate::domain::check::{CheckResult, CheckStatus};
use crate::domain::outcome::RawOutcome;

/// Turn one raw engine outcome into the canonical `CheckResult`.
///
/// Decision table, evaluated in order:
/// 1. success                         -> PASS
/// 2. !success, unexpected_count > 0  -> FAIL (content failure, measured)
/// 3. !success, unexpected_count == 0 -> ERROR (execution never measured
///    anything; the message is dug out of the exception tree)
///
/// FAIL vs ERROR matters downstream: a FAIL is a data problem for the
/// lender, an ERROR is an us-problem (engine, query, connectivity).
/// The total population is always resolved through the reconciler so
/// every row of the report carries a usable denominator.
pub async fn classify(
    lender: &str,
    table: &str,
    outcome: &RawOutcome,
    reconciler: &mut RowCountReconciler<'_>,
) -> CheckResult {
    let total_rows = reconciler.resolve_total(outcome.element_count).await;

    let (status, error_msg) = if outcome.success {
        (CheckStatus::Pass, String::new())
    } else if outcome.unexpected_count > 0 {
        (
            CheckStatus::Fail,
            format!("Found {} data failures", outcome.unexpected_count),
        )
    } else {
        (CheckStatus::Error, outcome.error_message())
    };

    CheckResult {
        lender: lender.to_string(),
        table: table.to_string(),
        test_name: outcome.rule.display_name(),
        status,
        failed_rows: outcome.unexpected_count,
        total_rows,
        severity: outcome.rule.severity(),
        error_msg,
    }
}

// vigil-core/src/application/alert.rs

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::check::{CheckResult, CheckStatus, FleetReport};
use crate::domain::rule::Severity;
use crate::error::VigilError;

// --- DTOs (Data Transfer Objects) ---
// Those structures define exactly what the alert renderer will display.
// Transport (SMTP, webhook, file) is somebody else's job.

#[derive(Debug, Serialize, Clone)]
pub struct AlertIssue {
    pub lender: String,
    pub table: String,
    pub test_name: String,
    pub failed_rows: u64,
    pub severity: Severity,
    pub status: CheckStatus,
    pub error_msg: String,
}

impl AlertIssue {
    fn from_result(r: &CheckResult) -> Self {
        AlertIssue {
            lender: r.lender.clone(),
            table: r.table.clone(),
            test_name: r.test_name.clone(),
            failed_rows: r.failed_rows,
            severity: r.severity,
            status: r.status,
            error_msg: r.error_msg.clone(),
        }
    }

    /// Rendering bucket: CRITICAL_ERROR rows are system problems and get
    /// their own muted style; everything else styles by severity.
    pub fn style_class(&self) -> &'static str {
        if self.status == CheckStatus::CriticalError {
            "error"
        } else if self.severity == Severity::Critical {
            "critical"
        } else {
            "warning"
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct AlertPayload {
    pub issue_count: usize,
    pub issues: Vec<AlertIssue>,
}

impl AlertPayload {
    pub fn subject(&self) -> String {
        format!("DQ FAILURE: {} Issues Detected", self.issue_count)
    }
}

/// Filter the fleet report down to what is worth waking somebody up for.
/// `None` means every check passed and no alert should go out at all.
pub fn compose_alert(report: &FleetReport) -> Option<AlertPayload> {
    let mut issues: Vec<AlertIssue> = report.failures().map(AlertIssue::from_result).collect();

    if issues.is_empty() {
        return None;
    }

    // critical first, then warnings, then info
    issues.sort_by_key(|i| std::cmp::Reverse(i.severity));

    Some(AlertPayload {
        issue_count: issues.len(),
        issues,
    })
}

/// Delivery contract. Implementations own everything past the payload:
/// the bundled sink writes rendered HTML to disk, a production deployment
/// hands the same payload to its mailer.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), VigilError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn result(status: CheckStatus, severity: Severity) -> CheckResult {
        CheckResult {
            lender: "acme".into(),
            table: "loans".into(),
            test_name: "not_null (id)".into(),
            status,
            failed_rows: if status == CheckStatus::Fail { 7 } else { 0 },
            total_rows: 100,
            severity,
            error_msg: String::new(),
        }
    }

    #[test]
    fn test_all_pass_composes_nothing() {
        let report = FleetReport::new(vec![
            result(CheckStatus::Pass, Severity::Warning),
            result(CheckStatus::Pass, Severity::Critical),
        ]);
        assert!(compose_alert(&report).is_none());
    }

    #[test]
    fn test_issue_count_matches_non_pass_rows() {
        let report = FleetReport::new(vec![
            result(CheckStatus::Pass, Severity::Warning),
            result(CheckStatus::Fail, Severity::Warning),
            result(CheckStatus::Error, Severity::Warning),
            result(CheckStatus::CriticalError, Severity::Critical),
        ]);
        let payload = compose_alert(&report).unwrap();
        assert_eq!(payload.issue_count, 3);
        assert_eq!(payload.issues.len(), 3);
        assert_eq!(payload.subject(), "DQ FAILURE: 3 Issues Detected");
    }

    #[test]
    fn test_critical_issues_sort_first() {
        let report = FleetReport::new(vec![
            result(CheckStatus::Fail, Severity::Info),
            result(CheckStatus::Fail, Severity::Critical),
            result(CheckStatus::Fail, Severity::Warning),
        ]);
        let payload = compose_alert(&report).unwrap();
        let severities: Vec<Severity> = payload.issues.iter().map(|i| i.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::Warning, Severity::Info]
        );
    }

    #[test]
    fn test_style_class_mapping() {
        let critical_error = AlertIssue::from_result(&result(
            CheckStatus::CriticalError,
            Severity::Critical,
        ));
        assert_eq!(critical_error.style_class(), "error");

        let critical_fail =
            AlertIssue::from_result(&result(CheckStatus::Fail, Severity::Critical));
        assert_eq!(critical_fail.style_class(), "critical");

        let plain_fail = AlertIssue::from_result(&result(CheckStatus::Fail, Severity::Warning));
        assert_eq!(plain_fail.style_class(), "warning");
    }
}

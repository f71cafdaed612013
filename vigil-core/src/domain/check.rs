// vigil-core/src/domain/check.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::rule::Severity;

/// Pseudo-table used for lender-level synthetic records (the lender could
/// not even be reached, so no real table applies).
pub const SYSTEM_TABLE: &str = "SYSTEM";

const SYSTEM_TEST_NAME: &str = "Execution";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pass,
    Fail,
    Error,
    CriticalError,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Error => "ERROR",
            CheckStatus::CriticalError => "CRITICAL_ERROR",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical unit everything downstream operates on: one rule, one
/// table, one lender, one normalized result. Created once by the
/// classifier (or synthesized by the orchestrator), never mutated after.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CheckResult {
    pub lender: String,
    pub table: String,
    pub test_name: String,
    pub status: CheckStatus,
    pub failed_rows: u64,
    pub total_rows: u64,
    pub severity: Severity,
    pub error_msg: String,
}

impl CheckResult {
    /// Synthetic record for a lender that could not be set up at all
    /// (connection/session failure, crashed worker). Keeps the fleet
    /// report well-formed: every lender contributes at least one row.
    pub fn system_failure(lender: &str, error_msg: impl Into<String>) -> Self {
        CheckResult {
            lender: lender.to_string(),
            table: SYSTEM_TABLE.to_string(),
            test_name: SYSTEM_TEST_NAME.to_string(),
            status: CheckStatus::CriticalError,
            failed_rows: 0,
            total_rows: 0,
            severity: Severity::Critical,
            error_msg: error_msg.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// All results for one lender, in execution order.
pub type LenderReport = Vec<CheckResult>;

/// Merged results across the whole fleet. Insertion order carries no
/// meaning; consumers filter and aggregate.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FleetReport {
    pub generated_at: String,
    pub results: Vec<CheckResult>,
}

impl FleetReport {
    pub fn new(results: Vec<CheckResult>) -> Self {
        FleetReport {
            generated_at: Utc::now().to_rfc3339(),
            results,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Every non-PASS row (FAIL, ERROR and CRITICAL_ERROR alike).
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.is_pass())
    }

    pub fn is_all_pass(&self) -> bool {
        self.failures().next().is_none()
    }
}

// vigil-core/src/ports/engine.rs

use std::sync::Arc;

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::lender::LenderCredentials;
use crate::domain::outcome::RawOutcome;
use crate::domain::rule::RuleDefinition;
use crate::error::VigilError;
use crate::ports::database::Database;

#[derive(Error, Debug, Diagnostic)]
pub enum EngineError {
    // Rule-shape problems (unknown type, missing/invalid kwargs) are
    // domain findings; they surface here when the engine hits them at
    // execution time instead of catalog validation.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] DomainError),

    #[error("Engine rejected rule '{rule}': {reason}")]
    #[diagnostic(code(vigil::engine::rejected))]
    Rejected { rule: String, reason: String },
}

/// Executes declarative rules against one lender's data.
///
/// One instance is bound to one lender session; engine-side state (table
/// probes, prepared statements, whatever the implementation keeps) lives
/// and dies with the session and is never shared across lenders.
#[async_trait]
pub trait RuleEngine: Send + Sync {
    /// Per-table setup (existence probe, asset registration). A failure
    /// here means the whole table is skipped, not the lender.
    async fn prepare(&self, table: &str) -> Result<(), VigilError>;

    /// Run one rule. `Err` is reserved for rules the engine cannot even
    /// attempt (unknown type, rejected parameters); a query that starts
    /// and then dies comes back as a failed `RawOutcome` carrying
    /// exception info.
    async fn execute(&self, table: &str, rule: &RuleDefinition) -> Result<RawOutcome, VigilError>;
}

/// Everything the orchestrator needs for one lender: the rule engine and
/// the raw database handle the reconciler counts through. Both views
/// share one underlying connection.
pub struct LenderSession {
    pub engine: Box<dyn RuleEngine>,
    pub database: Arc<dyn Database>,
}

/// Builds a fresh, fully isolated session per lender invocation.
///
/// Ownership of the session is handed to the orchestrator; nothing is
/// cached process-wide. Concurrent lenders each get their own context,
/// which is a correctness requirement, not a tuning knob.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn connect(
        &self,
        lender_id: &str,
        creds: &LenderCredentials,
    ) -> Result<LenderSession, VigilError>;
}

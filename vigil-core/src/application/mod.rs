// vigil-core/src/application/mod.rs

pub mod alert;
pub mod classify;
pub mod fleet;
pub mod orchestrator;
pub mod reconcile;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Cela permet au CLI de faire :
// `use vigil_core::application::{run_fleet, run_lender, compose_alert};`
// sans avoir à connaître la structure interne des fichiers.

pub use alert::{AlertIssue, AlertPayload, AlertSink, compose_alert};
pub use classify::classify;
pub use fleet::{DEFAULT_FLEET_WORKERS, run_fleet};
pub use orchestrator::run_lender;
pub use reconcile::RowCountReconciler;

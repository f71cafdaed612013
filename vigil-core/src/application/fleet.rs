// vigil-core/src/application/fleet.rs

use std::sync::Arc;

use futures::StreamExt;
use tracing::{error, info};

use crate::application::orchestrator::run_lender;
use crate::domain::check::{CheckResult, FleetReport};
use crate::domain::lender::LenderVault;
use crate::infrastructure::config::rules::RuleCatalog;
use crate::ports::engine::SessionFactory;

/// 5 concurrent lenders keeps memory in check while the wall-clock cost
/// stays dominated by the slowest lender, not the lender count.
pub const DEFAULT_FLEET_WORKERS: usize = 5;

/// Fan the orchestrator out across every configured lender and merge the
/// per-lender reports into one fleet-wide report.
///
/// Each lender runs inside its own spawned task with a session built
/// fresh by the factory, so no engine or connection state is ever shared
/// between concurrent lenders. The stream bounds how many tasks are in
/// flight; a hung lender occupies one slot, never the whole fleet.
pub async fn run_fleet(
    factory: Arc<dyn SessionFactory>,
    lenders: &LenderVault,
    catalog: Arc<RuleCatalog>,
    workers: usize,
) -> FleetReport {
    let jobs = lenders.iter().map(|(lender_id, creds)| {
        let factory = factory.clone();
        let catalog = catalog.clone();
        let lender_id = lender_id.clone();
        let creds = creds.clone();

        async move {
            let task_id = lender_id.clone();
            let handle = tokio::spawn(async move {
                run_lender(factory.as_ref(), &task_id, &creds, &catalog, None).await
            });

            match handle.await {
                Ok(report) => {
                    info!(lender = %lender_id, results = report.len(), "Completed");
                    report
                }
                // A worker that panics (a bug, not a classified failure)
                // still contributes a record instead of sinking the fleet.
                Err(join_err) => {
                    error!(lender = %lender_id, error = %join_err, "Worker crashed");
                    vec![CheckResult::system_failure(
                        &lender_id,
                        format!("Worker crashed: {}", join_err),
                    )]
                }
            }
        }
    });

    let stream = futures::stream::iter(jobs).buffer_unordered(workers.max(1));
    let reports: Vec<_> = stream.collect().await;

    FleetReport::new(reports.into_iter().flatten().collect())
}

// vigil/src/commands/run.rs
//
// USE CASE: the scheduled fleet run. Every lender, every table, alert on
// anything that is not PASS.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use vigil_core::application::{compose_alert, run_fleet, AlertSink};
use vigil_core::infrastructure::adapters::LocalSessionFactory;
use vigil_core::infrastructure::artifacts::{write_fleet_report, FileAlertSink};
use vigil_core::infrastructure::config::{load_rule_catalog, load_secrets};

pub async fn execute(project_dir: PathBuf, workers: usize) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra). Config failure is the only fatal path.
    println!("⚙️  Loading configuration...");
    let secrets = load_secrets(&project_dir)
        .with_context(|| format!("Failed to load secrets from {:?}", project_dir))?;
    let catalog = load_rule_catalog(&project_dir)
        .with_context(|| format!("Failed to load rule catalog from {:?}", project_dir))?;

    println!(
        "   Lenders: {} | Tables: {} | Rules: {}",
        secrets.lenders.len(),
        catalog.tables.len(),
        catalog.rule_count()
    );

    // B. Fan out across the fleet
    println!("🟢 Running fleet validation ({} workers)...", workers);
    let factory = Arc::new(LocalSessionFactory);
    let report = run_fleet(factory, &secrets.lenders, Arc::new(catalog), workers).await;

    // C. Persist the merged report
    let target_dir = project_dir.join("target");
    let report_path = write_fleet_report(&target_dir, &report)?;
    println!("📝 Report: {} rows -> {:?}", report.len(), report_path);

    // D. Alerting
    match compose_alert(&report) {
        Some(payload) => {
            eprintln!("⚠️  {} issues detected.", payload.issue_count);

            let sink = FileAlertSink::new(&target_dir);
            sink.deliver(&payload).await?;
            println!("📨 Alert rendered at {:?}", sink.alert_path());

            if let Some(email) = &secrets.email {
                // Delivery itself belongs to the mailer; we just say where
                // the payload is meant to go.
                println!("   Recipients on file: {}", email.recipients.join(", "));
            }
        }
        None => println!("✅ All checks passed across all lenders."),
    }

    println!("✨ Done in {:.2?}", start.elapsed());
    Ok(())
}

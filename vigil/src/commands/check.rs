// vigil/src/commands/check.rs
//
// USE CASE: the interactive/dashboard path. One lender (or ALL), one
// table or every table, results straight to the terminal.

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::{Cell, Color, Table};

use vigil_core::application::run_lender;
use vigil_core::domain::check::CheckResult;
use vigil_core::infrastructure::adapters::LocalSessionFactory;
use vigil_core::infrastructure::config::{load_rule_catalog, load_secrets};

pub async fn execute(
    project_dir: PathBuf,
    lender: String,
    table: Option<String>,
) -> anyhow::Result<()> {
    let secrets = load_secrets(&project_dir)
        .with_context(|| format!("Failed to load secrets from {:?}", project_dir))?;
    let catalog = load_rule_catalog(&project_dir)
        .with_context(|| format!("Failed to load rule catalog from {:?}", project_dir))?;

    if lender != "ALL" && !secrets.lenders.contains_key(&lender) {
        anyhow::bail!("Lender '{}' not found in secrets.toml", lender);
    }
    let targets: Vec<String> = if lender == "ALL" {
        secrets.lenders.keys().cloned().collect()
    } else {
        vec![lender.clone()]
    };

    let scope = table.as_deref().unwrap_or("ALL TABLES");
    println!("⏳ Running Validation: {} / {}", lender, scope);

    let factory = LocalSessionFactory;
    let mut results: Vec<CheckResult> = Vec::new();

    // Interactive path stays sequential: one lender at a time, progress
    // visible as it happens.
    for lender_id in &targets {
        println!("   Validating {}...", lender_id);
        let report = run_lender(
            &factory,
            lender_id,
            &secrets.lenders[lender_id],
            &catalog,
            table.as_deref(),
        )
        .await;
        results.extend(report);
    }

    if results.is_empty() {
        println!("⚠️  No results returned.");
        return Ok(());
    }

    println!("{}", render_table(&results));

    let failures = results.iter().filter(|r| !r.is_pass()).count();
    if failures > 0 {
        eprintln!("⚠️  Found {} failures.", failures);
    } else {
        println!("✅ All systems green.");
    }

    Ok(())
}

fn render_table(results: &[CheckResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Lender", "Table", "Test", "Failed", "Total", "Severity", "Status", "Error",
    ]);

    for r in results {
        let status_color = if r.is_pass() { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(&r.lender),
            Cell::new(&r.table),
            Cell::new(&r.test_name),
            Cell::new(r.failed_rows),
            Cell::new(r.total_rows),
            Cell::new(r.severity),
            Cell::new(r.status).fg(status_color),
            Cell::new(&r.error_msg),
        ]);
    }

    table
}

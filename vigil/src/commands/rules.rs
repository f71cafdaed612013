// vigil/src/commands/rules.rs
//
// USE CASE: validate the rule catalog before trusting it with a run.

use std::path::PathBuf;

use anyhow::Context;

use vigil_core::infrastructure::config::load_rule_catalog;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let catalog = load_rule_catalog(&project_dir)
        .with_context(|| format!("Failed to load rule catalog from {:?}", project_dir))?;

    println!(
        "📋 Catalog: {} tables, {} rules",
        catalog.tables.len(),
        catalog.rule_count()
    );

    let findings = catalog.validate();

    if findings.is_empty() {
        println!("✅ Every rule checks out.");
        return Ok(());
    }

    eprintln!("⚠️  {} broken rules:", findings.len());
    for f in &findings {
        eprintln!(
            "   - {} / rule #{} ({}): {}",
            f.table,
            f.rule_index + 1,
            f.rule_type,
            f.problem
        );
    }

    // Broken rules are worth a non-zero exit here: this command exists
    // to gate deploys of the catalog.
    anyhow::bail!("{} rules failed validation", findings.len());
}

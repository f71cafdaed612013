// vigil-core/src/infrastructure/config/rules.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::rule::{RuleDefinition, RuleKind};
use crate::infrastructure::error::InfrastructureError;

// =============================================================================
//  1. DATA CONTRACT
// =============================================================================

/// table name -> ordered rules, straight from rules.yaml. Loaded once per
/// run and shared read-only with every lender worker.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RuleCatalog {
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<RuleDefinition>>,
}

impl RuleCatalog {
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn rules_for(&self, table: &str) -> Option<&[RuleDefinition]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn rule_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Load-time sanity pass over every rule: unknown kinds, missing or
    /// malformed kwargs, regexes that do not compile, custom SQL that is
    /// not a single SELECT. Findings are returned, not thrown: a broken
    /// rule should be fixed in config, but it only fails at execution
    /// time, where it turns into an ERROR row instead of sinking the run.
    pub fn validate(&self) -> Vec<CatalogFinding> {
        let mut findings = Vec::new();

        for (table, rules) in &self.tables {
            for (idx, rule) in rules.iter().enumerate() {
                let checked = RuleKind::from_type_str(&rule.rule_type)
                    .and_then(|kind| kind.validate_params(rule));

                if let Err(e) = checked {
                    findings.push(CatalogFinding {
                        table: table.clone(),
                        rule_index: idx,
                        rule_type: rule.rule_type.clone(),
                        problem: e.to_string(),
                    });
                }
            }
        }

        findings
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogFinding {
    pub table: String,
    pub rule_index: usize,
    pub rule_type: String,
    pub problem: String,
}

// =============================================================================
//  2. LOADER
// =============================================================================

#[instrument(skip(project_dir))]
pub fn load_rule_catalog(project_dir: &Path) -> Result<RuleCatalog, InfrastructureError> {
    let config_path = find_rules_file(project_dir)?;
    info!(path = ?config_path, "Loading rule catalog");

    let content = fs::read_to_string(&config_path)?;
    let catalog: RuleCatalog = serde_yaml::from_str(&content)?;

    info!(
        tables = catalog.tables.len(),
        rules = catalog.rule_count(),
        "Rule catalog loaded"
    );
    Ok(catalog)
}

fn find_rules_file(root: &Path) -> Result<PathBuf, InfrastructureError> {
    let candidates = ["config/rules.yaml", "config/rules.yml"];
    for filename in candidates {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No rule catalog found in {:?}. Checked: {:?}",
        root, candidates
    )))
}

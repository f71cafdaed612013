// vigil-core/src/infrastructure/adapters/sql_engine.rs

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::outcome::{ExceptionInfo, RawOutcome};
use crate::domain::rule::{RuleDefinition, RuleKind};
use crate::error::VigilError;
use crate::ports::database::Database;
use crate::ports::engine::{EngineError, RuleEngine};

/// Rule engine that compiles declarative rules down to violation-counting
/// SQL and runs it through the `Database` port.
///
/// Outcome contract: a query that returns 0 violations is a pass; > 0 is
/// a measured content failure; a query that dies mid-flight comes back as
/// a failed outcome carrying the driver's message. Only rules the engine
/// cannot even attempt (unknown kind, bad kwargs) return `Err`.
pub struct SqlRuleEngine {
    database: Arc<dyn Database>,
}

impl SqlRuleEngine {
    pub fn new(database: Arc<dyn Database>) -> Self {
        SqlRuleEngine { database }
    }

    /// Run a count query, folding driver failures into the outcome.
    async fn count_outcome(
        &self,
        query: &str,
        rule: &RuleDefinition,
        element_count: u64,
    ) -> RawOutcome {
        match self.database.query_scalar(query).await {
            Ok(0) => RawOutcome::passed(rule.clone(), element_count),
            Ok(n) => RawOutcome::failed(rule.clone(), n, element_count),
            Err(e) => RawOutcome::errored(rule.clone(), ExceptionInfo::from_message(e.to_string())),
        }
    }

    async fn run_row_count_between(&self, table: &str, rule: &RuleDefinition) -> RawOutcome {
        let query = format!("SELECT count(*) FROM {}", quote_ident(table));
        let n = match self.database.query_scalar(&query).await {
            Ok(n) => n,
            Err(e) => {
                return RawOutcome::errored(
                    rule.clone(),
                    ExceptionInfo::from_message(e.to_string()),
                );
            }
        };

        let min = rule.kwarg("min").and_then(|v| v.as_u64());
        let max = rule.kwarg("max").and_then(|v| v.as_u64());

        // A population-size violation reports the distance to the nearest
        // bound as its failed-row figure, so it classifies as a measured
        // failure rather than an execution error.
        let deviation = match (min, max) {
            (Some(lo), _) if n < lo => lo - n,
            (_, Some(hi)) if n > hi => n - hi,
            _ => 0,
        };

        if deviation == 0 {
            RawOutcome::passed(rule.clone(), n)
        } else {
            RawOutcome::failed(rule.clone(), deviation, n)
        }
    }

    fn violation_query(
        &self,
        kind: RuleKind,
        table: &str,
        rule: &RuleDefinition,
    ) -> Result<String, EngineError> {
        let t = quote_ident(table);

        let query = match kind {
            RuleKind::NotNull => {
                let c = quote_ident(required_str(rule, "column")?);
                format!("SELECT count(*) FROM {t} WHERE {c} IS NULL")
            }
            RuleKind::Unique => {
                let c = quote_ident(required_str(rule, "column")?);
                format!(
                    "SELECT CAST(coalesce(sum(dup_rows), 0) AS BIGINT) FROM \
                     (SELECT count(*) AS dup_rows FROM {t} WHERE {c} IS NOT NULL \
                      GROUP BY {c} HAVING count(*) > 1) dups"
                )
            }
            RuleKind::ValuesBetween => {
                let c = quote_ident(required_str(rule, "column")?);
                let mut bounds = Vec::new();
                if let Some(min) = rule.kwarg("min") {
                    bounds.push(format!("{c} < {}", sql_literal(rule, min)?));
                }
                if let Some(max) = rule.kwarg("max") {
                    bounds.push(format!("{c} > {}", sql_literal(rule, max)?));
                }
                format!(
                    "SELECT count(*) FROM {t} WHERE {c} IS NOT NULL AND ({})",
                    bounds.join(" OR ")
                )
            }
            RuleKind::ValuesInSet => {
                let c = quote_ident(required_str(rule, "column")?);
                let values = rule
                    .kwarg("values")
                    .and_then(|v| v.as_sequence())
                    .ok_or_else(|| EngineError::Rejected {
                        rule: rule.rule_type.clone(),
                        reason: "'values' must be a sequence".into(),
                    })?;
                let literals = values
                    .iter()
                    .map(|v| sql_literal(rule, v))
                    .collect::<Result<Vec<_>, _>>()?;
                format!(
                    "SELECT count(*) FROM {t} WHERE {c} IS NOT NULL AND {c} NOT IN ({})",
                    literals.join(", ")
                )
            }
            RuleKind::RegexMatch => {
                let c = quote_ident(required_str(rule, "column")?);
                let pattern = quote_string(required_str(rule, "pattern")?);
                format!(
                    "SELECT count(*) FROM {t} WHERE {c} IS NOT NULL \
                     AND NOT regexp_matches(CAST({c} AS VARCHAR), {pattern})"
                )
            }
            RuleKind::CustomSql => {
                // The rule's SELECT returns the unexpected rows themselves;
                // we only ever ship the count over the wire.
                let sql = required_str(rule, "sql")?;
                format!("SELECT count(*) FROM ({sql}) unexpected_rows")
            }
            RuleKind::RowCountBetween => {
                // handled separately, it owns its own count
                unreachable!("row_count_between does not go through violation_query")
            }
        };

        Ok(query)
    }
}

#[async_trait]
impl RuleEngine for SqlRuleEngine {
    async fn prepare(&self, table: &str) -> Result<(), VigilError> {
        // Existence probe. Scans nothing thanks to the impossible filter.
        let probe = format!("SELECT count(*) FROM {} WHERE 1 = 0", quote_ident(table));
        self.database.query_scalar(&probe).await.map(|_| ())
    }

    async fn execute(&self, table: &str, rule: &RuleDefinition) -> Result<RawOutcome, VigilError> {
        let kind = RuleKind::from_type_str(&rule.rule_type).map_err(EngineError::from)?;
        kind.validate_params(rule).map_err(EngineError::from)?;

        match kind {
            RuleKind::RowCountBetween => Ok(self.run_row_count_between(table, rule).await),
            // Column rules and custom SQL count violations only; the
            // population is left to the reconciler's per-table fallback
            // instead of paying an extra COUNT(*) per rule.
            _ => {
                let query = self.violation_query(kind, table, rule)?;
                Ok(self.count_outcome(&query, rule, 0).await)
            }
        }
    }
}

// --- SQL BUILDING BLOCKS ---

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn required_str<'a>(rule: &'a RuleDefinition, key: &str) -> Result<&'a str, EngineError> {
    rule.kwarg_str(key).ok_or_else(|| EngineError::Rejected {
        rule: rule.rule_type.clone(),
        reason: format!("'{}' must be a string", key),
    })
}

fn sql_literal(rule: &RuleDefinition, value: &serde_yaml::Value) -> Result<String, EngineError> {
    match value {
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::String(s) => Ok(quote_string(s)),
        serde_yaml::Value::Bool(b) => Ok(if *b { "TRUE".into() } else { "FALSE".into() }),
        _ => Err(EngineError::Rejected {
            rule: rule.rule_type.clone(),
            reason: "only scalar parameters can be rendered into SQL".into(),
        }),
    }
}

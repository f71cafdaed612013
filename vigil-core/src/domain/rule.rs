// vigil-core/src/domain/rule.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::domain::error::DomainError;

/// Display name used for free-form SQL checks (no single column to point at).
pub const CUSTOM_SQL_DISPLAY: &str = "Custom SQL Logic";

/// Alert weight attached to a rule via its metadata.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct RuleMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default)]
    pub severity: Severity,
}

/// One declarative check as written in the rules YAML. Immutable once loaded.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuleDefinition {
    #[serde(rename = "type")]
    pub rule_type: String,

    #[serde(default)]
    pub kwargs: BTreeMap<String, serde_yaml::Value>,

    #[serde(default)]
    pub meta: RuleMeta,
}

impl RuleDefinition {
    pub fn kwarg(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.kwargs.get(key)
    }

    pub fn kwarg_str(&self, key: &str) -> Option<&str> {
        self.kwargs.get(key).and_then(|v| v.as_str())
    }

    pub fn column(&self) -> Option<&str> {
        self.kwarg_str("column")
    }

    pub fn severity(&self) -> Severity {
        self.meta.severity
    }

    /// Resolved name shown in reports and alerts.
    /// Explicit alias wins; free-form SQL checks get a fixed label because
    /// there is no column to display; everything else keeps the raw type id.
    pub fn display_name(&self) -> String {
        if let Some(alias) = &self.meta.alias {
            return alias.clone();
        }
        if matches!(RuleKind::from_type_str(&self.rule_type), Ok(RuleKind::CustomSql)) {
            return format!("{} (N/A)", CUSTOM_SQL_DISPLAY);
        }
        let col = self.column().unwrap_or("table_level");
        format!("{} ({})", self.rule_type, col)
    }
}

/// Explicit registry of supported rule kinds.
/// The string in YAML maps here exactly once; an unrecognized string is a
/// clear error, never a silent lookup miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    NotNull,
    Unique,
    ValuesBetween,
    ValuesInSet,
    RegexMatch,
    RowCountBetween,
    CustomSql,
}

impl RuleKind {
    pub fn from_type_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "not_null" => Ok(RuleKind::NotNull),
            "unique" => Ok(RuleKind::Unique),
            "values_between" => Ok(RuleKind::ValuesBetween),
            "values_in_set" => Ok(RuleKind::ValuesInSet),
            "regex_match" => Ok(RuleKind::RegexMatch),
            "row_count_between" => Ok(RuleKind::RowCountBetween),
            "custom_sql" => Ok(RuleKind::CustomSql),
            other => Err(DomainError::UnknownRuleType(other.to_string())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            RuleKind::NotNull => "not_null",
            RuleKind::Unique => "unique",
            RuleKind::ValuesBetween => "values_between",
            RuleKind::ValuesInSet => "values_in_set",
            RuleKind::RegexMatch => "regex_match",
            RuleKind::RowCountBetween => "row_count_between",
            RuleKind::CustomSql => "custom_sql",
        }
    }

    /// Check the kwargs of a rule against what this kind needs.
    /// Run at config-load time (catalog validation) AND again by the engine
    /// right before SQL generation.
    pub fn validate_params(&self, rule: &RuleDefinition) -> Result<(), DomainError> {
        match self {
            RuleKind::NotNull | RuleKind::Unique => {
                require_str(rule, "column")?;
                Ok(())
            }
            RuleKind::ValuesBetween => {
                require_str(rule, "column")?;
                require_bound(rule)
            }
            RuleKind::ValuesInSet => {
                require_str(rule, "column")?;
                let values = rule
                    .kwarg("values")
                    .and_then(|v| v.as_sequence())
                    .ok_or_else(|| DomainError::MissingParameter {
                        rule: rule.rule_type.clone(),
                        param: "values".into(),
                    })?;
                if values.is_empty() {
                    return Err(DomainError::InvalidParameter {
                        rule: rule.rule_type.clone(),
                        reason: "'values' must not be empty".into(),
                    });
                }
                Ok(())
            }
            RuleKind::RegexMatch => {
                require_str(rule, "column")?;
                let pattern = require_str(rule, "pattern")?;
                regex::Regex::new(pattern).map_err(|e| DomainError::InvalidParameter {
                    rule: rule.rule_type.clone(),
                    reason: format!("'pattern' does not compile: {}", e),
                })?;
                Ok(())
            }
            RuleKind::RowCountBetween => require_bound(rule),
            RuleKind::CustomSql => {
                let sql = require_str(rule, "sql")?;
                let statements = Parser::parse_sql(&GenericDialect {}, sql).map_err(|e| {
                    DomainError::InvalidParameter {
                        rule: rule.rule_type.clone(),
                        reason: format!("'sql' does not parse: {}", e),
                    }
                })?;
                // Exactly one SELECT. Anything else (multiple statements, DML)
                // is rejected before it ever reaches a lender database.
                match statements.as_slice() {
                    [sqlparser::ast::Statement::Query(_)] => Ok(()),
                    _ => Err(DomainError::InvalidParameter {
                        rule: rule.rule_type.clone(),
                        reason: "'sql' must be a single SELECT statement".into(),
                    }),
                }
            }
        }
    }
}

fn require_str<'a>(rule: &'a RuleDefinition, param: &str) -> Result<&'a str, DomainError> {
    rule.kwarg_str(param).ok_or_else(|| DomainError::MissingParameter {
        rule: rule.rule_type.clone(),
        param: param.to_string(),
    })
}

// min/max are both optional but at least one must be there, and each one
// must be a plain scalar (number or string for date-ish columns).
fn require_bound(rule: &RuleDefinition) -> Result<(), DomainError> {
    let min = rule.kwarg("min");
    let max = rule.kwarg("max");
    if min.is_none() && max.is_none() {
        return Err(DomainError::MissingParameter {
            rule: rule.rule_type.clone(),
            param: "min/max".into(),
        });
    }
    for (name, value) in [("min", min), ("max", max)] {
        if let Some(v) = value
            && !(v.is_number() || v.is_string())
        {
            return Err(DomainError::InvalidParameter {
                rule: rule.rule_type.clone(),
                reason: format!("'{}' must be a number or a string", name),
            });
        }
    }
    Ok(())
}

// vigil-core/src/domain/outcome.rs

use serde::{Deserialize, Serialize};

use crate::domain::rule::RuleDefinition;

/// Hard cap on the extracted error message, matching what the alert
/// renderer and the report table can reasonably display.
pub const MAX_ERROR_MESSAGE_LEN: usize = 2000;

/// Depth bound for the exception tree walk. Engines have produced
/// pathologically nested failure structures; past this depth we stop
/// looking rather than trust the shape of the input.
const MAX_SEARCH_DEPTH: usize = 8;

const UNKNOWN_EXECUTION_ERROR: &str = "Unknown execution error";

/// Structured failure information attached to a raw outcome.
///
/// This is a tree on purpose: engine failures wrap driver failures which
/// wrap socket failures, and the useful message is rarely at the top.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ExceptionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<ExceptionInfo>,
}

impl ExceptionInfo {
    pub fn from_message(message: impl Into<String>) -> Self {
        ExceptionInfo {
            message: Some(message.into()),
            traceback: None,
            nested: Vec::new(),
        }
    }
}

/// Raw result of executing one rule against one table, as handed back by
/// the rule engine. The classifier is the only consumer.
#[derive(Debug, Clone)]
pub struct RawOutcome {
    pub success: bool,

    /// Rows (or groups) violating the rule. 0 on success, but also 0 when
    /// the engine could not even measure; the classifier tells those
    /// apart.
    pub unexpected_count: u64,

    /// Population actually scanned. 0 means "not reported"; certain rule
    /// kinds cannot attribute a population at all.
    pub element_count: u64,

    pub exception: Option<ExceptionInfo>,

    /// Echo of the rule that produced this outcome (display name and
    /// severity travel with it).
    pub rule: RuleDefinition,
}

impl RawOutcome {
    pub fn passed(rule: RuleDefinition, element_count: u64) -> Self {
        RawOutcome {
            success: true,
            unexpected_count: 0,
            element_count,
            exception: None,
            rule,
        }
    }

    pub fn failed(rule: RuleDefinition, unexpected_count: u64, element_count: u64) -> Self {
        RawOutcome {
            success: false,
            unexpected_count,
            element_count,
            exception: None,
            rule,
        }
    }

    pub fn errored(rule: RuleDefinition, exception: ExceptionInfo) -> Self {
        RawOutcome {
            success: false,
            unexpected_count: 0,
            element_count: 0,
            exception: Some(exception),
            rule,
        }
    }

    /// Best human-readable description of an execution error.
    ///
    /// Depth-first over the exception tree: direct message, else the last
    /// non-empty traceback line, else the nested children. Falls back to a
    /// fixed string so ERROR rows never ship an empty message.
    pub fn error_message(&self) -> String {
        let found = self
            .exception
            .as_ref()
            .and_then(|info| search_message(info, MAX_SEARCH_DEPTH));

        let msg = found.unwrap_or_else(|| UNKNOWN_EXECUTION_ERROR.to_string());
        truncate_chars(&msg, MAX_ERROR_MESSAGE_LEN)
    }
}

fn search_message(info: &ExceptionInfo, depth_left: usize) -> Option<String> {
    if depth_left == 0 {
        return None;
    }

    if let Some(msg) = &info.message
        && !msg.trim().is_empty()
    {
        return Some(msg.trim().to_string());
    }

    if let Some(tb) = &info.traceback
        && let Some(line) = tb.lines().rev().find(|l| !l.trim().is_empty())
    {
        return Some(line.trim().to_string());
    }

    for child in &info.nested {
        if let Some(found) = search_message(child, depth_left - 1) {
            return Some(found);
        }
    }

    None
}

// Truncation must land on a char boundary, not a byte offset.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::rule::RuleMeta;

    fn dummy_rule() -> RuleDefinition {
        RuleDefinition {
            rule_type: "not_null".into(),
            kwargs: Default::default(),
            meta: RuleMeta::default(),
        }
    }

    fn errored(info: ExceptionInfo) -> RawOutcome {
        RawOutcome::errored(dummy_rule(), info)
    }

    #[test]
    fn test_direct_message_wins() {
        let outcome = errored(ExceptionInfo {
            message: Some("Table 'loans' doesn't exist".into()),
            traceback: Some("line 1\nline 2".into()),
            nested: vec![],
        });
        assert_eq!(outcome.error_message(), "Table 'loans' doesn't exist");
    }

    #[test]
    fn test_blank_message_falls_through_to_traceback() {
        let outcome = errored(ExceptionInfo {
            message: Some("   ".into()),
            traceback: Some("Traceback (most recent call last):\n  frame a\nOperationalError: lost connection\n\n".into()),
            nested: vec![],
        });
        assert_eq!(outcome.error_message(), "OperationalError: lost connection");
    }

    #[test]
    fn test_nested_depth_first() {
        let outcome = errored(ExceptionInfo {
            message: None,
            traceback: None,
            nested: vec![
                ExceptionInfo {
                    message: None,
                    traceback: None,
                    nested: vec![ExceptionInfo::from_message("deep cause")],
                },
                ExceptionInfo::from_message("sibling cause"),
            ],
        });
        // depth-first: the first branch is explored to the bottom before the sibling
        assert_eq!(outcome.error_message(), "deep cause");
    }

    #[test]
    fn test_unknown_fallback() {
        let outcome = errored(ExceptionInfo::default());
        assert_eq!(outcome.error_message(), "Unknown execution error");

        let outcome = RawOutcome {
            success: false,
            unexpected_count: 0,
            element_count: 0,
            exception: None,
            rule: dummy_rule(),
        };
        assert_eq!(outcome.error_message(), "Unknown execution error");
    }

    #[test]
    fn test_depth_bound_stops_the_walk() {
        // chain deeper than the bound, message at the very bottom
        let mut info = ExceptionInfo::from_message("bottom");
        for _ in 0..20 {
            info = ExceptionInfo {
                message: None,
                traceback: None,
                nested: vec![info],
            };
        }
        let outcome = errored(info);
        assert_eq!(outcome.error_message(), "Unknown execution error");
    }

    #[test]
    fn test_message_truncated_to_limit() {
        let outcome = errored(ExceptionInfo::from_message("x".repeat(5000)));
        assert_eq!(outcome.error_message().chars().count(), MAX_ERROR_MESSAGE_LEN);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let outcome = errored(ExceptionInfo::from_message("é".repeat(3000)));
        let msg = outcome.error_message();
        assert_eq!(msg.chars().count(), MAX_ERROR_MESSAGE_LEN);
        assert!(msg.chars().all(|c| c == 'é'));
    }
}

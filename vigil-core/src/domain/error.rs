// vigil-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Unknown rule type '{0}'")]
    #[diagnostic(
        code(vigil::domain::unknown_rule),
        help("Check the 'type' field of the rule in rules.yaml against the supported rule kinds.")
    )]
    UnknownRuleType(String),

    #[error("Rule '{rule}' is missing required parameter '{param}'")]
    #[diagnostic(code(vigil::domain::missing_param))]
    MissingParameter { rule: String, param: String },

    #[error("Rule '{rule}' has an invalid parameter: {reason}")]
    #[diagnostic(code(vigil::domain::invalid_param))]
    InvalidParameter { rule: String, reason: String },
}

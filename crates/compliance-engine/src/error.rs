//! Error types for rule loading and evaluation

use std::path::PathBuf;
use thiserror::Error;

/// Grammar failures in a condition expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("condition is empty")]
    Empty,

    #[error("category before ':' is empty")]
    EmptyCategory,

    #[error("no threshold in predicate '{0}'")]
    MissingThreshold(String),

    #[error("invalid threshold '{0}'")]
    InvalidThreshold(String),

    #[error("unexpected '{0}' after threshold")]
    TrailingInput(String),
}

/// Why a single rule was rejected at load time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleDefect {
    #[error("parameter is empty")]
    EmptyParameter,

    #[error("{0}")]
    Condition(#[from] ConditionError),
}

/// Fatal failures while loading a rule set
#[derive(Error, Debug)]
pub enum RuleStoreError {
    #[error("Rule file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read rule file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed rule document: {0}")]
    MalformedDocument(String),

    #[error("Malformed rule at index {index} (clause '{clause}'): {reason}")]
    MalformedRule {
        index: usize,
        clause: String,
        #[source]
        reason: RuleDefect,
    },
}

/// A logical parameter name with no configured binding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Parameter '{0}' has no configured binding")]
    Unbound(String),
}

/// Failures local to one (element, rule) pair; never propagated past the pair
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalFailure {
    #[error("invalid condition: {0}")]
    Condition(#[from] ConditionError),

    #[error("value of {parameter} is not numeric: '{value}'")]
    NonNumeric { parameter: String, value: String },

    #[error("value of {parameter} is not a finite number")]
    NonFinite { parameter: String },

    #[error("unit '{unit}' has unusable scale factor {factor}")]
    InvalidScale { unit: String, factor: f64 },
}

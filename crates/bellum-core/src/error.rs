//! The error taxonomy shared by `bellum-core` and `bellum-engine` (spec §7).

use thiserror::Error;

/// A single validation failure, keyed by the rule label that produced it so tests (and
/// callers) can assert on a specific check without string-matching a full message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The rule label, e.g. `"circular task dependency"`.
    pub label: String,
    /// A human-readable message, with `{value}` already substituted.
    pub message: String,
}

impl ValidationIssue {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }
}

/// The full Bellum error taxonomy. Every public operation in `bellum-core` and
/// `bellum-engine` returns a `Result` carrying one of these kinds; none are thrown
/// (panicked) across a public boundary.
#[derive(Debug, Error)]
pub enum BellumError {
    #[error("validation failed: {}", summarize(.errors))]
    Validation { errors: Vec<ValidationIssue> },

    #[error("invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("insufficient skills to estimate: {0}")]
    InsufficientSkills(String),

    #[error("invalid employee id: {0}")]
    InvalidEmployeeId(String),

    #[error("invalid task id: {0}")]
    InvalidTaskId(String),

    #[error("a scheduling run is already in progress")]
    AlreadyProcessing,

    #[error("unknown solver {name:?}; available solvers: {}", available.join(", "))]
    UnknownSolver { name: String, available: Vec<String> },

    #[error("estimation failed: {0}")]
    EstimationFailure(String),

    #[error("callback raised an error: {0}")]
    CallbackError(String),
}

fn summarize(errors: &[ValidationIssue]) -> String {
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.label, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl BellumError {
    /// Construct a `Validation` error carrying exactly one issue — the common case of a
    /// single failed rule (e.g. an out-of-range `SkillPoint`).
    pub fn validation_single(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![ValidationIssue::new(label, message)],
        }
    }

    /// The issues carried by a `Validation` error, if this is one.
    pub fn validation_issues(&self) -> Option<&[ValidationIssue]> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }

    /// True if a `Validation` error contains an issue with the given rule label.
    pub fn has_label(&self, label: &str) -> bool {
        self.validation_issues()
            .is_some_and(|issues| issues.iter().any(|i| i.label == label))
    }
}

pub type BellumResult<T> = Result<T, BellumError>;

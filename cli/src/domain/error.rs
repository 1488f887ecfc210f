//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs` or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Environment errors ────────────────────────────────────────────────────────

/// Errors raised while resolving required environment inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("Required environment variable {name} is not set")]
    Missing { name: String },
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Lifecycle step of the provisioning tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Init,
    Apply,
    Output,
    Destroy,
    Version,
}

impl Step {
    /// The subcommand name passed to the provisioning tool.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Apply => "apply",
            Self::Output => "output",
            Self::Destroy => "destroy",
            Self::Version => "version",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by a provisioning-tool invocation.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("terraform {step} failed (exit code {code}):\n{output}")]
    CommandFailed {
        step: Step,
        code: String,
        output: String,
    },

    #[error("output '{name}' not found in module")]
    OutputNotFound { name: String },

    #[error("cannot parse terraform {step} output: {reason}")]
    Unparseable { step: Step, reason: String },
}

impl ProvisionError {
    /// Text of the failed invocation, used for retry classification.
    #[must_use]
    pub fn output_text(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

// ── Assertion errors ──────────────────────────────────────────────────────────

/// A single output expectation that did not hold.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssertionFailure {
    #[error("output '{output}' is missing: {reason}")]
    Missing { output: String, reason: String },

    #[error("output '{output}' is empty")]
    Empty { output: String },

    #[error("output '{output}': expected '{expected}', got '{actual}'")]
    Mismatch {
        output: String,
        expected: String,
        actual: String,
    },

    #[error("output '{output}': '{actual}' does not match /{pattern}/")]
    NoMatch {
        output: String,
        pattern: String,
        actual: String,
    },

    #[error("output '{output}': invalid pattern /{pattern}/: {reason}")]
    InvalidPattern {
        output: String,
        pattern: String,
        reason: String,
    },
}

// ── Scenario errors ───────────────────────────────────────────────────────────

/// Errors in a scenario definition, detected before any infrastructure action.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("Scenario '{0}' has no module directory")]
    NoModule(String),

    #[error("Scenario '{scenario}' sets variable '{var}' both literally and from the environment")]
    DuplicateVar { scenario: String, var: String },

    #[error("Scenario '{scenario}' has an invalid retry pattern: {reason}")]
    InvalidRetryPattern { scenario: String, reason: String },

    #[error("Scenario '{scenario}' has an invalid pattern for output '{output}': {reason}")]
    InvalidCheckPattern {
        scenario: String,
        output: String,
        reason: String,
    },
}

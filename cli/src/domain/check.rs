//! Post-apply expectations on named outputs.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::AssertionFailure;

/// Predicate applied to one output value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "expect", rename_all = "snake_case")]
pub enum Expectation {
    /// The value is present and non-empty.
    NotEmpty,
    /// The value equals `value` exactly.
    Equals { value: String },
    /// The value matches the regular expression `pattern`.
    Matches { pattern: String },
}

/// `(output name, expectation)` pair evaluated after apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCheck {
    pub output: String,
    #[serde(flatten)]
    pub expect: Expectation,
}

impl OutputCheck {
    #[must_use]
    pub fn not_empty(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            expect: Expectation::NotEmpty,
        }
    }

    #[must_use]
    pub fn equals(output: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            expect: Expectation::Equals {
                value: value.into(),
            },
        }
    }

    #[must_use]
    pub fn matches(output: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            expect: Expectation::Matches {
                pattern: pattern.into(),
            },
        }
    }

    /// Compile the `matches` pattern, if any, without evaluating it.
    ///
    /// # Errors
    ///
    /// Returns the regex compile error for an invalid pattern.
    pub fn compile(&self) -> Result<Option<Regex>, regex::Error> {
        match &self.expect {
            Expectation::Matches { pattern } => Regex::new(pattern).map(Some),
            _ => Ok(None),
        }
    }

    /// Evaluate against the fetched value.
    ///
    /// # Errors
    ///
    /// Returns the [`AssertionFailure`] describing why the expectation did not hold.
    pub fn evaluate(&self, actual: &str) -> Result<(), AssertionFailure> {
        let output = self.output.clone();
        match &self.expect {
            Expectation::NotEmpty if actual.is_empty() => Err(AssertionFailure::Empty { output }),
            Expectation::NotEmpty => Ok(()),
            Expectation::Equals { value } if value == actual => Ok(()),
            Expectation::Equals { value } => Err(AssertionFailure::Mismatch {
                output,
                expected: value.clone(),
                actual: actual.to_string(),
            }),
            Expectation::Matches { pattern } => {
                let re = Regex::new(pattern).map_err(|e| AssertionFailure::InvalidPattern {
                    output: output.clone(),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
                if re.is_match(actual) {
                    Ok(())
                } else {
                    Err(AssertionFailure::NoMatch {
                        output,
                        pattern: pattern.clone(),
                        actual: actual.to_string(),
                    })
                }
            }
        }
    }
}

impl std::fmt::Display for OutputCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.expect {
            Expectation::NotEmpty => write!(f, "{} is not empty", self.output),
            Expectation::Equals { value } => write!(f, "{} == {value:?}", self.output),
            Expectation::Matches { pattern } => write!(f, "{} =~ /{pattern}/", self.output),
        }
    }
}

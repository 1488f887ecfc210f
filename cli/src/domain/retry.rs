//! Retryable-error classification for provisioning commands.
//!
//! A [`RetryPolicy`] is a pluggable `is_retryable(text) -> bool` predicate
//! plus a retry budget. The default policy is empty and never retries; the
//! transient-error set is opt-in.

use std::time::Duration;

use regex::Regex;

/// Retry budget used by [`RetryPolicy::default_retryable_errors`].
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Pause between attempts used by [`RetryPolicy::default_retryable_errors`].
pub const DEFAULT_TIME_BETWEEN_RETRIES: Duration = Duration::from_secs(5);

/// Transient failures seen while downloading providers or talking to
/// registries and remote backends. Pattern → human-readable reason.
pub const DEFAULT_RETRYABLE_ERRORS: &[(&str, &str)] = &[
    (
        r"(?i)connection reset by peer",
        "network connection was reset",
    ),
    (r"(?i)TLS handshake timeout", "TLS handshake timed out"),
    (r"(?i)i/o timeout", "network I/O timed out"),
    (
        r"Failed to query available provider packages",
        "provider registry was unreachable",
    ),
    (
        r"Error installing provider",
        "provider download failed",
    ),
    (
        r"could not query provider registry",
        "provider registry was unreachable",
    ),
    (
        r"timeout while waiting for plugin to start",
        "provider plugin start timed out",
    ),
    (
        r"Error acquiring the state lock",
        "remote state is locked by another run",
    ),
    (
        r"(?m)^.*(?:502 Bad Gateway|503 Service Unavailable).*$",
        "upstream service temporarily unavailable",
    ),
];

/// One retryable pattern and the reason reported when it matches.
#[derive(Debug, Clone)]
pub struct RetryablePattern {
    pub regex: Regex,
    pub reason: String,
}

/// Which failures to retry, how often, and how long to wait in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub patterns: Vec<RetryablePattern>,
    pub max_retries: u32,
    pub time_between_retries: Duration,
}

impl Default for RetryPolicy {
    /// Conservative default: nothing is retryable.
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            max_retries: 0,
            time_between_retries: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// The transient-error set, 3 retries, 5 seconds apart.
    #[must_use]
    pub fn default_retryable_errors() -> Self {
        let patterns = DEFAULT_RETRYABLE_ERRORS
            .iter()
            .filter_map(|(pattern, reason)| {
                Regex::new(pattern).ok().map(|regex| RetryablePattern {
                    regex,
                    reason: (*reason).to_string(),
                })
            })
            .collect();
        Self {
            patterns,
            max_retries: DEFAULT_MAX_RETRIES,
            time_between_retries: DEFAULT_TIME_BETWEEN_RETRIES,
        }
    }

    /// Register an additional retryable pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn add_pattern(&mut self, pattern: &str, reason: &str) -> Result<(), regex::Error> {
        self.patterns.push(RetryablePattern {
            regex: Regex::new(pattern)?,
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// Reason for the first pattern matching `text`, if any.
    #[must_use]
    pub fn retry_reason(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.regex.is_match(text))
            .map(|p| p.reason.as_str())
    }

    /// Whether a failure with this combined output should be retried.
    #[must_use]
    pub fn is_retryable(&self, text: &str) -> bool {
        self.retry_reason(text).is_some()
    }
}

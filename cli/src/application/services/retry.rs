//! Run one provisioning step, retrying failures the policy classifies as
//! transient.

use std::future::Future;
use std::process::Output;

use anyhow::Result;
use tracing::{debug, error, warn};

use crate::application::ports::ProgressReporter;
use crate::domain::{ProvisionError, RetryPolicy, Step};

/// Combined stdout and stderr of a finished command.
#[must_use]
pub fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (_, true) => stdout.trim_end().to_string(),
        (true, false) => stderr.trim_end().to_string(),
        (false, false) => format!("{}\n{}", stdout.trim_end(), stderr.trim_end()),
    }
}

/// Convert a non-zero exit into a typed error; success yields the combined text.
///
/// # Errors
///
/// Returns [`ProvisionError::CommandFailed`] when the process exited unsuccessfully.
pub fn check_status(step: Step, output: &Output) -> Result<String, ProvisionError> {
    let text = combined_output(output);
    if output.status.success() {
        return Ok(text);
    }
    Err(ProvisionError::CommandFailed {
        step,
        code: output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string()),
        output: text,
    })
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's retry budget is spent.
///
/// Spawn failures (the `Err` arm of `operation`) are never retried: only a
/// finished command's output can be classified.
///
/// # Errors
///
/// Returns the last failure, either the spawn error or a
/// [`ProvisionError::CommandFailed`].
pub async fn run_step<F, Fut>(
    step: Step,
    policy: &RetryPolicy,
    reporter: &impl ProgressReporter,
    mut operation: F,
) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Output>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        debug!(%step, attempt, "running terraform step");
        let output = operation().await?;
        let err = match check_status(step, &output) {
            Ok(text) => return Ok(text),
            Err(err) => err,
        };

        let reason = err
            .output_text()
            .and_then(|text| policy.retry_reason(text))
            .map(str::to_owned);
        match reason {
            Some(reason) if attempt <= policy.max_retries => {
                warn!(
                    %step,
                    attempt,
                    %reason,
                    delay_ms = policy.time_between_retries.as_millis(),
                    "retryable failure, retrying"
                );
                reporter.warn(&format!(
                    "terraform {step} failed ({reason}); retry {attempt} of {}",
                    policy.max_retries
                ));
                tokio::time::sleep(policy.time_between_retries).await;
            }
            _ => {
                error!(%step, attempt, "terraform step failed");
                return Err(err.into());
            }
        }
    }
}

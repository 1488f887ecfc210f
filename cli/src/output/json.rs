//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one JSON document on stdout:
//! either a command result or the error object built by [`format_error`].

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::domain::{ScenarioReport, TeardownOutcome};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// JSON view of one scenario report.
#[must_use]
pub fn report_value(report: &ScenarioReport) -> Value {
    let checks: Vec<Value> = report
        .checks
        .iter()
        .map(|c| {
            json!({
                "output": c.check.output,
                "check": c.check.to_string(),
                "passed": c.passed(),
                "value": c.value,
                "failure": c.failure.as_ref().map(ToString::to_string),
            })
        })
        .collect();
    let teardown = match &report.teardown {
        TeardownOutcome::Destroyed => json!({ "status": "destroyed" }),
        TeardownOutcome::Failed(message) => json!({ "status": "failed", "message": message }),
    };
    json!({
        "name": report.name,
        "passed": report.passed(),
        "lifecycle_failure": report.lifecycle_failure.as_ref().map(|f| json!({
            "step": f.step.as_str(),
            "message": f.message,
        })),
        "checks": checks,
        "outputs": report.outputs,
        "teardown": teardown,
    })
}

/// Format the result of a `run` invocation.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_reports(reports: &[ScenarioReport]) -> Result<String> {
    let obj = json!({
        "passed": reports.iter().all(ScenarioReport::passed),
        "scenarios": reports.iter().map(report_value).collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

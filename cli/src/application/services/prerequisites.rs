//! Application service — verify the provisioning tool is usable before any
//! scenario touches infrastructure.

use anyhow::{Context, Result};

use crate::application::ports::OutputReader;
use crate::application::services::retry::check_status;
use crate::domain::{EnvSource, Scenario, Step, resolve_required_env_var};

const TERRAFORM_MIN_VERSION: semver::Version = semver::Version::new(1, 0, 0);

/// Parse `terraform version -json` and enforce the minimum supported version.
///
/// # Errors
///
/// Returns an error if the binary cannot be run, prints unexpected output,
/// or is older than 1.0.0.
pub async fn check_terraform(tf: &impl OutputReader, binary: &str) -> Result<semver::Version> {
    let output = tf.version(binary).await.map_err(|e| {
        anyhow::anyhow!("{binary} is not available: {e:#}\n\nInstall Terraform or pass --terraform <path>.")
    })?;
    let text = check_status(Step::Version, &output)?;
    let report: serde_json::Value =
        serde_json::from_str(&text).context("parsing terraform version -json")?;
    let raw = report
        .get("terraform_version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("terraform version -json has no terraform_version"))?;
    let version = semver::Version::parse(raw)
        .with_context(|| format!("invalid terraform version '{raw}'"))?;
    anyhow::ensure!(
        version >= TERRAFORM_MIN_VERSION,
        "terraform {version} is too old; {TERRAFORM_MIN_VERSION} or newer is required"
    );
    Ok(version)
}

/// Names of the scenario's required environment variables that are unset or empty.
#[must_use]
pub fn missing_env(scenario: &Scenario, env: &impl EnvSource) -> Vec<String> {
    scenario
        .required_env()
        .filter(|name| resolve_required_env_var(env, name).is_err())
        .map(str::to_owned)
        .collect()
}

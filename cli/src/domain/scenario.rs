//! Scenario definitions and their results.
//!
//! A scenario names a module, the variables to apply it with, and the
//! checks to run on its outputs. The report records what happened at each
//! stage so that a teardown problem never hides an earlier failure.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::check::OutputCheck;
use crate::domain::config::{DeploymentConfig, VarValue};
use crate::domain::env::{EnvSource, resolve_required_env_var};
use crate::domain::error::{AssertionFailure, ScenarioError, Step};
use crate::domain::output::OutputSet;
use crate::domain::retry::RetryPolicy;

// ── Definition ───────────────────────────────────────────────────────────────

/// Retry settings as written in a scenario file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Start from the built-in transient-error set.
    pub default_errors: bool,
    /// Extra retryable patterns: regex → reason.
    pub patterns: BTreeMap<String, String>,
    pub max_retries: Option<u32>,
    pub time_between_retries_secs: Option<u64>,
}

impl RetrySettings {
    fn to_policy(&self, scenario: &str) -> Result<RetryPolicy, ScenarioError> {
        let mut policy = if self.default_errors {
            RetryPolicy::default_retryable_errors()
        } else {
            RetryPolicy::default()
        };
        for (pattern, reason) in &self.patterns {
            policy
                .add_pattern(pattern, reason)
                .map_err(|e| ScenarioError::InvalidRetryPattern {
                    scenario: scenario.to_string(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(n) = self.max_retries {
            policy.max_retries = n;
        } else if !self.default_errors && !self.patterns.is_empty() {
            policy.max_retries = crate::domain::retry::DEFAULT_MAX_RETRIES;
        }
        if let Some(secs) = self.time_between_retries_secs {
            policy.time_between_retries = Duration::from_secs(secs);
        }
        Ok(policy)
    }
}

/// A named module run with its expected outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Module directory; relative paths resolve against the scenario file.
    pub module: String,
    #[serde(default)]
    pub vars: BTreeMap<String, VarValue>,
    /// Module variable → required environment variable supplying its value.
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,
    #[serde(default)]
    pub checks: Vec<OutputCheck>,
    #[serde(default = "default_no_color")]
    pub no_color: bool,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_no_color() -> bool {
    true
}

impl Scenario {
    /// Build the deployment configuration for this scenario.
    ///
    /// Every required environment variable is resolved here, before any
    /// infrastructure action can happen.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is inconsistent or a required
    /// environment variable is missing.
    pub fn to_config(
        &self,
        env: &impl EnvSource,
        base_dir: &Path,
        binary: Option<&str>,
    ) -> anyhow::Result<DeploymentConfig> {
        self.validate()?;

        let mut builder = DeploymentConfig::builder(base_dir.join(&self.module))
            .no_color(self.no_color)
            .vars(self.vars.clone())
            .retry(self.retry.to_policy(&self.name)?);
        for (var, env_name) in &self.env_vars {
            builder = builder.var(var.clone(), resolve_required_env_var(env, env_name)?);
        }
        if let Some(bin) = binary {
            builder = builder.binary(bin);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build())
    }

    /// Names of the environment variables this scenario requires.
    pub fn required_env(&self) -> impl Iterator<Item = &str> {
        self.env_vars.values().map(String::as_str)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.module.trim().is_empty() {
            return Err(ScenarioError::NoModule(self.name.clone()));
        }
        if let Some(var) = self.env_vars.keys().find(|k| self.vars.contains_key(*k)) {
            return Err(ScenarioError::DuplicateVar {
                scenario: self.name.clone(),
                var: var.clone(),
            });
        }
        for check in &self.checks {
            check
                .compile()
                .map_err(|e| ScenarioError::InvalidCheckPattern {
                    scenario: self.name.clone(),
                    output: check.output.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

/// Result of evaluating one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub check: OutputCheck,
    /// The value read back, when the output existed.
    pub value: Option<String>,
    pub failure: Option<AssertionFailure>,
}

impl CheckOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// A lifecycle step that failed before checks could run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleFailure {
    pub step: Step,
    pub message: String,
}

/// What happened when the deployment was torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownOutcome {
    Destroyed,
    Failed(String),
}

/// Everything observed while running one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: String,
    pub lifecycle_failure: Option<LifecycleFailure>,
    pub checks: Vec<CheckOutcome>,
    pub outputs: OutputSet,
    pub teardown: TeardownOutcome,
}

impl ScenarioReport {
    /// Pass iff init/apply succeeded and every check held. Teardown does not
    /// affect the verdict.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.lifecycle_failure.is_none() && self.checks.iter().all(CheckOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &AssertionFailure> {
        self.checks.iter().filter_map(|c| c.failure.as_ref())
    }
}

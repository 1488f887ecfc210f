//! Application service — provision a module, inspect it, always tear it down.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! [`with_deployment`] is the scoped form: the body runs between apply and
//! destroy, and destroy runs exactly once on every exit path, including
//! init/apply failures, errors returned by the body and panics raised in it.

use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use anyhow::{Context, Result};
use futures_util::FutureExt as _;
use tracing::{error, info};

use crate::application::ports::{OutputReader, ProgressReporter, Provisioner};
use crate::application::services::retry::{check_status, combined_output, run_step};
use crate::domain::output::parse_single_output;
use crate::domain::{
    AssertionFailure, CheckOutcome, DeploymentConfig, LifecycleFailure, OutputCheck, OutputSet,
    ProvisionError, ScenarioReport, Step, TeardownOutcome,
};

/// Handle to an applied module, valid inside a [`with_deployment`] body.
pub struct Deployment<'a, P> {
    provisioner: &'a P,
    config: &'a DeploymentConfig,
}

impl<P> Clone for Deployment<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Deployment<'_, P> {}

impl<'a, P: OutputReader> Deployment<'a, P> {
    #[must_use]
    pub fn config(&self) -> &'a DeploymentConfig {
        self.config
    }

    /// Read one named output as a string.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::OutputNotFound`] when the module does not
    /// define the output, or another error if the command fails.
    pub async fn output(&self, name: &str) -> Result<String> {
        read_output(self.provisioner, self.config, name).await
    }

    /// Read every output of the module.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or prints unexpected JSON.
    pub async fn outputs(&self) -> Result<OutputSet> {
        let output = self
            .provisioner
            .output_all(self.config)
            .await
            .context("terraform output")?;
        let text = check_status(Step::Output, &output)?;
        Ok(OutputSet::from_json(&text)?)
    }
}

async fn read_output(
    provisioner: &impl OutputReader,
    config: &DeploymentConfig,
    name: &str,
) -> Result<String> {
    let output = provisioner
        .output(config, name)
        .await
        .with_context(|| format!("terraform output {name}"))?;
    if !output.status.success() {
        let text = combined_output(&output);
        if text.contains(&format!("Output \"{name}\" not found")) {
            return Err(ProvisionError::OutputNotFound {
                name: name.to_string(),
            }
            .into());
        }
        check_status(Step::Output, &output)?;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_single_output(&stdout)?)
}

// ── Lifecycle steps ──────────────────────────────────────────────────────────

/// Failure raised inside the guarded scope.
enum ScopeError {
    /// init or apply failed.
    Provision { step: Step, error: anyhow::Error },
    /// The body returned an error.
    Body(anyhow::Error),
}

/// Run `init` then `apply`, each under the configuration's retry policy.
///
/// # Errors
///
/// Returns the failing step and its error.
async fn init_and_apply(
    provisioner: &impl Provisioner,
    config: &DeploymentConfig,
    reporter: &impl ProgressReporter,
) -> Result<(), ScopeError> {
    let module = config.module_dir().display().to_string();

    reporter.step(&format!("terraform init ({module})"));
    run_step(Step::Init, config.retry(), reporter, || provisioner.init(config))
        .await
        .map_err(|error| ScopeError::Provision {
            step: Step::Init,
            error,
        })?;

    reporter.step(&format!("terraform apply ({module})"));
    run_step(Step::Apply, config.retry(), reporter, || provisioner.apply(config))
        .await
        .map_err(|error| ScopeError::Provision {
            step: Step::Apply,
            error,
        })?;
    reporter.success("apply complete");
    info!(%module, "module applied");
    Ok(())
}

/// Destroy the module once. Failure is reported, never propagated.
async fn teardown(
    provisioner: &impl Provisioner,
    config: &DeploymentConfig,
    reporter: &impl ProgressReporter,
) -> TeardownOutcome {
    let module = config.module_dir().display().to_string();
    reporter.step(&format!("terraform destroy ({module})"));
    match run_step(Step::Destroy, config.retry(), reporter, || {
        provisioner.destroy(config)
    })
    .await
    {
        Ok(_) => {
            reporter.success("destroy complete");
            info!(%module, "module destroyed");
            TeardownOutcome::Destroyed
        }
        Err(e) => {
            error!(%module, error = %e, "teardown failed; resources may be left behind");
            reporter.warn(&format!("destroy failed: {e}"));
            TeardownOutcome::Failed(format!("{e:#}"))
        }
    }
}

/// init + apply, then `body`, then destroy on every exit path.
///
/// Panics raised by `body` are resumed after destroy has run.
async fn scoped<'a, P, R, F, Fut>(
    provisioner: &'a P,
    config: &'a DeploymentConfig,
    reporter: &impl ProgressReporter,
    body: F,
) -> (Result<R, ScopeError>, TeardownOutcome)
where
    P: Provisioner,
    F: FnOnce(Deployment<'a, P>) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let guarded = AssertUnwindSafe(async {
        init_and_apply(provisioner, config, reporter).await?;
        body(Deployment {
            provisioner,
            config,
        })
        .await
        .map_err(ScopeError::Body)
    })
    .catch_unwind()
    .await;

    let outcome = teardown(provisioner, config, reporter).await;

    match guarded {
        Ok(result) => (result, outcome),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Apply the module, hand it to `body`, and destroy it afterwards no matter
/// how `body` exits.
///
/// A destroy failure is reported through `reporter` and the log but does
/// not change the result.
///
/// # Errors
///
/// Returns the init/apply error or the error returned by `body`.
pub async fn with_deployment<'a, P, R, F, Fut>(
    provisioner: &'a P,
    config: &'a DeploymentConfig,
    reporter: &impl ProgressReporter,
    body: F,
) -> Result<R>
where
    P: Provisioner,
    F: FnOnce(Deployment<'a, P>) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let (result, _teardown) = scoped(provisioner, config, reporter, body).await;
    result.map_err(|e| match e {
        ScopeError::Provision { step, error } => error.context(format!("terraform {step} failed")),
        ScopeError::Body(error) => error,
    })
}

/// Apply the module, evaluate `checks` against its outputs, destroy it.
///
/// Never returns an error: every failure is captured in the report.
pub async fn run_scenario(
    provisioner: &impl Provisioner,
    name: &str,
    config: &DeploymentConfig,
    checks: &[OutputCheck],
    reporter: &impl ProgressReporter,
) -> ScenarioReport {
    info!(scenario = %name, module = %config.module_dir().display(), "running scenario");

    let (result, teardown) = scoped(provisioner, config, reporter, |deployment| async move {
        Ok(evaluate_checks(deployment, checks, reporter).await)
    })
    .await;

    let (lifecycle_failure, checks, outputs) = match result {
        Ok((outcomes, outputs)) => (None, outcomes, outputs),
        Err(ScopeError::Provision { step, error }) => (
            Some(LifecycleFailure {
                step,
                message: format!("{error:#}"),
            }),
            Vec::new(),
            OutputSet::new(),
        ),
        Err(ScopeError::Body(error)) => (
            Some(LifecycleFailure {
                step: Step::Output,
                message: format!("{error:#}"),
            }),
            Vec::new(),
            OutputSet::new(),
        ),
    };

    let report = ScenarioReport {
        name: name.to_string(),
        lifecycle_failure,
        checks,
        outputs,
        teardown,
    };
    info!(scenario = %name, passed = report.passed(), "scenario finished");
    report
}

async fn evaluate_checks<P: OutputReader>(
    deployment: Deployment<'_, P>,
    checks: &[OutputCheck],
    reporter: &impl ProgressReporter,
) -> (Vec<CheckOutcome>, OutputSet) {
    let mut fetched: BTreeMap<String, Result<String, String>> = BTreeMap::new();
    let mut outcomes = Vec::with_capacity(checks.len());

    for check in checks {
        if !fetched.contains_key(&check.output) {
            let value = deployment
                .output(&check.output)
                .await
                .map_err(|e| format!("{e:#}"));
            fetched.insert(check.output.clone(), value);
        }
        let outcome = match &fetched[&check.output] {
            Ok(value) => CheckOutcome {
                check: check.clone(),
                value: Some(value.clone()),
                failure: check.evaluate(value).err(),
            },
            Err(reason) => CheckOutcome {
                check: check.clone(),
                value: None,
                failure: Some(AssertionFailure::Missing {
                    output: check.output.clone(),
                    reason: reason.clone(),
                }),
            },
        };
        if outcome.passed() {
            reporter.success(&check.to_string());
        }
        outcomes.push(outcome);
    }

    let outputs = fetched
        .into_iter()
        .filter_map(|(name, value)| value.ok().map(|v| (name, v)))
        .collect();
    (outcomes, outputs)
}

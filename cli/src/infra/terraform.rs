//! Infrastructure implementation of the provisioning port traits.
//!
//! `TerraformCli<R>` routes every terraform invocation through a
//! `CommandRunner`. The module directory is passed with `-chdir` so the
//! process working directory is never changed.

use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, OutputReader, TerraformLifecycle};
use crate::domain::{DeploymentConfig, Step};
use crate::infra::command_runner::TokioCommandRunner;

/// Infrastructure adapter that routes all terraform CLI calls through a `CommandRunner`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct TerraformCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> TerraformCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Arguments for `step` against the configured module.
    #[must_use]
    pub fn args(config: &DeploymentConfig, step: Step, output_name: Option<&str>) -> Vec<String> {
        let mut args = vec![format!("-chdir={}", config.module_dir().display())];
        args.push(step.as_str().to_string());
        match step {
            Step::Init => {
                args.extend(["-upgrade=false".to_string(), "-input=false".to_string()]);
            }
            Step::Apply | Step::Destroy => {
                args.extend(["-input=false".to_string(), "-auto-approve".to_string()]);
            }
            Step::Output | Step::Version => {}
        }
        if config.no_color() && step != Step::Version {
            args.push("-no-color".to_string());
        }
        match step {
            Step::Apply | Step::Destroy => args.extend(config.var_args()),
            Step::Output => {
                args.push("-json".to_string());
                if let Some(name) = output_name {
                    args.push(name.to_string());
                }
            }
            _ => {}
        }
        args
    }

    async fn invoke(
        &self,
        config: &DeploymentConfig,
        step: Step,
        output_name: Option<&str>,
    ) -> Result<Output> {
        let args = Self::args(config, step, output_name);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let binary = config.binary();
        let result = match config.timeout() {
            Some(timeout) => self.runner.run_with_timeout(binary, &args, timeout).await,
            None => self.runner.run(binary, &args).await,
        };
        result.with_context(|| format!("{binary} {step}"))
    }
}

impl TerraformCli<TokioCommandRunner> {
    /// Convenience constructor for production use: no timeout, and the
    /// environment terraform expects when nobody is at the keyboard.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(
            TokioCommandRunner::new(None)
                .with_env("TF_IN_AUTOMATION", "1")
                .with_env("TF_INPUT", "0"),
        )
    }
}

impl<R: CommandRunner> TerraformLifecycle for TerraformCli<R> {
    async fn init(&self, config: &DeploymentConfig) -> Result<Output> {
        self.invoke(config, Step::Init, None).await
    }

    async fn apply(&self, config: &DeploymentConfig) -> Result<Output> {
        self.invoke(config, Step::Apply, None).await
    }

    async fn destroy(&self, config: &DeploymentConfig) -> Result<Output> {
        self.invoke(config, Step::Destroy, None).await
    }
}

impl<R: CommandRunner> OutputReader for TerraformCli<R> {
    async fn output(&self, config: &DeploymentConfig, name: &str) -> Result<Output> {
        self.invoke(config, Step::Output, Some(name)).await
    }

    async fn output_all(&self, config: &DeploymentConfig) -> Result<Output> {
        self.invoke(config, Step::Output, None).await
    }

    async fn version(&self, binary: &str) -> Result<Output> {
        self.runner
            .run(binary, &["version", "-json"])
            .await
            .with_context(|| format!("{binary} version"))
    }
}

//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::DeploymentConfig;

// ── Provisioning Port Traits ──────────────────────────────────────────────────

/// Module lifecycle operations: init, apply, destroy.
///
/// Implementations return the raw process output; interpreting the exit
/// status is the caller's job.
#[allow(async_fn_in_trait)]
pub trait TerraformLifecycle {
    /// Initialise the working directory (providers, modules, backend).
    async fn init(&self, config: &DeploymentConfig) -> Result<Output>;
    /// Create or update the module's resources.
    async fn apply(&self, config: &DeploymentConfig) -> Result<Output>;
    /// Destroy every resource the module manages.
    async fn destroy(&self, config: &DeploymentConfig) -> Result<Output>;
}

/// Read-only queries against an applied module.
#[allow(async_fn_in_trait)]
pub trait OutputReader {
    /// JSON value of a single named output.
    async fn output(&self, config: &DeploymentConfig, name: &str) -> Result<Output>;
    /// JSON object holding every output of the module.
    async fn output_all(&self, config: &DeploymentConfig) -> Result<Output>;
    /// Version report of the provisioning binary (`version -json`).
    async fn version(&self, binary: &str) -> Result<Output>;
}

/// Composite trait — any type implementing both sub-traits is a `Provisioner`.
pub trait Provisioner: TerraformLifecycle + OutputReader {}

/// Blanket implementation: any type implementing both sub-traits is a `Provisioner`.
impl<T> Provisioner for T where T: TerraformLifecycle + OutputReader {}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations apply their configured default timeout, if any.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

/// Reporter that discards every event.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

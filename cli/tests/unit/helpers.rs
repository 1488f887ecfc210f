//! Shared test helpers: a scripted terraform double and output constructors.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::process::{ExitStatus, Output};

use anyhow::Result;
use deploy_verify::application::ports::{OutputReader, TerraformLifecycle};
use deploy_verify::domain::DeploymentConfig;

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(stderr: &[u8]) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── FakeTerraform ────────────────────────────────────────────────────────────

/// In-memory terraform double.
///
/// Outputs only exist between a successful apply and the following destroy,
/// mirroring a real state file.
#[derive(Default)]
pub struct FakeTerraform {
    outputs: BTreeMap<String, String>,
    applied: Cell<bool>,
    /// init fails this many times with a transient registry error first.
    pub flaky_init: Cell<u32>,
    fail_apply: bool,
    fail_destroy: bool,
    calls: RefCell<Vec<String>>,
    seen_vars: RefCell<Vec<Vec<String>>>,
}

impl FakeTerraform {
    /// A module that exposes the given outputs once applied.
    pub fn with_outputs(outputs: &[(&str, &str)]) -> Self {
        Self {
            outputs: outputs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// The unit tunnel module: a named tunnel with a generated id.
    pub fn tunnel_module() -> Self {
        Self::with_outputs(&[
            ("tunnel_id", "6ff42ae2-765d-4adf-8112-31c55c1551ef"),
            ("tunnel_name", "azure-tunnel"),
        ])
    }

    /// The full deployment module: tunnel, VM and NIC.
    pub fn full_deployment_module() -> Self {
        Self::with_outputs(&[
            ("tunnel_id", "6ff42ae2-765d-4adf-8112-31c55c1551ef"),
            ("vm_id", "/subscriptions/0000/resourceGroups/rg-cloudflared-test/providers/Microsoft.Compute/virtualMachines/vm-cloudflared"),
            ("nic_id", "/subscriptions/0000/resourceGroups/rg-cloudflared-test/providers/Microsoft.Network/networkInterfaces/nic-cloudflared"),
        ])
    }

    /// Make every apply fail with a provider error.
    pub fn failing_apply(mut self) -> Self {
        self.fail_apply = true;
        self
    }

    /// Make every destroy fail, leaving resources behind.
    pub fn failing_destroy(mut self) -> Self {
        self.fail_destroy = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    /// `-var` arguments seen by each apply and destroy, in call order.
    pub fn seen_vars(&self) -> Vec<Vec<String>> {
        self.seen_vars.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl TerraformLifecycle for FakeTerraform {
    async fn init(&self, _config: &DeploymentConfig) -> Result<Output> {
        self.record("init");
        let remaining = self.flaky_init.get();
        if remaining > 0 {
            self.flaky_init.set(remaining - 1);
            return Ok(err_output(
                b"Error: Failed to query available provider packages\n\
                  could not connect to registry.terraform.io: TLS handshake timeout",
            ));
        }
        Ok(ok_output(b"Terraform has been successfully initialized!"))
    }

    async fn apply(&self, config: &DeploymentConfig) -> Result<Output> {
        self.record("apply");
        self.seen_vars.borrow_mut().push(config.var_args());
        if self.fail_apply {
            return Ok(err_output(b"Error: creating tunnel: 403 Forbidden"));
        }
        self.applied.set(true);
        Ok(ok_output(b"Apply complete! Resources: 3 added, 0 changed, 0 destroyed."))
    }

    async fn destroy(&self, config: &DeploymentConfig) -> Result<Output> {
        self.record("destroy");
        self.seen_vars.borrow_mut().push(config.var_args());
        if self.fail_destroy {
            return Ok(err_output(b"Error: deleting tunnel: tunnel has active connections"));
        }
        self.applied.set(false);
        Ok(ok_output(b"Destroy complete! Resources: 3 destroyed."))
    }
}

impl OutputReader for FakeTerraform {
    async fn output(&self, _config: &DeploymentConfig, name: &str) -> Result<Output> {
        self.record(format!("output {name}"));
        match self.outputs.get(name) {
            Some(value) if self.applied.get() => {
                Ok(ok_output(serde_json::to_string(value)?.as_bytes()))
            }
            _ => Ok(err_output(
                format!(
                    "Error: Output \"{name}\" not found\n\nThe output variable requested could not be found in the state file."
                )
                .as_bytes(),
            )),
        }
    }

    async fn output_all(&self, _config: &DeploymentConfig) -> Result<Output> {
        self.record("output");
        let mut all = serde_json::Map::new();
        if self.applied.get() {
            for (name, value) in &self.outputs {
                all.insert(
                    name.clone(),
                    serde_json::json!({ "sensitive": false, "type": "string", "value": value }),
                );
            }
        }
        Ok(ok_output(serde_json::Value::Object(all).to_string().as_bytes()))
    }

    async fn version(&self, _binary: &str) -> Result<Output> {
        self.record("version");
        Ok(ok_output(br#"{"terraform_version":"1.9.5","platform":"linux_amd64"}"#))
    }
}

/// Reporter that keeps every message for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    pub steps: RefCell<Vec<String>>,
    pub successes: RefCell<Vec<String>>,
    pub warnings: RefCell<Vec<String>>,
}

impl deploy_verify::application::ports::ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.steps.borrow_mut().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.successes.borrow_mut().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }
}

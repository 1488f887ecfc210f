//! Shared test helpers for application service tests.
//!
//! Provides cross-platform `exit_status()`, canned `Output` builders and a
//! scripted `Provisioner` spy that records every call it receives.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::process::Output;

use anyhow::Result;

use crate::application::ports::{OutputReader, TerraformLifecycle};
use crate::domain::DeploymentConfig;

/// Build an `ExitStatus` from a logical exit code (cross-platform).
#[cfg(unix)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    std::process::ExitStatus::from_raw(code as u32)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn fail_output_with(stderr: &[u8]) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

/// Provisioner double: every lifecycle step succeeds unless told otherwise,
/// outputs come from a fixed map, and each call is appended to `calls`.
#[derive(Default)]
pub struct ScriptedProvisioner {
    pub outputs: BTreeMap<String, String>,
    pub fail_init: bool,
    pub fail_apply: bool,
    pub fail_destroy: bool,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedProvisioner {
    pub fn with_outputs(pairs: &[(&str, &str)]) -> Self {
        Self {
            outputs: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl TerraformLifecycle for ScriptedProvisioner {
    async fn init(&self, _: &DeploymentConfig) -> Result<Output> {
        self.record("init");
        Ok(if self.fail_init {
            fail_output_with(b"Error: Failed to query available provider packages")
        } else {
            ok_output(b"Terraform has been successfully initialized!")
        })
    }

    async fn apply(&self, _: &DeploymentConfig) -> Result<Output> {
        self.record("apply");
        Ok(if self.fail_apply {
            fail_output_with(b"Error: creating tunnel: 403 Forbidden")
        } else {
            ok_output(b"Apply complete! Resources: 1 added, 0 changed, 0 destroyed.")
        })
    }

    async fn destroy(&self, _: &DeploymentConfig) -> Result<Output> {
        self.record("destroy");
        Ok(if self.fail_destroy {
            fail_output_with(b"Error: deleting tunnel: 409 Conflict")
        } else {
            ok_output(b"Destroy complete! Resources: 1 destroyed.")
        })
    }
}

impl OutputReader for ScriptedProvisioner {
    async fn output(&self, _: &DeploymentConfig, name: &str) -> Result<Output> {
        self.record(format!("output {name}"));
        Ok(match self.outputs.get(name) {
            Some(value) => ok_output(serde_json::Value::String(value.clone()).to_string().as_bytes()),
            None => fail_output_with(
                format!("Error: Output \"{name}\" not found\n\nThe output variable requested could not be found in the state file.").as_bytes(),
            ),
        })
    }

    async fn output_all(&self, _: &DeploymentConfig) -> Result<Output> {
        self.record("output");
        let body: serde_json::Map<String, serde_json::Value> = self
            .outputs
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::json!({"sensitive": false, "type": "string", "value": v})))
            .collect();
        Ok(ok_output(serde_json::Value::Object(body).to_string().as_bytes()))
    }

    async fn version(&self, _: &str) -> Result<Output> {
        self.record("version");
        Ok(ok_output(br#"{"terraform_version":"1.9.5","platform":"linux_amd64"}"#))
    }
}

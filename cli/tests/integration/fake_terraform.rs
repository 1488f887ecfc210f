//! A throwaway `terraform` executable for driving the real binary end to end.
//!
//! The script logs every invocation, answers `version -json`, and serves
//! canned outputs by name. Everything lives in a temp directory that is
//! removed when the fixture is dropped.

#![allow(clippy::expect_used, dead_code)]

use std::fmt::Write as _;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub struct FakeTerraform {
    dir: TempDir,
    outputs: Vec<(String, String)>,
    fail_apply: bool,
    fail_destroy: bool,
}

impl FakeTerraform {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
            outputs: Vec::new(),
            fail_apply: false,
            fail_destroy: false,
        }
    }

    /// Serve `value` (as a JSON string) for `terraform output -json <name>`.
    pub fn output(mut self, name: &str, value: &str) -> Self {
        self.outputs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn failing_apply(mut self) -> Self {
        self.fail_apply = true;
        self
    }

    pub fn failing_destroy(mut self) -> Self {
        self.fail_destroy = true;
        self
    }

    /// The unit tunnel module's outputs.
    pub fn tunnel() -> Self {
        Self::new()
            .output("tunnel_name", "azure-tunnel")
            .output("tunnel_id", "6ff42ae2-765d-4adf-8112-31c55c1551ef")
    }

    /// Write the script and return its path.
    pub fn install(&self) -> PathBuf {
        let path = self.dir.path().join("terraform");
        std::fs::write(&path, self.script()).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
        path
    }

    /// Write a scenario file next to the script and return its path.
    pub fn scenario(&self, file_name: &str, yaml: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, yaml).expect("write scenario");
        path
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("calls.log")
    }

    /// Every logged invocation, one line of space-joined args each.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Number of invocations whose subcommand is `sub`.
    pub fn count(&self, sub: &str) -> usize {
        self.calls()
            .iter()
            .filter(|line| subcommand(line) == Some(sub))
            .count()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    fn script(&self) -> String {
        let mut outputs = String::new();
        for (name, value) in &self.outputs {
            let _ = writeln!(outputs, "      {name}) echo '\"{value}\"' ;;");
        }
        let apply = if self.fail_apply {
            "echo 'Error: creating tunnel: 403 Forbidden' >&2; exit 1"
        } else {
            "echo 'Apply complete! Resources: 3 added, 0 changed, 0 destroyed.'"
        };
        let destroy = if self.fail_destroy {
            "echo 'Error: deleting tunnel: tunnel has active connections' >&2; exit 1"
        } else {
            "echo 'Destroy complete! Resources: 3 destroyed.'"
        };
        format!(
            r#"#!/bin/sh
printf '%s\n' "$*" >> '{log}'
if [ "$1" = "version" ]; then
  echo '{{"terraform_version":"1.9.5","platform":"linux_amd64"}}'
  exit 0
fi
case "$2" in
  init) echo 'Terraform has been successfully initialized!' ;;
  apply) {apply} ;;
  destroy) {destroy} ;;
  output)
    for arg in "$@"; do name="$arg"; done
    case "$name" in
{outputs}      *) echo "Error: Output \"$name\" not found" >&2; exit 1 ;;
    esac
    ;;
  *) echo "unexpected subcommand: $2" >&2; exit 2 ;;
esac
"#,
            log = self.log_path().display(),
        )
    }
}

/// Subcommand of a logged invocation (`version`, or the word after `-chdir`).
pub fn subcommand(line: &str) -> Option<&str> {
    let mut words = line.split_whitespace();
    match words.next()? {
        "version" => Some("version"),
        _ => words.next(),
    }
}

pub const UNIT_TUNNEL: &str = "\
name: unit tunnel
module: modules/unit/cloudflare_tunnel
vars:
  cloudflare_account_id: test-account-id
checks:
  - output: tunnel_name
    expect: equals
    value: azure-tunnel
  - output: tunnel_id
    expect: not_empty
";

pub const WRONG_TUNNEL_NAME: &str = "\
name: wrong tunnel name
module: modules/unit/cloudflare_tunnel
vars:
  cloudflare_account_id: test-account-id
checks:
  - output: tunnel_name
    expect: equals
    value: aws-tunnel
";

pub const NEEDS_ACCOUNT_ID: &str = "\
name: needs account id
module: modules/unit/cloudflare_tunnel
env_vars:
  cloudflare_account_id: CLOUDFLARE_ACCOUNT_ID
checks:
  - output: tunnel_id
    expect: not_empty
";

pub const BAD_PATTERN: &str = "\
name: bad pattern
module: modules/unit/cloudflare_tunnel
vars:
  cloudflare_account_id: test-account-id
checks:
  - output: tunnel_id
    expect: matches
    pattern: '('
";

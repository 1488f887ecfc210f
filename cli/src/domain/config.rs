//! Deployment configuration: module location, input variables and
//! presentation flags for one provisioning run.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::env::{CLOUDFLARE_ACCOUNT_ID, EnvSource, resolve_required_env_var};
use crate::domain::error::EnvError;
use crate::domain::retry::RetryPolicy;

/// Program invoked when no explicit binary is configured.
pub const DEFAULT_BINARY: &str = "terraform";

/// Module variable fed from [`CLOUDFLARE_ACCOUNT_ID`] by [`DeploymentConfig::common`].
pub const ACCOUNT_ID_VAR: &str = "cloudflare_account_id";

// ── Variable values ──────────────────────────────────────────────────────────

/// A scalar or composite value passed as `-var name=value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<VarValue>),
    Map(BTreeMap<String, VarValue>),
}

impl VarValue {
    /// Render the value the way the provisioning tool parses `-var`.
    ///
    /// Strings go through verbatim; lists and maps use HCL literal syntax
    /// with every string element quoted.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.render_nested(),
        }
    }

    fn render_nested(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => hcl_quote(s),
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Self::render_nested).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Map(entries) => {
                let inner: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{} = {}", hcl_quote(k), v.render_nested()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

/// Quote `s` as an HCL string literal.
///
/// Template sequences are escaped so the value is taken literally.
fn hcl_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => {
                let mut units = [0_u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04X}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// ── Deployment configuration ─────────────────────────────────────────────────

/// Everything needed to drive one module through its lifecycle.
///
/// Built once per test through [`DeploymentConfigBuilder`] and not mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    module_dir: PathBuf,
    vars: BTreeMap<String, VarValue>,
    no_color: bool,
    binary: String,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

impl DeploymentConfig {
    /// Start building a configuration for the module at `module_dir`.
    #[must_use]
    pub fn builder(module_dir: impl Into<PathBuf>) -> DeploymentConfigBuilder {
        DeploymentConfigBuilder {
            config: Self {
                module_dir: module_dir.into(),
                vars: BTreeMap::new(),
                no_color: false,
                binary: DEFAULT_BINARY.to_string(),
                retry: RetryPolicy::default(),
                timeout: None,
            },
        }
    }

    /// Shared options for Cloudflare-backed modules: colour disabled and
    /// `cloudflare_account_id` taken from the required
    /// `CLOUDFLARE_ACCOUNT_ID` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Missing`] when the account id is not set. Nothing
    /// has been provisioned at that point.
    pub fn common(
        env: &impl EnvSource,
        module_dir: impl Into<PathBuf>,
    ) -> Result<DeploymentConfigBuilder, EnvError> {
        let account_id = resolve_required_env_var(env, CLOUDFLARE_ACCOUNT_ID)?;
        Ok(Self::builder(module_dir)
            .no_color(true)
            .var(ACCOUNT_ID_VAR, account_id))
    }

    #[must_use]
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    #[must_use]
    pub fn vars(&self) -> &BTreeMap<String, VarValue> {
        &self.vars
    }

    #[must_use]
    pub fn no_color(&self) -> bool {
        self.no_color
    }

    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    #[must_use]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `-var name=value` pairs in variable-name order.
    #[must_use]
    pub fn var_args(&self) -> Vec<String> {
        self.vars
            .iter()
            .flat_map(|(name, value)| ["-var".to_string(), format!("{name}={}", value.render())])
            .collect()
    }
}

/// Builder for [`DeploymentConfig`].
#[derive(Debug, Clone)]
pub struct DeploymentConfigBuilder {
    config: DeploymentConfig,
}

impl DeploymentConfigBuilder {
    /// Set (or override) an input variable.
    #[must_use]
    pub fn var(mut self, name: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.config.vars.insert(name.into(), value.into());
        self
    }

    /// Set every variable in `vars`, overriding earlier values.
    #[must_use]
    pub fn vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<VarValue>,
    {
        for (name, value) in vars {
            self.config.vars.insert(name.into(), value.into());
        }
        self
    }

    /// Pass `-no-color` to every command.
    #[must_use]
    pub fn no_color(mut self, no_color: bool) -> Self {
        self.config.no_color = no_color;
        self
    }

    /// Program to invoke instead of `terraform` (e.g. `tofu` or an absolute path).
    #[must_use]
    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.config.binary = binary.into();
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Retry transient registry and network failures (3 attempts, 5s apart).
    #[must_use]
    pub fn with_default_retryable_errors(self) -> Self {
        self.retry(RetryPolicy::default_retryable_errors())
    }

    /// Kill any single command that runs longer than `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn build(self) -> DeploymentConfig {
        self.config
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────

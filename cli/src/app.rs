//! Application context — unified state passed to every command handler.
//!
//! `AppContext` carries the output context, the terraform driver and the
//! environment so that command handlers never construct their own.

use crate::application::ports::{ProgressReporter, SilentReporter};
use crate::domain::config::DEFAULT_BINARY;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::env::ProcessEnv;
use crate::infra::terraform::TerraformCli;
use crate::output::{HumanRenderer, OutputContext, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Terraform binary override (`--terraform` / `DEPLOY_VERIFY_TERRAFORM`).
    pub terraform: Option<String>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Terraform CLI driver.
    pub terraform: TerraformCli<TokioCommandRunner>,
    /// Process environment.
    pub env: ProcessEnv,
    terraform_override: Option<String>,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            terraform: TerraformCli::default_runner(),
            env: ProcessEnv,
            terraform_override: flags.terraform.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Binary override to apply to every scenario, if one was given.
    #[must_use]
    pub fn terraform_override(&self) -> Option<&str> {
        self.terraform_override.as_deref()
    }

    /// Binary that will actually be invoked.
    #[must_use]
    pub fn terraform_binary(&self) -> &str {
        self.terraform_override().unwrap_or(DEFAULT_BINARY)
    }

    /// Human renderer for this context.
    #[must_use]
    pub fn human(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }

    /// Progress reporter for the current mode: silent in JSON mode so that
    /// stdout carries a single document.
    #[must_use]
    pub fn reporter(&self) -> Reporter<'_> {
        match self.mode {
            OutputMode::Human => Reporter::Terminal(TerminalReporter::new(&self.output)),
            OutputMode::Json => Reporter::Silent(SilentReporter),
        }
    }
}

/// Progress reporter selected by output mode.
pub enum Reporter<'a> {
    Terminal(TerminalReporter<'a>),
    Silent(SilentReporter),
}

impl ProgressReporter for Reporter<'_> {
    fn step(&self, message: &str) {
        match self {
            Self::Terminal(r) => r.step(message),
            Self::Silent(r) => r.step(message),
        }
    }

    fn success(&self, message: &str) {
        match self {
            Self::Terminal(r) => r.success(message),
            Self::Silent(r) => r.success(message),
        }
    }

    fn warn(&self, message: &str) {
        match self {
            Self::Terminal(r) => r.warn(message),
            Self::Silent(r) => r.warn(message),
        }
    }
}

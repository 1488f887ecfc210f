//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::{ScenarioReport, TeardownOutcome};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        self.ctx.info(&format!("deploy-verify v{version}"));
    }

    /// Title printed before a scenario starts.
    pub fn render_scenario_start(&self, name: &str) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header(&format!("Scenario: {name}"));
    }

    /// Render the failures and verdict of one scenario.
    ///
    /// Passed checks were already reported as progress. Failures are
    /// printed even in quiet mode.
    pub fn render_report(&self, report: &ScenarioReport) {
        if let Some(failure) = &report.lifecycle_failure {
            self.ctx
                .error(&format!("terraform {} failed: {}", failure.step, failure.message));
        }
        for failure in report.failures() {
            self.ctx.error(&failure.to_string());
        }
        if let TeardownOutcome::Failed(message) = &report.teardown {
            self.ctx.error(&format!(
                "destroy failed, resources may be left behind: {message}"
            ));
        }
        if !self.ctx.quiet || !report.passed() {
            println!("{}", verdict_line(self.ctx, report));
        }
    }

    /// Summary line after several scenarios.
    pub fn render_summary(&self, reports: &[ScenarioReport]) {
        if self.ctx.quiet || reports.len() < 2 {
            return;
        }
        let passed = reports.iter().filter(|r| r.passed()).count();
        println!();
        self.ctx
            .kv("Scenarios:", &format!("{passed}/{} passed", reports.len()));
    }

    /// Result of the prerequisite check.
    pub fn render_check(&self, terraform: &str, version: &semver::Version, missing_env: &[String]) {
        self.ctx.success(&format!("{terraform} {version}"));
        for name in missing_env {
            self.ctx
                .error(&format!("Required environment variable {name} is not set"));
        }
        if missing_env.is_empty() {
            self.ctx.success("required environment variables are set");
        }
    }
}

fn verdict_line(ctx: &OutputContext, report: &ScenarioReport) -> String {
    if report.passed() {
        format!("{} {}", "PASS".style(ctx.styles.success), report.name)
    } else {
        format!("{} {}", "FAIL".style(ctx.styles.error), report.name)
    }
}

//! Run command — provision each scenario, verify its outputs, tear it down.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::app::AppContext;
use crate::application::ports::ProgressReporter;
use crate::application::run_scenario;
use crate::application::services::prerequisites::check_terraform;
use crate::domain::{DeploymentConfig, Scenario, ScenarioReport};
use crate::infra::scenario_file::load_scenario;
use crate::output::json;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Scenario files to run, in order
    #[arg(required = true, value_name = "SCENARIO")]
    pub scenarios: Vec<PathBuf>,

    /// Keep running the remaining scenarios after one fails
    #[arg(long)]
    pub keep_going: bool,
}

/// Entry point for `deploy-verify run`.
///
/// Every scenario is loaded and its environment resolved before the first
/// one is applied, so a missing variable never leaves half a run behind.
/// Returns `Ok(false)` when any scenario failed.
///
/// # Errors
///
/// Returns an error if a scenario file is invalid, a required environment
/// variable is missing, or terraform is unusable.
pub async fn run(app: &AppContext, args: &RunArgs) -> Result<bool> {
    let prepared = prepare(app, &args.scenarios)?;
    check_terraform(&app.terraform, app.terraform_binary()).await?;

    let reporter = app.reporter();
    let reports = run_all(app, &prepared, args.keep_going, &reporter).await;

    if app.is_json() {
        println!("{}", json::format_reports(&reports)?);
    } else {
        app.human().render_summary(&reports);
    }

    Ok(reports.len() == prepared.len() && reports.iter().all(ScenarioReport::passed))
}

fn prepare(app: &AppContext, paths: &[PathBuf]) -> Result<Vec<(Scenario, DeploymentConfig)>> {
    paths
        .iter()
        .map(|path| {
            let loaded = load_scenario(path)?;
            let config = loaded
                .scenario
                .to_config(&app.env, &loaded.base_dir, app.terraform_override())
                .with_context(|| format!("invalid scenario {}", path.display()))?;
            Ok((loaded.scenario, config))
        })
        .collect()
}

async fn run_all(
    app: &AppContext,
    prepared: &[(Scenario, DeploymentConfig)],
    keep_going: bool,
    reporter: &impl ProgressReporter,
) -> Vec<ScenarioReport> {
    let mut reports = Vec::with_capacity(prepared.len());
    for (scenario, config) in prepared {
        if !app.is_json() {
            app.human().render_scenario_start(&scenario.name);
        }
        let report = run_scenario(
            &app.terraform,
            &scenario.name,
            config,
            &scenario.checks,
            reporter,
        )
        .await;
        if !app.is_json() {
            app.human().render_report(&report);
        }
        let failed = !report.passed();
        reports.push(report);

        if failed && !keep_going {
            let skipped = prepared.len() - reports.len();
            if skipped > 0 {
                info!(skipped, "stopping after failed scenario");
                if !app.is_json() {
                    app.output.warn(&format!(
                        "skipping {skipped} remaining scenario(s); use --keep-going to run them"
                    ));
                }
            }
            break;
        }
    }
    reports
}

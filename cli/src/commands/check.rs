//! Check command — verify prerequisites without touching infrastructure.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::prerequisites::{check_terraform, missing_env};
use crate::infra::scenario_file::load_scenario;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Scenario whose required environment variables should be checked
    #[arg(value_name = "SCENARIO")]
    pub scenario: Option<PathBuf>,
}

/// Entry point for `deploy-verify check`.
///
/// Returns `Ok(false)` when a required environment variable is missing.
///
/// # Errors
///
/// Returns an error if terraform is missing or too old, or the scenario
/// file cannot be loaded.
pub async fn run(app: &AppContext, args: &CheckArgs) -> Result<bool> {
    let binary = app.terraform_binary();
    let version = check_terraform(&app.terraform, binary).await?;

    let missing = match &args.scenario {
        Some(path) => {
            let loaded = load_scenario(path)
                .with_context(|| format!("checking {}", path.display()))?;
            missing_env(&loaded.scenario, &app.env)
        }
        None => Vec::new(),
    };

    if app.is_json() {
        let obj = serde_json::json!({
            "ok": missing.is_empty(),
            "terraform": { "binary": binary, "version": version.to_string() },
            "missing_env": missing,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&obj).context("JSON serialization failed")?
        );
    } else {
        app.human().render_check(binary, &version, &missing);
    }
    Ok(missing.is_empty())
}

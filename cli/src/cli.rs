//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Provision Terraform modules, verify their outputs, and tear them down
#[derive(Parser)]
#[command(
    name = "deploy-verify",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Terraform binary to invoke
    #[arg(long, global = true, env = "DEPLOY_VERIFY_TERRAFORM", value_name = "PATH")]
    pub terraform: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply scenarios, check their outputs, destroy them
    Run(commands::run::RunArgs),

    /// Check terraform and a scenario's environment without provisioning
    Check(commands::check::CheckArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot run to completion. A scenario
    /// that ran and failed is reported through the exit code instead.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            terraform,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            terraform,
        });
        let ok = match command {
            Command::Run(args) => commands::run::run(&app, &args).await?,
            Command::Check(args) => commands::check::run(&app, &args).await?,
            Command::Version => {
                commands::version::run(&app)?;
                true
            }
        };
        Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

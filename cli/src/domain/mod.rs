//! Domain layer — pure types, validation and evaluation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs` or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod check;
pub mod config;
pub mod env;
pub mod error;
pub mod output;
pub mod retry;
pub mod scenario;

pub use check::{Expectation, OutputCheck};
pub use config::{DeploymentConfig, DeploymentConfigBuilder, VarValue};
pub use env::{CLOUDFLARE_ACCOUNT_ID, EnvSource, resolve_required_env_var};
pub use error::{AssertionFailure, EnvError, ProvisionError, ScenarioError, Step};
pub use output::OutputSet;
pub use retry::RetryPolicy;
pub use scenario::{
    CheckOutcome, LifecycleFailure, Scenario, ScenarioReport, TeardownOutcome,
};

//! Environment inputs as an explicit, injectable mapping.
//!
//! Resolution never reads the process environment directly: callers pass an
//! [`EnvSource`], so tests supply a plain map instead of mutating globals.

use std::collections::{BTreeMap, HashMap};

use crate::domain::error::EnvError;

/// Account identifier consumed by every Cloudflare-backed module.
pub const CLOUDFLARE_ACCOUNT_ID: &str = "CLOUDFLARE_ACCOUNT_ID";

/// Read-only view of a set of environment variables.
pub trait EnvSource {
    /// Value of `name`, or `None` when unset.
    fn var(&self, name: &str) -> Option<String>;
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Resolve a variable that must be present and non-empty.
///
/// # Errors
///
/// Returns [`EnvError::Missing`] when `name` is unset or empty. There is no
/// default and no retry.
pub fn resolve_required_env_var(env: &impl EnvSource, name: &str) -> Result<String, EnvError> {
    match env.var(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(EnvError::Missing {
            name: name.to_string(),
        }),
    }
}

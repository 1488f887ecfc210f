//! Loading scenario definitions from YAML files on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::Scenario;

/// A parsed scenario together with the directory its relative module path
/// resolves against.
#[derive(Debug, Clone)]
pub struct LoadedScenario {
    pub scenario: Scenario,
    pub base_dir: PathBuf,
}

/// Read and parse a scenario file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid scenario.
pub fn load_scenario(path: &Path) -> Result<LoadedScenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let scenario: Scenario = serde_yaml::from_str(&content)
        .with_context(|| format!("cannot parse {}", path.display()))?;
    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(LoadedScenario { scenario, base_dir })
}

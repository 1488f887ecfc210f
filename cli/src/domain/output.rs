//! Output values reported by the provisioning tool after apply.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::error::{ProvisionError, Step};

/// Output name → string value, read back after a successful apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutputSet(BTreeMap<String, String>);

impl OutputSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse `output -json` (no name): `{"<name>": {"value": .., "type": .., "sensitive": ..}}`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Unparseable`] when the text is not the
    /// expected JSON object.
    pub fn from_json(text: &str) -> Result<Self, ProvisionError> {
        let parsed: serde_json::Value = serde_json::from_str(text).map_err(|e| unparseable(&e))?;
        let object = parsed.as_object().ok_or_else(|| ProvisionError::Unparseable {
            step: Step::Output,
            reason: "expected a JSON object".to_string(),
        })?;
        let mut set = Self::new();
        for (name, entry) in object {
            let value = entry.get("value").ok_or_else(|| ProvisionError::Unparseable {
                step: Step::Output,
                reason: format!("output '{name}' has no value"),
            })?;
            set.insert(name.clone(), value_to_string(value));
        }
        Ok(set)
    }
}

impl FromIterator<(String, String)> for OutputSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse `output -json <name>`: the bare JSON value of one output.
///
/// # Errors
///
/// Returns [`ProvisionError::Unparseable`] when the text is not JSON.
pub fn parse_single_output(text: &str) -> Result<String, ProvisionError> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).map_err(|e| unparseable(&e))?;
    Ok(value_to_string(&value))
}

/// Strings are taken verbatim; everything else is rendered as compact JSON.
fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn unparseable(err: &serde_json::Error) -> ProvisionError {
    ProvisionError::Unparseable {
        step: Step::Output,
        reason: err.to_string(),
    }
}

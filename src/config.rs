use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::constants::CONFIG_FILE_NAME;
use crate::error::{Result, TestSpecError};

const DEFAULT_LOG_HINT: &str = "\
If you want to examine the raw LSP logs, check the sent and received logs
that the command runner recorded for this test.";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TestSpecConfig {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub locator: LocatorConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Append `log_hint` to failure reports.
    #[serde(default = "true_bool")]
    pub raw_log_hint: bool,
    #[serde(default = "default_log_hint")]
    pub log_hint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VerifyConfig {
    /// Methods ignored by every spec, on top of each spec's own list.
    #[serde(default)]
    pub ignored_notifications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocatorConfig {
    /// Parse test sources to show call sites in reports.
    #[serde(default = "true_bool")]
    pub enabled: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            raw_log_hint: true,
            log_hint: default_log_hint(),
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl TestSpecConfig {
    /// Load `lsp-testspec.toml` from `root`, layered over the defaults.
    ///
    /// A missing file yields the defaults.
    pub fn load_from_dir(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content =
            fs::read_to_string(&config_path).map_err(|e| TestSpecError::io(&config_path, e))?;
        Self::from_toml_str(&content)
            .map_err(|reason| TestSpecError::config(&config_path, reason))
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, String> {
        let mut config_json = serde_json::to_value(Self::default())
            .map_err(|e| format!("Failed to serialize defaults: {}", e))?;

        let toml_value: toml::Value =
            toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))?;
        merge_json(&mut config_json, toml_to_json(&toml_value));

        serde_json::from_value(config_json)
            .map_err(|e| format!("Failed to deserialize merged config: {}", e))
    }
}

/// JSON view of a TOML document. Every setting here is a string, a bool, a
/// list or a table; other scalars pass through as their TOML text and are
/// rejected when the merged value is deserialized.
fn toml_to_json(toml: &toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(key, value)| (key.clone(), toml_to_json(value)))
                .collect(),
        ),
        other => Value::String(other.to_string()),
    }
}

/// Deep-merge `overlay` into `defaults`: tables merge key by key, anything
/// else replaces the default outright.
fn merge_json(defaults: &mut Value, overlay: Value) {
    match (defaults, overlay) {
        (Value::Object(defaults), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match defaults.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        defaults.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn true_bool() -> bool {
    true
}

fn default_log_hint() -> String {
    DEFAULT_LOG_HINT.to_string()
}

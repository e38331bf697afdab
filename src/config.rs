use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub patterns: PatternConfig,
}

/// Pattern overrides, kept apart from the patterns themselves.
///
/// Priority overrides are read as raw JSON so that out-of-range or non-integer
/// values survive parsing and can be dropped by the catalog instead of failing
/// the whole document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatternConfig {
    pub disabled: Vec<String>,
    pub priority_overrides: BTreeMap<String, serde_json::Value>,
    pub custom_settings: BTreeMap<String, serde_json::Value>,
}

impl OptimizerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Failure inside a single pattern's `apply`. The engine logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("pattern '{id}' failed: {reason}")]
    Failed { id: String, reason: String },

    #[error("pattern '{id}' has an invalid setting '{key}': {reason}")]
    InvalidSetting {
        id: String,
        key: String,
        reason: String,
    },
}

/// Problems found while registering patterns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("pattern '{0}' is already registered")]
    DuplicatePattern(String),

    #[error("pattern '{id}' has priority {priority}, expected 1..=10")]
    InvalidPriority { id: String, priority: u8 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Unknown name given for a mode, phase or intent.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

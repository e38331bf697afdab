use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Processing depth requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Fast,
    Deep,
    /// Product requirements workflow; fast while validating, deep otherwise.
    Prd,
    /// Multi-turn workflow; fast while clarifying, deep otherwise.
    Conversational,
}

/// Workflow step a pattern may be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Validation,
    Clarification,
    Drafting,
    Output,
}

/// The mode a pattern declares itself for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternMode {
    Fast,
    Deep,
    Both,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Deep => "deep",
            Self::Prd => "prd",
            Self::Conversational => "conversational",
        }
    }

    /// Map a (possibly composite) mode onto the fast/deep axis patterns declare.
    pub fn resolve(&self, phase: Option<Phase>) -> PatternMode {
        match self {
            Self::Fast => PatternMode::Fast,
            Self::Deep => PatternMode::Deep,
            Self::Prd => match phase {
                Some(Phase::Validation) => PatternMode::Fast,
                _ => PatternMode::Deep,
            },
            Self::Conversational => match phase {
                Some(Phase::Clarification) => PatternMode::Fast,
                _ => PatternMode::Deep,
            },
        }
    }
}

impl PatternMode {
    /// Whether a pattern declared for `self` runs under the resolved mode.
    pub fn admits(&self, resolved: PatternMode) -> bool {
        *self == PatternMode::Both || *self == resolved
    }
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Clarification => "clarification",
            Self::Drafting => "drafting",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "deep" => Ok(Self::Deep),
            "prd" => Ok(Self::Prd),
            "conversational" => Ok(Self::Conversational),
            _ => Err(ParseError::new("mode", s)),
        }
    }
}

impl FromStr for Phase {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "validation" => Ok(Self::Validation),
            "clarification" => Ok(Self::Clarification),
            "drafting" => Ok(Self::Drafting),
            "output" => Ok(Self::Output),
            _ => Err(ParseError::new("phase", s)),
        }
    }
}

pub mod catalog;
pub mod rules;
pub mod scheduler;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::PatternError;
use crate::intent::{Intent, IntentAnalysis};
use crate::mode::{Mode, PatternMode, Phase};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Quality dimension an improvement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Clarity,
    Efficiency,
    Structure,
    Completeness,
    Actionability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    pub dimension: Dimension,
    pub description: String,
    pub impact: Impact,
}

impl Improvement {
    pub fn new(dimension: Dimension, description: impl Into<String>, impact: Impact) -> Self {
        Self {
            dimension,
            description: description.into(),
            impact,
        }
    }
}

/// Outcome of one `apply` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternApplication {
    pub enhanced_text: String,
    pub improvement: Option<Improvement>,
    pub applied: bool,
}

impl PatternApplication {
    pub fn applied(enhanced_text: String, improvement: Improvement) -> Self {
        Self {
            enhanced_text,
            improvement: Some(improvement),
            applied: true,
        }
    }

    pub fn unchanged(text: &str) -> Self {
        Self {
            enhanced_text: text.to_string(),
            improvement: None,
            applied: false,
        }
    }
}

/// Phases a pattern takes part in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseScope {
    All,
    Only(BTreeSet<Phase>),
}

impl PhaseScope {
    pub fn only(phases: impl IntoIterator<Item = Phase>) -> Self {
        Self::Only(phases.into_iter().collect())
    }

    /// Phase-scoped patterns only run when one of their phases is requested.
    pub fn admits(&self, phase: Option<Phase>) -> bool {
        match (self, phase) {
            (Self::All, _) => true,
            (Self::Only(phases), Some(p)) => phases.contains(&p),
            (Self::Only(_), None) => false,
        }
    }
}

/// Ordering constraints against other patterns, by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    pub run_after: Vec<String>,
    pub excludes_with: Vec<String>,
}

/// Immutable description of a pattern, fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMeta {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mode: PatternMode,
    pub intents: BTreeSet<Intent>,
    pub priority: u8,
    pub phases: PhaseScope,
    pub dependencies: Dependencies,
}

impl PatternMeta {
    /// Defaults: both modes, every scored intent, priority 5, all phases.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            mode: PatternMode::Both,
            intents: Intent::SCORED.into_iter().collect(),
            priority: 5,
            phases: PhaseScope::All,
            dependencies: Dependencies::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn mode(mut self, mode: PatternMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn intents(mut self, intents: impl IntoIterator<Item = Intent>) -> Self {
        self.intents = intents.into_iter().collect();
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn phases(mut self, phases: PhaseScope) -> Self {
        self.phases = phases;
        self
    }

    pub fn run_after(mut self, ids: &[&str]) -> Self {
        self.dependencies.run_after = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn excludes_with(mut self, ids: &[&str]) -> Self {
        self.dependencies.excludes_with = ids.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// What a pattern sees besides the text it rewrites.
#[derive(Debug, Clone, Copy)]
pub struct PatternContext<'a> {
    pub analysis: &'a IntentAnalysis,
    pub mode: Mode,
    pub phase: Option<Phase>,
    pub settings: Option<&'a serde_json::Value>,
}

impl<'a> PatternContext<'a> {
    pub fn intent(&self) -> Intent {
        self.analysis.primary_intent
    }

    /// A key from this pattern's `customSettings` entry, if configured.
    pub fn setting(&self, key: &str) -> Option<&'a serde_json::Value> {
        self.settings.and_then(|s| s.get(key))
    }
}

// ---------------------------------------------------------------------------
// Pattern interface
// ---------------------------------------------------------------------------

/// A named rewrite rule. Implementations must be pure functions of their
/// input text and context so repeated runs produce identical output.
pub trait Pattern: Send + Sync {
    fn meta(&self) -> &PatternMeta;

    fn apply(&self, text: &str, ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError>;

    fn id(&self) -> &str {
        &self.meta().id
    }
}

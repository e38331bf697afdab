//! Deterministic prompt classification, rewriting and quality scoring.

pub mod confidence;
pub mod config;
pub mod engine;
pub mod error;
pub mod intent;
pub mod mode;
pub mod pattern;
pub mod quality;
pub mod text;

pub use config::{OptimizerConfig, PatternConfig};
pub use engine::{AppliedImprovement, OptimizationResult, TransformationEngine};
pub use error::{CatalogError, ConfigError, ParseError, PatternError};
pub use intent::{Ambiguity, Characteristics, Intent, IntentAnalysis, IntentClassifier, SecondaryIntent};
pub use mode::{Mode, PatternMode, Phase};
pub use pattern::catalog::PatternCatalog;
pub use pattern::rules::{builtin_catalog, builtin_patterns};
pub use pattern::scheduler::PatternScheduler;
pub use pattern::{
    Dimension, Impact, Improvement, Pattern, PatternApplication, PatternContext, PatternMeta,
    PhaseScope,
};
pub use quality::{QualityMetrics, QualityScorer, Weights};

/// Classify, rewrite and score `text` with the built-in patterns.
pub fn optimize(text: &str, mode: Mode) -> OptimizationResult {
    TransformationEngine::default().optimize(text, mode, None, None)
}

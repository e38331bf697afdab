use std::time::Instant;

use log::{debug, trace, warn};
use serde::Serialize;

use crate::config::PatternConfig;
use crate::intent::{Intent, IntentAnalysis, IntentClassifier};
use crate::mode::{Mode, PatternMode, Phase};
use crate::pattern::catalog::PatternCatalog;
use crate::pattern::rules::builtin_catalog;
use crate::pattern::scheduler::PatternScheduler;
use crate::pattern::{Dimension, Impact, PatternContext};
use crate::quality::{QualityMetrics, QualityScorer};
use crate::text;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedImprovement {
    pub pattern_id: String,
    pub pattern_name: String,
    pub dimension: Dimension,
    pub description: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub original_text: String,
    pub enhanced_text: String,
    pub intent_analysis: IntentAnalysis,
    pub quality_metrics: QualityMetrics,
    pub applied_improvements: Vec<AppliedImprovement>,
    /// Ids of the patterns that changed the text, in application order.
    pub applied_patterns: Vec<String>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    pub elapsed_ms: u64,
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Hyperparameters {
    deep_overall_below: u8,
    short_text_word_count: usize,
    short_completeness_below: u8,
    band_excellent_min: u8,
    band_good_min: u8,
    band_fair_min: u8,
}

static HP: Hyperparameters = Hyperparameters {
    deep_overall_below: 65,
    short_text_word_count: 20,
    short_completeness_below: 60,
    band_excellent_min: 85,
    band_good_min: 70,
    band_fair_min: 55,
};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TransformationEngine {
    catalog: PatternCatalog,
    classifier: IntentClassifier,
    scorer: QualityScorer,
}

impl Default for TransformationEngine {
    fn default() -> Self {
        Self::new(builtin_catalog())
    }
}

impl TransformationEngine {
    pub fn new(catalog: PatternCatalog) -> Self {
        Self {
            catalog,
            classifier: IntentClassifier::new(),
            scorer: QualityScorer::new(),
        }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Classify `text`, then rewrite and score it.
    ///
    /// `config` applies to this call only; the engine's own catalog
    /// configuration is left untouched.
    pub fn optimize(
        &self,
        text: &str,
        mode: Mode,
        phase: Option<Phase>,
        config: Option<&PatternConfig>,
    ) -> OptimizationResult {
        let started = Instant::now();
        let analysis = self.classifier.classify(text);
        self.run(started, text, analysis, mode, phase, config)
    }

    /// Like [`optimize`](Self::optimize) with the intent already decided,
    /// e.g. for explicit commands such as PRD generation.
    pub fn optimize_with_intent(
        &self,
        text: &str,
        analysis: IntentAnalysis,
        mode: Mode,
        phase: Option<Phase>,
        config: Option<&PatternConfig>,
    ) -> OptimizationResult {
        self.run(Instant::now(), text, analysis, mode, phase, config)
    }

    /// Shorthand for an explicit intent with characteristics read from `text`.
    pub fn optimize_as(
        &self,
        text: &str,
        intent: Intent,
        mode: Mode,
        phase: Option<Phase>,
        config: Option<&PatternConfig>,
    ) -> OptimizationResult {
        let analysis = self.classifier.explicit(text, intent);
        self.optimize_with_intent(text, analysis, mode, phase, config)
    }

    fn run(
        &self,
        started: Instant,
        text: &str,
        analysis: IntentAnalysis,
        mode: Mode,
        phase: Option<Phase>,
        config: Option<&PatternConfig>,
    ) -> OptimizationResult {
        let snapshot;
        let catalog = match config {
            Some(config) => {
                snapshot = self.catalog.with_config(config);
                &snapshot
            }
            None => &self.catalog,
        };

        let patterns = PatternScheduler::new(catalog).schedule(&analysis, mode, phase);

        let mut current = text.to_string();
        let mut applied_improvements = Vec::new();
        let mut applied_patterns = Vec::new();
        for pattern in &patterns {
            let meta = pattern.meta();
            let ctx = PatternContext {
                analysis: &analysis,
                mode,
                phase,
                settings: catalog.settings_for(&meta.id),
            };
            match pattern.apply(&current, &ctx) {
                Ok(application) if application.applied => {
                    current = application.enhanced_text;
                    if let Some(improvement) = application.improvement {
                        applied_improvements.push(AppliedImprovement {
                            pattern_id: meta.id.clone(),
                            pattern_name: meta.name.clone(),
                            dimension: improvement.dimension,
                            description: improvement.description,
                            impact: improvement.impact,
                        });
                    }
                    applied_patterns.push(meta.id.clone());
                }
                Ok(_) => trace!("pattern '{}' left the text unchanged", meta.id),
                Err(e) => warn!("skipping pattern '{}': {e}", meta.id),
            }
        }

        let quality_metrics = self
            .scorer
            .assess(text, &current, analysis.primary_intent);
        debug!(
            "optimized {} prompt: {} pattern(s) applied, overall {} -> {}",
            analysis.primary_intent,
            applied_patterns.len(),
            quality_metrics.baseline_overall,
            quality_metrics.overall
        );

        OptimizationResult {
            original_text: text.to_string(),
            enhanced_text: current,
            intent_analysis: analysis,
            quality_metrics,
            applied_improvements,
            applied_patterns,
            mode,
            phase,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Whether a deeper pass is likely to pay off for this result.
    pub fn should_recommend_deep(result: &OptimizationResult) -> bool {
        let analysis = &result.intent_analysis;
        let metrics = &result.quality_metrics;
        let traits = &analysis.characteristics;
        analysis.primary_intent == Intent::Planning
            || metrics.overall < HP.deep_overall_below
            || (traits.is_open_ended && traits.needs_structure)
            || (text::word_count(&result.original_text) < HP.short_text_word_count
                && metrics.completeness < HP.short_completeness_below)
    }

    /// One line of guidance for the caller, keyed on the overall score.
    pub fn recommendation_message(result: &OptimizationResult) -> String {
        let overall = result.quality_metrics.overall;
        let ran_fast = result.mode.resolve(result.phase) == PatternMode::Fast;
        if ran_fast && Self::should_recommend_deep(result) {
            return format!(
                "Quality score {overall}/100. Re-run in deep mode for a more thorough rewrite."
            );
        }
        let guidance = if overall >= HP.band_excellent_min {
            "Excellent: the prompt is ready to use."
        } else if overall >= HP.band_good_min {
            "Good: minor refinements could still help."
        } else if overall >= HP.band_fair_min {
            "Fair: address the listed gaps before relying on this prompt."
        } else {
            "Needs work: add the missing context, requirements, and success criteria."
        };
        format!("Quality score {overall}/100. {guidance}")
    }
}

use std::sync::Arc;

use pretty_assertions::assert_eq;
use prompt_refinery::{
    optimize, Dimension, Impact, Improvement, Intent, Mode, OptimizationResult, OptimizerConfig,
    Pattern, PatternApplication, PatternCatalog, PatternConfig, PatternContext, PatternError,
    PatternMeta, Phase, TransformationEngine,
};

fn config(json: &str) -> PatternConfig {
    OptimizerConfig::from_json_str(json).unwrap().patterns
}

fn without_timing(mut result: OptimizationResult) -> OptimizationResult {
    result.elapsed_ms = 0;
    result
}

struct Failing {
    meta: PatternMeta,
}

impl Pattern for Failing {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, _text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        Err(PatternError::Failed {
            id: self.meta.id.clone(),
            reason: "boom".to_string(),
        })
    }
}

struct Appender {
    meta: PatternMeta,
}

impl Pattern for Appender {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        Ok(PatternApplication::applied(
            format!("{text} [checked]"),
            Improvement::new(Dimension::Clarity, "Marked as checked", Impact::Low),
        ))
    }
}

#[test]
fn fix_error_runs_debug_template() {
    let result = optimize("fix error in the login flow", Mode::Fast);
    assert_eq!(result.intent_analysis.primary_intent, Intent::Debugging);
    assert!(result.applied_patterns.contains(&"debug-report-template".to_string()));
    assert!(!result.applied_patterns.contains(&"requirements-section".to_string()));
    assert!(result.enhanced_text.contains("## Expected Behavior"));
    assert!(result.enhanced_text.contains("## Steps to Reproduce"));
}

#[test]
fn empty_text_yields_valid_result() {
    let result = optimize("", Mode::Fast);
    assert_eq!(result.original_text, "");
    assert_eq!(result.intent_analysis.confidence, 50);
    assert!(result.quality_metrics.overall <= 100);
}

#[test]
fn filler_is_removed_and_sections_added() {
    let result = optimize(
        "Please could you basically write a function that parses dates.",
        Mode::Fast,
    );
    let text = &result.enhanced_text;
    assert_eq!(result.intent_analysis.primary_intent, Intent::CodeGeneration);
    assert!(!text.contains("Please"), "{text}");
    assert!(!text.contains("basically"), "{text}");
    assert!(text.starts_with("## Objective\nWrite a function that parses dates."), "{text}");
    assert_eq!(result.applied_patterns[0], "objective-statement");
    assert!(result.applied_patterns.contains(&"filler-removal".to_string()));
    assert!(
        result.quality_metrics.overall > result.quality_metrics.baseline_overall,
        "overall {} vs baseline {}",
        result.quality_metrics.overall,
        result.quality_metrics.baseline_overall
    );
}

#[test]
fn objective_follows_leading_heading() {
    let result = optimize("# Login page\nBuild a login page in React.", Mode::Fast);
    let text = &result.enhanced_text;
    assert!(
        text.starts_with("# Login page\n\n## Objective\nBuild a login page in React."),
        "{text}"
    );
    assert!(!text.contains("## Objective\n# Login page"), "{text}");
}

#[test]
fn bullet_list_is_not_lifted_into_objective() {
    let list = "- add a login page\n- add a logout button";
    let result = optimize(list, Mode::Fast);
    assert!(result.enhanced_text.starts_with(list), "{}", result.enhanced_text);
    assert!(!result.applied_patterns.contains(&"objective-statement".to_string()));
}

#[test]
fn hyphenated_filler_words_are_kept() {
    let result = optimize("Make it just-in-time compiled.", Mode::Fast);
    let text = &result.enhanced_text;
    assert!(text.contains("Make it just-in-time compiled."), "{text}");
    assert!(!result.applied_patterns.contains(&"filler-removal".to_string()));
}

#[test]
fn nested_list_indentation_survives_filler_removal() {
    let result = optimize(
        "Make it just-in-time compiled.\n  - nested item\n    - deeper please",
        Mode::Fast,
    );
    let text = &result.enhanced_text;
    assert!(result.applied_patterns.contains(&"filler-removal".to_string()));
    assert!(
        text.starts_with("## Objective\nMake it just-in-time compiled.\n\n  - nested item\n    - deeper"),
        "{text}"
    );
    assert!(!text.contains("please"), "{text}");
}

#[test]
fn code_blocks_survive_rewriting() {
    let code = "```python\nx = 1  # just really basically\n```";
    let result = optimize(&format!("Please refactor this:\n\n{code}"), Mode::Deep);
    assert!(result.enhanced_text.contains(code), "{}", result.enhanced_text);
}

#[test]
fn deterministic_output() {
    let engine = TransformationEngine::default();
    let text = "Build a todo app with React, etc. It should sync stuff somehow.";
    let first = engine.optimize(text, Mode::Deep, None, None);
    let second = engine.optimize(text, Mode::Deep, None, None);
    assert_eq!(without_timing(first), without_timing(second));
}

#[test]
fn rewriting_is_idempotent() {
    let engine = TransformationEngine::default();
    let once = engine.optimize_as(
        "write a function that parses dates",
        Intent::CodeGeneration,
        Mode::Deep,
        None,
        None,
    );
    let twice = engine.optimize_as(
        &once.enhanced_text,
        Intent::CodeGeneration,
        Mode::Deep,
        None,
        None,
    );
    assert_eq!(twice.enhanced_text, once.enhanced_text);
    assert!(twice.applied_patterns.is_empty(), "{:?}", twice.applied_patterns);
}

#[test]
fn no_applicable_patterns_leaves_text_unchanged() {
    let engine = TransformationEngine::new(PatternCatalog::new());
    let result = engine.optimize("Write a date parser.", Mode::Fast, None, None);
    assert_eq!(result.enhanced_text, "Write a date parser.");
    assert!(result.applied_improvements.is_empty());
    assert!(result.applied_patterns.is_empty());
    assert_eq!(
        result.quality_metrics.overall,
        result.quality_metrics.baseline_overall
    );
}

#[test]
fn failing_pattern_is_skipped() {
    let mut catalog = PatternCatalog::new();
    catalog
        .register(Arc::new(Failing {
            meta: PatternMeta::new("failing", "Failing").priority(9),
        }))
        .unwrap();
    catalog
        .register(Arc::new(Appender {
            meta: PatternMeta::new("appender", "Appender").priority(5),
        }))
        .unwrap();
    let engine = TransformationEngine::new(catalog);

    let result = engine.optimize("Write a date parser.", Mode::Fast, None, None);
    assert_eq!(result.enhanced_text, "Write a date parser. [checked]");
    assert_eq!(result.applied_patterns, vec!["appender"]);
    assert_eq!(result.applied_improvements.len(), 1);
    assert_eq!(result.applied_improvements[0].pattern_name, "Appender");
}

#[test]
fn invalid_custom_setting_only_skips_that_pattern() {
    let engine = TransformationEngine::default();
    let bad = config(r#"{"patterns": {"customSettings": {"filler-removal": {"extraWords": 5}}}}"#);
    let result = engine.optimize("Please write a parser for dates.", Mode::Fast, None, Some(&bad));
    assert!(!result.applied_patterns.contains(&"filler-removal".to_string()));
    assert!(result.applied_patterns.contains(&"objective-statement".to_string()));
    assert!(result.enhanced_text.contains("Please"));
}

#[test]
fn custom_settings_reach_patterns() {
    let engine = TransformationEngine::default();
    let custom = config(
        r#"{"patterns": {"customSettings": {
            "filler-removal": {"extraWords": ["asap"]},
            "output-format": {"format": "YAML"},
            "success-criteria": {"criteria": ["Parses ISO 8601 dates"]}
        }}}"#,
    );
    let result = engine.optimize("Write a date parser asap.", Mode::Fast, None, Some(&custom));
    let text = &result.enhanced_text;
    assert!(!text.contains("asap"), "{text}");
    assert!(text.contains("- Respond in YAML."), "{text}");
    assert!(text.contains("- Parses ISO 8601 dates"), "{text}");
}

#[test]
fn per_call_config_disables_without_mutating_engine() {
    let engine = TransformationEngine::default();
    let disabled = config(r#"{"patterns": {"disabled": ["objective-statement"]}}"#);
    let text = "write a function that parses dates";

    let with = engine.optimize(text, Mode::Fast, None, Some(&disabled));
    assert!(!with.applied_patterns.contains(&"objective-statement".to_string()));

    let without = engine.optimize(text, Mode::Fast, None, None);
    assert!(without.applied_patterns.contains(&"objective-statement".to_string()));
    assert!(!engine.catalog().is_pattern_disabled("objective-statement"));
}

#[test]
fn prd_validation_phase_applies_checklist() {
    let engine = TransformationEngine::default();
    let result = engine.optimize_as(
        "A habit tracking app for students.",
        Intent::PrdGeneration,
        Mode::Prd,
        Some(Phase::Validation),
        None,
    );
    assert_eq!(result.applied_patterns, vec!["prd-validation-checklist"]);
    assert!(result.enhanced_text.contains("## Validation Checklist"));
    assert_eq!(result.phase, Some(Phase::Validation));
}

#[test]
fn prd_drafting_phase_scaffolds_sections() {
    let engine = TransformationEngine::default();
    let result = engine.optimize_as(
        "A habit tracking app for students.",
        Intent::PrdGeneration,
        Mode::Prd,
        Some(Phase::Drafting),
        None,
    );
    assert_eq!(result.applied_patterns, vec!["prd-section-scaffold"]);
    for heading in ["## Overview", "## Target Users", "## Non-Goals"] {
        assert!(result.enhanced_text.contains(heading), "missing {heading}");
    }
}

#[test]
fn clarification_phase_asks_questions() {
    let result = TransformationEngine::default().optimize(
        "Build a todo app",
        Mode::Conversational,
        Some(Phase::Clarification),
        None,
    );
    assert!(result.applied_patterns.contains(&"clarifying-questions".to_string()));
    let questions = result
        .enhanced_text
        .split("## Open Questions\n")
        .nth(1)
        .map(|rest| rest.lines().take_while(|l| l.starts_with("- ")).count())
        .unwrap_or_default();
    assert!((1..=3).contains(&questions), "{}", result.enhanced_text);
}

#[test]
fn planning_recommends_deep() {
    let result = optimize("plan the architecture and design a roadmap strategy", Mode::Fast);
    assert!(TransformationEngine::should_recommend_deep(&result));
    assert!(TransformationEngine::recommendation_message(&result).contains("deep mode"));
}

#[test]
fn result_serializes_expected_shape() {
    let result = optimize("fix error in the login flow", Mode::Fast);
    let json = serde_json::to_value(&result).unwrap();
    for key in [
        "original_text",
        "enhanced_text",
        "intent_analysis",
        "quality_metrics",
        "applied_improvements",
        "applied_patterns",
        "mode",
        "elapsed_ms",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert!(json.get("phase").is_none());
    assert_eq!(json["mode"], "fast");
    assert_eq!(json["intent_analysis"]["primary_intent"], "debugging");
    assert!(json["applied_improvements"][0]["dimension"].is_string());
}

fn settled_result(mode: Mode) -> OptimizationResult {
    let mut result = optimize("fix error in the login flow", mode);
    result.original_text = "The login flow throws an error after the session token expires, \
                            and users land on a blank page instead of the dashboard they asked for."
        .to_string();
    result.intent_analysis.characteristics.is_open_ended = false;
    result.quality_metrics.completeness = 100;
    result.quality_metrics.overall = 90;
    result
}

#[test]
fn recommendation_message_bands() {
    let mut result = settled_result(Mode::Deep);
    let cases = [
        (90, "Quality score 90/100. Excellent: the prompt is ready to use."),
        (85, "Quality score 85/100. Excellent: the prompt is ready to use."),
        (75, "Quality score 75/100. Good: minor refinements could still help."),
        (60, "Quality score 60/100. Fair: address the listed gaps before relying on this prompt."),
        (
            40,
            "Quality score 40/100. Needs work: add the missing context, requirements, and success criteria.",
        ),
    ];
    for (overall, expected) in cases {
        result.quality_metrics.overall = overall;
        assert_eq!(TransformationEngine::recommendation_message(&result), expected);
    }
}

#[test]
fn low_overall_recommends_deep() {
    let mut result = settled_result(Mode::Fast);
    assert!(!TransformationEngine::should_recommend_deep(&result));
    assert_eq!(
        TransformationEngine::recommendation_message(&result),
        "Quality score 90/100. Excellent: the prompt is ready to use."
    );

    result.quality_metrics.overall = 64;
    assert!(TransformationEngine::should_recommend_deep(&result));
    assert_eq!(
        TransformationEngine::recommendation_message(&result),
        "Quality score 64/100. Re-run in deep mode for a more thorough rewrite."
    );

    result.quality_metrics.overall = 65;
    assert!(!TransformationEngine::should_recommend_deep(&result));
}

#[test]
fn short_incomplete_prompt_recommends_deep() {
    let mut result = settled_result(Mode::Fast);
    result.original_text = "fix error in the login flow".to_string();
    assert!(!TransformationEngine::should_recommend_deep(&result));

    result.quality_metrics.completeness = 59;
    assert!(TransformationEngine::should_recommend_deep(&result));

    result.original_text.push_str(&" please".repeat(20));
    assert!(!TransformationEngine::should_recommend_deep(&result));
}

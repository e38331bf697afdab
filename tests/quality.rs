use prompt_refinery::quality::DimensionScores;
use prompt_refinery::{Dimension, Intent, QualityScorer, Weights};

fn dims(text: &str, intent: Intent) -> DimensionScores {
    QualityScorer::new().dimensions(text, intent)
}

#[test]
fn weight_sets_sum_to_one() {
    for intent in Intent::ALL {
        let sum = Weights::for_intent(intent).sum();
        assert!((sum - 1.0).abs() < 1e-9, "{intent} weights sum to {sum}");
    }
}

#[test]
fn missing_objective_and_success_caps_clarity() {
    let scores = dims("Write a parser for config files.", Intent::CodeGeneration);
    assert!(scores.clarity <= 70, "clarity was {}", scores.clarity);
}

#[test]
fn pleasantries_and_filler_cost_efficiency() {
    let clean = dims("Parse config files into typed structs.", Intent::CodeGeneration);
    let padded = dims(
        "Please could you just really help me with this thanks",
        Intent::CodeGeneration,
    );
    assert_eq!(clean.efficiency, 100);
    assert!(
        padded.efficiency < clean.efficiency,
        "padded {} vs clean {}",
        padded.efficiency,
        clean.efficiency
    );
}

#[test]
fn sectioned_prompt_scores_full_structure() {
    let text = "## Context\nWe have a service.\n\n## Requirements\n- Must parse JSON\n\n## Output\nReturn a table.";
    assert_eq!(dims(text, Intent::CodeGeneration).structure, 100);
}

#[test]
fn debugging_completeness_checklist() {
    let full = dims(
        "The app crashes. Expected a login page but it shows a blank screen instead.",
        Intent::Debugging,
    );
    assert_eq!(full.completeness, 100);

    let bare = dims("Help with the login page.", Intent::Debugging);
    assert_eq!(bare.completeness, 45);
}

#[test]
fn excess_questions_cost_actionability() {
    let scores = dims("What? Why? How? When? Where?", Intent::Learning);
    assert_eq!(scores.actionability, 70);
}

#[test]
fn empty_text_scores_are_bounded() {
    for intent in Intent::ALL {
        let metrics = QualityScorer::new().assess("", "", intent);
        for dimension in [
            Dimension::Clarity,
            Dimension::Efficiency,
            Dimension::Structure,
            Dimension::Completeness,
            Dimension::Actionability,
        ] {
            assert!(metrics.score(dimension) <= 100);
        }
        assert!(metrics.overall <= 100);
    }
}

#[test]
fn overall_is_weighted_sum_of_dimensions() {
    let text = "Build a REST endpoint in Rust that returns JSON. It should return 404 for unknown ids.";
    let intent = Intent::CodeGeneration;
    let metrics = QualityScorer::new().assess(text, text, intent);
    let expected = dims(text, intent).overall(&Weights::for_intent(intent));
    assert_eq!(metrics.overall, expected);
    assert_eq!(metrics.baseline_overall, expected);
}

#[test]
fn improvements_list_added_sections() {
    let metrics = QualityScorer::new().assess(
        "fix it",
        "fix it\n\n## Context\nThe service is live.",
        Intent::Debugging,
    );
    assert!(
        metrics.improvements.iter().any(|i| i == "Added a context section"),
        "improvements: {:?}",
        metrics.improvements
    );
    assert!(metrics
        .improvements
        .iter()
        .any(|i| i == "Introduced section headers"));
}

#[test]
fn weak_prompt_reports_gaps_not_strengths() {
    let metrics = QualityScorer::new().assess("do stuff", "do stuff", Intent::CodeGeneration);
    assert!(!metrics.gaps.is_empty());
    assert!(metrics.overall < 60, "overall was {}", metrics.overall);
}

#[test]
fn strong_prompt_reports_strengths() {
    let text = "## Objective\nI want to add a Rust function that returns the median of a slice.\n\n\
                ## Context\nOur service currently computes it in Python.\n\n\
                ## Requirements\n- Must handle empty and invalid input\n\n\
                ## Output Format\nA single code block, for example `fn median(xs: &[f64]) -> Option<f64>`.\n\n\
                ## Success Criteria\n- Unit tests pass";
    let metrics = QualityScorer::new().assess(text, text, Intent::CodeGeneration);
    assert!(!metrics.strengths.is_empty());
    assert!(metrics.overall >= 85, "overall was {}", metrics.overall);
}

#[test]
fn codegen_completeness_checklist() {
    let full = dims(
        "Write a date parser in Rust that takes a string and rejects empty input.",
        Intent::CodeGeneration,
    );
    assert_eq!(full.completeness, 100);

    let stack_only = dims("Write a date parser in Rust.", Intent::CodeGeneration);
    assert_eq!(stack_only.completeness, 65);

    let bare = dims("Write a date parser.", Intent::CodeGeneration);
    assert_eq!(bare.completeness, 45);
}

#[test]
fn planning_completeness_checklist() {
    let full = dims(
        "Plan the rollout because the old system is slow. The goal is zero downtime within two weeks.",
        Intent::Planning,
    );
    assert_eq!(full.completeness, 100);

    let problem_only = dims("Plan the rollout because it is slow.", Intent::Planning);
    assert_eq!(problem_only.completeness, 65);

    let bare = dims("Plan the rollout.", Intent::Planning);
    assert_eq!(bare.completeness, 45);
}

#[test]
fn hyphenated_filler_costs_nothing() {
    let compound = dims("Compile the parser module just-in-time.", Intent::CodeGeneration);
    assert_eq!(compound.efficiency, 100);
}

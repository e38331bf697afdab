use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::confidence;
use crate::intent::Intent;
use crate::pattern::Dimension;
use crate::text;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub clarity: u8,
    pub efficiency: u8,
    pub structure: u8,
    pub completeness: u8,
    pub actionability: u8,
    pub overall: u8,
    /// Overall score of the text before any rewriting.
    pub baseline_overall: u8,
    pub strengths: Vec<String>,
    /// Structural additions present in the final text but not the original.
    pub improvements: Vec<String>,
    /// Dimensions still scoring low in the final text.
    pub gaps: Vec<String>,
}

impl QualityMetrics {
    pub fn score(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Clarity => self.clarity,
            Dimension::Efficiency => self.efficiency,
            Dimension::Structure => self.structure,
            Dimension::Completeness => self.completeness,
            Dimension::Actionability => self.actionability,
        }
    }
}

/// Per-dimension weights; every set sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub clarity: f64,
    pub efficiency: f64,
    pub structure: f64,
    pub completeness: f64,
    pub actionability: f64,
}

impl Weights {
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::CodeGeneration => Self {
                clarity: 0.25,
                efficiency: 0.10,
                structure: 0.20,
                completeness: 0.25,
                actionability: 0.20,
            },
            Intent::Planning => Self {
                clarity: 0.20,
                efficiency: 0.10,
                structure: 0.25,
                completeness: 0.30,
                actionability: 0.15,
            },
            Intent::Debugging => Self {
                clarity: 0.25,
                efficiency: 0.10,
                structure: 0.15,
                completeness: 0.30,
                actionability: 0.20,
            },
            _ => Self {
                clarity: 0.25,
                efficiency: 0.15,
                structure: 0.20,
                completeness: 0.20,
                actionability: 0.20,
            },
        }
    }

    pub fn sum(&self) -> f64 {
        self.clarity + self.efficiency + self.structure + self.completeness + self.actionability
    }
}

/// The five raw dimension scores of one text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionScores {
    pub clarity: u8,
    pub efficiency: u8,
    pub structure: u8,
    pub completeness: u8,
    pub actionability: u8,
}

impl DimensionScores {
    pub fn overall(&self, weights: &Weights) -> u8 {
        confidence::clamp(
            self.clarity as f64 * weights.clarity
                + self.efficiency as f64 * weights.efficiency
                + self.structure as f64 * weights.structure
                + self.completeness as f64 * weights.completeness
                + self.actionability as f64 * weights.actionability,
        )
    }

    fn entries(&self) -> [(Dimension, u8); 5] {
        [
            (Dimension::Clarity, self.clarity),
            (Dimension::Efficiency, self.efficiency),
            (Dimension::Structure, self.structure),
            (Dimension::Completeness, self.completeness),
            (Dimension::Actionability, self.actionability),
        ]
    }
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Hyperparameters {
    no_objective_penalty: i32,
    no_tech_stack_penalty: i32,
    no_output_format_penalty: i32,
    no_success_clarity_penalty: i32,
    vague_term_penalty: i32,
    pleasantry_penalty: i32,
    filler_penalty: i32,
    signal_low_ratio: f64,
    signal_low_penalty: i32,
    signal_mid_ratio: f64,
    signal_mid_penalty: i32,
    no_context_penalty: i32,
    no_requirements_penalty: i32,
    no_output_section_penalty: i32,
    section_header_bonus: i32,
    ambiguous_term_penalty: i32,
    no_examples_penalty: i32,
    no_success_action_penalty: i32,
    free_question_marks: usize,
    excess_question_penalty: i32,
    strength_min: u8,
    gap_below: u8,
}

static HP: Hyperparameters = Hyperparameters {
    no_objective_penalty: -20,
    no_tech_stack_penalty: -15,
    no_output_format_penalty: -15,
    no_success_clarity_penalty: -10,
    vague_term_penalty: -5,
    pleasantry_penalty: -5,
    filler_penalty: -3,
    signal_low_ratio: 0.6,
    signal_low_penalty: -30,
    signal_mid_ratio: 0.75,
    signal_mid_penalty: -15,
    no_context_penalty: -20,
    no_requirements_penalty: -25,
    no_output_section_penalty: -15,
    section_header_bonus: 10,
    ambiguous_term_penalty: -10,
    no_examples_penalty: -15,
    no_success_action_penalty: -20,
    free_question_marks: 3,
    excess_question_penalty: -5,
    strength_min: 85,
    gap_below: 60,
};

const BASELINE: i32 = 100;

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

pub(crate) static OBJECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?im)^\s*(?:#+\s*(?:objective|goal|task|purpose)\b|(?:objective|goal|task|purpose)\s*:)",
        r"|\b(?:i (?:want|need) to|the goal is|so that|in order to)\b",
    ))
    .unwrap()
});

pub(crate) static SUCCESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:success criteria|acceptance criteria|done when|definition of done",
        r"|expected (?:output|result|behaviou?r)|should (?:pass|return|produce|output)",
        r"|must (?:pass|return|produce))\b",
    ))
    .unwrap()
});

pub(crate) static TECH_STACK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:rust|python|javascript|typescript|java|golang|ruby|php|swift|kotlin|scala",
        r"|react|vue|angular|svelte|node(?:\.js)?|django|flask|fastapi|express|spring|rails",
        r"|postgres(?:ql)?|mysql|sqlite|mongodb|redis|tech stack)\b|\bc\+\+|\bc#",
    ))
    .unwrap()
});

pub(crate) static OUTPUT_FORMAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:output|format|respond (?:with|in)|return (?:a|an|the)",
        r"|json|markdown|yaml|csv|table)\b",
    ))
    .unwrap()
});

pub(crate) static VAGUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:stuff|things?|something|somehow|etc|whatever|various|some kind of)\b")
        .unwrap()
});

pub(crate) static PLEASANTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:please|thank you|thanks|kindly|i was wondering if|i was wondering",
        r"|could you|would you mind|if you don't mind|i hope)\b",
    ))
    .unwrap()
});

pub(crate) static FILLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:basically|actually|really|just|very|literally|simply|quite|totally|sort of)\b",
    )
    .unwrap()
});

static AMBIGUOUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:maybe|perhaps|possibly|might|could be|probably|i guess|or something|kind of)\b",
    )
    .unwrap()
});

pub(crate) static CONTEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?im)^\s*#*\s*(?:context|background)\b",
        r"|\b(?:currently|existing|we have|i have|our (?:app|system|codebase|project|team|service))\b",
    ))
    .unwrap()
});

static REQUIREMENTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?im)^\s*#*\s*(?:requirements?|constraints?)\b",
        r"|\b(?:must|should|needs? to|required)\b|^\s*(?:[-*]|\d+\.)\s",
    ))
    .unwrap()
});

static SECTION_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*#{1,6}\s+\S|^\s*[A-Z][A-Za-z ]{2,30}:\s*$").unwrap());

pub(crate) static EXAMPLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\be\.g\.|\b(?:for example|for instance|examples?|such as|sample)\b|```|->")
        .unwrap()
});

static INPUT_OUTPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:inputs?|outputs?|returns?|accepts?|takes|parameters?|arguments?)\b")
        .unwrap()
});

pub(crate) static EDGE_CASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:edge cases?|corner cases?|error handling|invalid|empty|null|boundary)\b")
        .unwrap()
});

pub(crate) static PROBLEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:problem|challenge|pain points?|because)\b").unwrap()
});

pub(crate) static CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:constraints?|budget|deadline|limits?|must not|within|timeline)\b").unwrap()
});

pub(crate) static ERROR_MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:errors?|exceptions?|stack trace|crash\w*|fail\w*|panic\w*)\b").unwrap()
});

pub(crate) static EXPECTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:expected|expect|should)\b").unwrap());

pub(crate) static ACTUAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:actual|actually|instead|but (?:it )?(?:gets|returns|shows|throws))\b")
        .unwrap()
});

/// Headed sections whose appearance counts as a structural improvement.
static IMPROVEMENT_MARKERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("objective|goal", "Stated an explicit objective"),
        ("context|background", "Added a context section"),
        ("requirements?|tasks", "Organized requirements into a list"),
        ("output format", "Specified the expected output format"),
        ("success criteria", "Defined success criteria"),
        ("edge cases", "Listed edge cases to handle"),
        ("examples", "Requested concrete examples"),
        ("tech stack", "Called out the tech stack"),
        ("expected behavior|actual behavior", "Separated expected and actual behavior"),
        ("constraints", "Captured constraints"),
    ]
    .into_iter()
    .map(|(names, label)| {
        let re = Regex::new(&format!(r"(?im)^\s*#{{1,6}}\s*(?:{names})\b")).unwrap();
        (re, label)
    })
    .collect()
});

// ---------------------------------------------------------------------------
// Dimension scorers
// ---------------------------------------------------------------------------

fn penalty_if(missing: bool, penalty: i32) -> i32 {
    if missing {
        penalty
    } else {
        0
    }
}

fn per_match(re: &Regex, text: &str, penalty: i32) -> i32 {
    re.find_iter(text).count() as i32 * penalty
}

fn per_word(re: &Regex, text: &str, penalty: i32) -> i32 {
    text::standalone_matches(re, text).count() as i32 * penalty
}

fn clamp_score(value: i32) -> u8 {
    confidence::clamp(value as f64)
}

fn score_clarity(text: &str, intent: Intent) -> u8 {
    let mut score = BASELINE;
    score += penalty_if(!OBJECTIVE_RE.is_match(text), HP.no_objective_penalty);
    if intent == Intent::CodeGeneration {
        score += penalty_if(!TECH_STACK_RE.is_match(text), HP.no_tech_stack_penalty);
        score += penalty_if(!OUTPUT_FORMAT_RE.is_match(text), HP.no_output_format_penalty);
    }
    score += penalty_if(!SUCCESS_RE.is_match(text), HP.no_success_clarity_penalty);
    score += per_match(&VAGUE_RE, text, HP.vague_term_penalty);
    clamp_score(score)
}

fn score_efficiency(text: &str) -> u8 {
    let mut score = BASELINE;
    score += per_word(&PLEASANTRY_RE, text, HP.pleasantry_penalty);
    score += per_word(&FILLER_RE, text, HP.filler_penalty);

    let tokens = text::tokens(&text::strip_code_blocks(text));
    if !tokens.is_empty() {
        let signal = tokens
            .iter()
            .filter(|t| !text::STOPWORDS.contains(t.as_str()))
            .count();
        let ratio = signal as f64 / tokens.len() as f64;
        if ratio < HP.signal_low_ratio {
            score += HP.signal_low_penalty;
        } else if ratio < HP.signal_mid_ratio {
            score += HP.signal_mid_penalty;
        }
    }
    clamp_score(score)
}

fn score_structure(text: &str, intent: Intent) -> u8 {
    let mut score = BASELINE;
    if intent != Intent::Refinement {
        score += penalty_if(!CONTEXT_RE.is_match(text), HP.no_context_penalty);
    }
    score += penalty_if(!REQUIREMENTS_RE.is_match(text), HP.no_requirements_penalty);
    score += penalty_if(!OUTPUT_FORMAT_RE.is_match(text), HP.no_output_section_penalty);
    if SECTION_HEADER_RE.is_match(text) {
        score += HP.section_header_bonus;
    }
    clamp_score(score)
}

/// Intent-specific checklist: (marker, penalty when absent).
fn completeness_checklist(intent: Intent) -> Vec<(&'static Regex, i32)> {
    match intent {
        Intent::CodeGeneration => vec![
            (&*TECH_STACK_RE, -20),
            (&*INPUT_OUTPUT_RE, -20),
            (&*EDGE_CASE_RE, -15),
        ],
        Intent::Planning => vec![
            (&*PROBLEM_RE, -20),
            (&*OBJECTIVE_RE, -20),
            (&*CONSTRAINT_RE, -15),
        ],
        Intent::Debugging => vec![
            (&*ERROR_MENTION_RE, -25),
            (&*EXPECTED_RE, -15),
            (&*ACTUAL_RE, -15),
        ],
        Intent::Testing => vec![(&*EDGE_CASE_RE, -20), (&*SUCCESS_RE, -15)],
        Intent::Migration => vec![(&*TECH_STACK_RE, -20), (&*CONSTRAINT_RE, -15)],
        _ => vec![(&*OBJECTIVE_RE, -20), (&*OUTPUT_FORMAT_RE, -15)],
    }
}

fn score_completeness(text: &str, intent: Intent) -> u8 {
    let score = completeness_checklist(intent)
        .into_iter()
        .fold(BASELINE, |acc, (re, penalty)| {
            acc + penalty_if(!re.is_match(text), penalty)
        });
    clamp_score(score)
}

fn score_actionability(text: &str, intent: Intent) -> u8 {
    let mut score = BASELINE;
    score += per_match(&AMBIGUOUS_RE, text, HP.ambiguous_term_penalty);
    if intent == Intent::CodeGeneration {
        score += penalty_if(!EXAMPLE_RE.is_match(text), HP.no_examples_penalty);
    }
    score += penalty_if(!SUCCESS_RE.is_match(text), HP.no_success_action_penalty);
    let questions = text.matches('?').count();
    if questions > HP.free_question_marks {
        score += (questions - HP.free_question_marks) as i32 * HP.excess_question_penalty;
    }
    clamp_score(score)
}

fn strength_label(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Clarity => "Clear objective with little vague language",
        Dimension::Efficiency => "Concise wording with a high signal-to-noise ratio",
        Dimension::Structure => "Well organized into context, requirements, and output",
        Dimension::Completeness => "Covers the details this kind of request needs",
        Dimension::Actionability => "Concrete enough to act on without follow-up questions",
    }
}

fn gap_label(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Clarity => "State the objective and replace vague terms with specifics",
        Dimension::Efficiency => "Cut pleasantries and filler words",
        Dimension::Structure => "Separate context, requirements, and expected output",
        Dimension::Completeness => "Add the missing details for this type of request",
        Dimension::Actionability => "Define success criteria and resolve hedged wording",
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScorer;

impl QualityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn dimensions(&self, text: &str, intent: Intent) -> DimensionScores {
        DimensionScores {
            clarity: score_clarity(text, intent),
            efficiency: score_efficiency(text),
            structure: score_structure(text, intent),
            completeness: score_completeness(text, intent),
            actionability: score_actionability(text, intent),
        }
    }

    /// Score `enhanced` and describe what changed relative to `original`.
    pub fn assess(&self, original: &str, enhanced: &str, intent: Intent) -> QualityMetrics {
        let weights = Weights::for_intent(intent);
        let scores = self.dimensions(enhanced, intent);
        let baseline = self.dimensions(original, intent);

        let strengths = scores
            .entries()
            .into_iter()
            .filter(|(_, s)| *s >= HP.strength_min)
            .map(|(d, _)| strength_label(d).to_string())
            .collect();
        let gaps = scores
            .entries()
            .into_iter()
            .filter(|(_, s)| *s < HP.gap_below)
            .map(|(d, _)| gap_label(d).to_string())
            .collect();
        let mut improvements: Vec<String> = IMPROVEMENT_MARKERS
            .iter()
            .filter(|(re, _)| re.is_match(enhanced) && !re.is_match(original))
            .map(|(_, label)| label.to_string())
            .collect();
        if SECTION_HEADER_RE.is_match(enhanced) && !SECTION_HEADER_RE.is_match(original) {
            improvements.push("Introduced section headers".to_string());
        }

        QualityMetrics {
            clarity: scores.clarity,
            efficiency: scores.efficiency,
            structure: scores.structure,
            completeness: scores.completeness,
            actionability: scores.actionability,
            overall: scores.overall(&weights),
            baseline_overall: baseline.overall(&weights),
            strengths,
            improvements,
            gaps,
        }
    }
}

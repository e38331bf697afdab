use std::fmt;
use std::str::FromStr;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::confidence::{self, PenaltyOptions, RatioOptions};
use crate::error::ParseError;
use crate::mode::Mode;
use crate::text;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    CodeGeneration,
    Planning,
    Refinement,
    Debugging,
    Documentation,
    Testing,
    Migration,
    SecurityReview,
    Learning,
    /// Only reachable through an explicit command, never inferred.
    PrdGeneration,
    /// Only reachable through an explicit command, never inferred.
    TaskBreakdown,
}

impl Intent {
    /// Intents the classifier can infer from text, in lexicon order.
    pub const SCORED: [Intent; 9] = [
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::Refinement,
        Intent::Debugging,
        Intent::Documentation,
        Intent::Testing,
        Intent::Migration,
        Intent::SecurityReview,
        Intent::Learning,
    ];

    pub const ALL: [Intent; 11] = [
        Intent::CodeGeneration,
        Intent::Planning,
        Intent::Refinement,
        Intent::Debugging,
        Intent::Documentation,
        Intent::Testing,
        Intent::Migration,
        Intent::SecurityReview,
        Intent::Learning,
        Intent::PrdGeneration,
        Intent::TaskBreakdown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CodeGeneration => "code-generation",
            Self::Planning => "planning",
            Self::Refinement => "refinement",
            Self::Debugging => "debugging",
            Self::Documentation => "documentation",
            Self::Testing => "testing",
            Self::Migration => "migration",
            Self::SecurityReview => "security-review",
            Self::Learning => "learning",
            Self::PrdGeneration => "prd-generation",
            Self::TaskBreakdown => "task-breakdown",
        }
    }

    pub fn is_explicit_only(&self) -> bool {
        matches!(self, Self::PrdGeneration | Self::TaskBreakdown)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Intent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Intent::ALL
            .into_iter()
            .find(|intent| intent.name() == wanted)
            .ok_or_else(|| ParseError::new("intent", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub has_code_context: bool,
    pub has_technical_terms: bool,
    pub is_open_ended: bool,
    pub needs_structure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ambiguity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryIntent {
    pub intent: Intent,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub primary_intent: Intent,
    pub confidence: u8,
    pub characteristics: Characteristics,
    pub suggested_mode: Mode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_intents: Vec<SecondaryIntent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambiguity: Option<Ambiguity>,
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Hyperparameters {
    strong_weight: f64,
    medium_weight: f64,
    weak_weight: f64,
    negation_window_chars: usize,
    negation_discount: f64,
    code_context_bonus: f64,
    question_bonus: f64,
    domain_term_bonus: f64,
    override_min_score: f64,
    fallback_confidence: u8,
    deep_confidence_below: u8,
    short_text_word_count: usize,
    long_text_word_count: usize,
    secondary_min_score: f64,
    secondary_limit: usize,
    ambiguity_high_ratio: f64,
    ambiguity_medium_ratio: f64,
}

static HP: Hyperparameters = Hyperparameters {
    strong_weight: 20.0,
    medium_weight: 10.0,
    weak_weight: 5.0,
    negation_window_chars: 20,
    negation_discount: 0.5,
    code_context_bonus: 15.0,
    question_bonus: 10.0,
    domain_term_bonus: 15.0,
    override_min_score: 20.0,
    fallback_confidence: 50,
    deep_confidence_below: 60,
    short_text_word_count: 15,
    long_text_word_count: 50,
    secondary_min_score: 10.0,
    secondary_limit: 2,
    ambiguity_high_ratio: 0.8,
    ambiguity_medium_ratio: 0.5,
};

const FALLBACK_INTENT: Intent = Intent::CodeGeneration;

// ---------------------------------------------------------------------------
// Lexicons
// ---------------------------------------------------------------------------

struct Lexicon {
    intent: Intent,
    strong: Vec<Regex>,
    medium: Vec<Regex>,
    weak: Vec<Regex>,
}

fn term_regexes(terms: &[&str]) -> Vec<Regex> {
    terms
        .iter()
        .map(|t| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(t))).unwrap())
        .collect()
}

fn lexicon(intent: Intent, strong: &[&str], medium: &[&str], weak: &[&str]) -> Lexicon {
    Lexicon {
        intent,
        strong: term_regexes(strong),
        medium: term_regexes(medium),
        weak: term_regexes(weak),
    }
}

static LEXICONS: Lazy<Vec<Lexicon>> = Lazy::new(|| {
    vec![
        lexicon(
            Intent::CodeGeneration,
            &[
                "write a function",
                "create a function",
                "implement a",
                "build an api",
                "create a component",
                "generate code",
                "write code",
                "build a",
            ],
            &[
                "create",
                "build",
                "implement",
                "generate",
                "function",
                "component",
                "endpoint",
                "class",
                "script",
                "app",
                "application",
            ],
            &["code", "feature", "add", "make", "new"],
        ),
        lexicon(
            Intent::Planning,
            &[
                "how should i",
                "how should we",
                "what is the best way",
                "plan for",
                "design a system",
                "architecture for",
                "roadmap for",
                "break down",
            ],
            &[
                "plan",
                "planning",
                "design",
                "architecture",
                "strategy",
                "roadmap",
                "approach",
                "organize",
                "scope",
                "milestones",
            ],
            &["should", "consider", "options", "idea", "ideas", "best", "future"],
        ),
        lexicon(
            Intent::Refinement,
            &[
                "refactor this",
                "clean up",
                "improve the",
                "make it faster",
                "optimize the",
                "simplify this",
            ],
            &[
                "refactor",
                "improve",
                "optimize",
                "simplify",
                "cleanup",
                "rewrite",
                "performance",
                "readability",
            ],
            &["better", "faster", "cleaner", "review", "tweak"],
        ),
        lexicon(
            Intent::Debugging,
            &[
                "fix error",
                "fix the error",
                "fix bug",
                "fix the bug",
                "not working",
                "doesn't work",
                "stack trace",
                "throws an error",
                "keeps crashing",
            ],
            &[
                "error", "bug", "crash", "exception", "failing", "broken", "debug", "issue", "fails",
            ],
            &["fix", "wrong", "problem", "unexpected", "undefined", "null"],
        ),
        lexicon(
            Intent::Documentation,
            &[
                "write documentation",
                "document this",
                "add comments",
                "write a readme",
                "api docs",
                "explain how to use",
            ],
            &[
                "document",
                "documentation",
                "readme",
                "docs",
                "docstring",
                "comments",
                "guide",
            ],
            &["describe", "usage", "reference", "overview"],
        ),
        lexicon(
            Intent::Testing,
            &[
                "write tests",
                "add tests",
                "unit tests",
                "integration tests",
                "test coverage",
                "test cases",
            ],
            &["test", "tests", "testing", "coverage", "mock", "assert", "spec", "e2e"],
            &["verify", "validate", "check", "ensure"],
        ),
        lexicon(
            Intent::Migration,
            &[
                "migrate from",
                "migrate to",
                "upgrade to",
                "port to",
                "convert from",
                "move from",
            ],
            &[
                "migrate",
                "migration",
                "upgrade",
                "port",
                "legacy",
                "deprecated",
                "convert",
            ],
            &["version", "update", "replace", "switch"],
        ),
        lexicon(
            Intent::SecurityReview,
            &[
                "security review",
                "security audit",
                "check for vulnerabilities",
                "sql injection",
                "penetration test",
                "threat model",
            ],
            &[
                "security",
                "vulnerability",
                "vulnerabilities",
                "exploit",
                "xss",
                "csrf",
                "injection",
                "authentication",
                "authorization",
                "secure",
            ],
            &["auth", "permission", "permissions", "token", "secret", "encrypt"],
        ),
        lexicon(
            Intent::Learning,
            &[
                "explain how",
                "help me understand",
                "what is the difference",
                "teach me",
                "how does",
                "i want to learn",
            ],
            &[
                "explain",
                "learn",
                "understand",
                "teach",
                "concept",
                "tutorial",
                "difference",
            ],
            &["what", "why", "how", "example", "basics"],
        ),
    ]
});

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static NEGATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(not|no|without|never|don't|doesn't|didn't|isn't|avoid|except)\b").unwrap()
});

// Code-shaped syntax only: a statement-ending semicolon, a call whose arguments
// are empty, an identifier or contain symbols, or a declaration keyword in use.
static CODE_SYNTAX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)[{}]|=>|->|[\w)\]]\s*;[ \t]*$",
        r"|\b[A-Za-z_]\w*\((?:\)|[A-Za-z_]\w+\)|[^)\n]*[^\sA-Za-z)][^)\n]*\))",
        r"|\b(?:let|const|var)\s+(?:mut\s+)?\w+\s*[=:]",
        r"|\b(?:def|fn|function)\s+\w+\s*[(<]",
        r"|\b(?:public|private)\s+(?:static\s+)?\w+\s+\w+\s*\(",
        r"|^\s*import\s+[\w.{*]+.*(?:\sfrom\s|;)",
        r"|</?[a-zA-Z]+>",
    ))
    .unwrap()
});

static TECH_TERMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(api|database|sql|http|json|rest|graphql|react|vue|angular|node|python|rust",
        r"|java|typescript|javascript|docker|kubernetes|server|backend|frontend|algorithm",
        r"|cache|queue|schema|endpoint|regex|cli)\b",
    ))
    .unwrap()
});

static OPEN_ENDED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(how (should|could|can|would) (i|we)|what('s| is| are) the best",
        r"|any (ideas|suggestions)|brainstorm|explore|options for|ways to|approaches)\b",
    ))
    .unwrap()
});

static NEEDS_STRUCTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(steps?|phases?|requirements|multiple|several|workflow|system|architecture|end-to-end)\b",
    )
    .unwrap()
});

static SECURITY_TERMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(owasp|cve|xss|csrf|jwt|oauth|sanitiz\w*|encrypt\w*|rce|ssrf)\b").unwrap()
});

static MIGRATION_TERMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(legacy|deprecated|v\d+(\.\d+)*|backward compat\w*|breaking changes?)\b")
        .unwrap()
});

static TESTING_TERMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(jest|pytest|mocha|vitest|junit|cargo test|tdd|fixtures?|snapshot)\b").unwrap()
});

// ---------------------------------------------------------------------------
// Override rules
// ---------------------------------------------------------------------------

/// Fires when `intent` scored at least the override minimum and `trigger`
/// appears in the text. Evaluated in declaration order.
struct OverrideRule {
    intent: Intent,
    trigger: Regex,
}

fn override_rule(intent: Intent, trigger: &str) -> OverrideRule {
    OverrideRule {
        intent,
        trigger: Regex::new(&format!(r"(?i)\b({trigger})\b")).unwrap(),
    }
}

static OVERRIDE_RULES: Lazy<Vec<OverrideRule>> = Lazy::new(|| {
    vec![
        override_rule(
            Intent::Debugging,
            r"errors?|bugs?|crash\w*|broken|exceptions?|fail\w*|fix",
        ),
        override_rule(
            Intent::SecurityReview,
            r"security|vulnerab\w*|exploit\w*|injection|xss|csrf|audit",
        ),
        override_rule(Intent::Testing, r"tests?|testing|coverage|mocks?|tdd"),
        override_rule(Intent::Migration, r"migrat\w*|upgrad\w*|porting|port|legacy"),
        override_rule(
            Intent::Documentation,
            r"document\w*|readme|docs|docstrings?|comments",
        ),
        override_rule(Intent::Learning, r"explain|learn\w*|understand|teach"),
        override_rule(Intent::Planning, r"plan\w*|design|architect\w*|strategy|roadmap"),
        override_rule(
            Intent::Refinement,
            r"refactor\w*|improve|optimi[sz]e|simplify|clean ?up",
        ),
    ]
});

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// A negation word counts when it starts within the window of characters before the match.
fn negated(text: &str, match_start: usize) -> bool {
    NEGATION_RE
        .find_iter(text)
        .take_while(|n| n.start() < match_start)
        .any(|n| text[n.start()..match_start].chars().count() <= HP.negation_window_chars)
}

fn tier_score(text: &str, patterns: &[Regex], weight: f64) -> f64 {
    patterns
        .iter()
        .flat_map(|re| re.find_iter(text))
        .map(|m| {
            if negated(text, m.start()) {
                weight * HP.negation_discount
            } else {
                weight
            }
        })
        .sum()
}

fn context_bonus(intent: Intent, text: &str, traits: &Characteristics) -> f64 {
    let mut bonus = 0.0;
    match intent {
        Intent::Debugging | Intent::Refinement | Intent::Testing if traits.has_code_context => {
            bonus += HP.code_context_bonus;
        }
        Intent::Planning | Intent::Documentation | Intent::Learning if text.contains('?') => {
            bonus += HP.question_bonus;
        }
        _ => {}
    }
    let domain_terms = match intent {
        Intent::SecurityReview => Some(&*SECURITY_TERMS_RE),
        Intent::Migration => Some(&*MIGRATION_TERMS_RE),
        Intent::Testing => Some(&*TESTING_TERMS_RE),
        _ => None,
    };
    if domain_terms.is_some_and(|re| re.is_match(text)) {
        bonus += HP.domain_term_bonus;
    }
    bonus
}

fn suggest_mode(
    intent: Intent,
    confidence: u8,
    traits: &Characteristics,
    words: usize,
) -> Mode {
    let short = words < HP.short_text_word_count;
    if confidence < HP.deep_confidence_below
        || intent == Intent::Planning
        || (traits.is_open_ended && !traits.has_code_context)
        || (short && traits.needs_structure)
    {
        Mode::Deep
    } else {
        Mode::Fast
    }
}

/// Highest score first; equal scores fall back to intent name order.
fn rank(a: &(Intent, f64), b: &(Intent, f64)) -> std::cmp::Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.name().cmp(b.0.name()))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Fixed keyword checks on the raw text, independent of scoring.
    pub fn characteristics(&self, text: &str) -> Characteristics {
        Characteristics {
            has_code_context: text::has_code_block(text) || CODE_SYNTAX_RE.is_match(text),
            has_technical_terms: TECH_TERMS_RE.is_match(text),
            is_open_ended: OPEN_ENDED_RE.is_match(text),
            needs_structure: text::word_count(text) > HP.long_text_word_count
                || NEEDS_STRUCTURE_RE.is_match(text),
        }
    }

    /// Analysis for an intent chosen by the caller rather than inferred.
    pub fn explicit(&self, text: &str, intent: Intent) -> IntentAnalysis {
        let traits = self.characteristics(text);
        let confidence = confidence::CONFIDENCE_MAX;
        IntentAnalysis {
            primary_intent: intent,
            confidence,
            characteristics: traits,
            suggested_mode: suggest_mode(intent, confidence, &traits, text::word_count(text)),
            secondary_intents: Vec::new(),
            ambiguity: None,
        }
    }

    /// Raw score for every inferable intent, in lexicon order.
    pub fn scores(&self, text: &str) -> Vec<(Intent, f64)> {
        let traits = self.characteristics(text);
        self.scores_with(text, &traits)
    }

    fn scores_with(&self, text: &str, traits: &Characteristics) -> Vec<(Intent, f64)> {
        LEXICONS
            .iter()
            .map(|lex| {
                let score = tier_score(text, &lex.strong, HP.strong_weight)
                    + tier_score(text, &lex.medium, HP.medium_weight)
                    + tier_score(text, &lex.weak, HP.weak_weight)
                    + context_bonus(lex.intent, text, traits);
                (lex.intent, score)
            })
            .collect()
    }

    pub fn classify(&self, text: &str) -> IntentAnalysis {
        let traits = self.characteristics(text);
        let scores = self.scores_with(text, &traits);
        let score_of = |intent: Intent| {
            scores
                .iter()
                .find(|(i, _)| *i == intent)
                .map_or(0.0, |(_, s)| *s)
        };
        let total: f64 = scores.iter().map(|(_, s)| s).sum();
        let top = scores.iter().map(|(_, s)| *s).fold(0.0, f64::max);

        let primary = if top <= 0.0 {
            FALLBACK_INTENT
        } else {
            OVERRIDE_RULES
                .iter()
                .find(|rule| {
                    score_of(rule.intent) >= HP.override_min_score && rule.trigger.is_match(text)
                })
                .map(|rule| rule.intent)
                .or_else(|| scores.iter().min_by(|a, b| rank(a, b)).map(|(i, _)| *i))
                .unwrap_or(FALLBACK_INTENT)
        };
        let primary_score = score_of(primary);

        let mut others: Vec<(Intent, f64)> = scores
            .iter()
            .copied()
            .filter(|(i, _)| *i != primary)
            .collect();
        others.sort_by(rank);
        let runner_up = others.first().map_or(0.0, |(_, s)| *s);

        let ratio = confidence::ratio_confidence(
            primary_score,
            total,
            RatioOptions {
                fallback: HP.fallback_confidence,
                ..RatioOptions::default()
            },
        );
        let confidence = confidence::competition_penalty(
            ratio,
            primary_score,
            runner_up,
            PenaltyOptions::default(),
        );

        let secondary_intents = others
            .iter()
            .filter(|(_, s)| *s > HP.secondary_min_score)
            .take(HP.secondary_limit)
            .map(|(intent, s)| SecondaryIntent {
                intent: *intent,
                confidence: confidence::clamp(s / total * 100.0),
            })
            .collect();

        let ambiguity = if top <= 0.0 || primary_score <= 0.0 {
            Ambiguity::High
        } else {
            let closeness = runner_up / primary_score;
            if closeness > HP.ambiguity_high_ratio {
                Ambiguity::High
            } else if closeness > HP.ambiguity_medium_ratio {
                Ambiguity::Medium
            } else {
                Ambiguity::Low
            }
        };

        debug!(
            "classified as {primary} (score {primary_score}, total {total}, confidence {confidence})"
        );

        IntentAnalysis {
            primary_intent: primary,
            confidence,
            characteristics: traits,
            suggested_mode: suggest_mode(primary, confidence, &traits, text::word_count(text)),
            secondary_intents,
            ambiguity: Some(ambiguity),
        }
    }
}

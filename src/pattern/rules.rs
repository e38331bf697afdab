use std::sync::Arc;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use super::catalog::PatternCatalog;
use super::{
    Dimension, Impact, Improvement, Pattern, PatternApplication, PatternContext, PatternMeta,
    PhaseScope,
};
use crate::error::PatternError;
use crate::intent::Intent;
use crate::mode::{PatternMode, Phase};
use crate::quality::{
    ACTUAL_RE, CONSTRAINT_RE, CONTEXT_RE, EDGE_CASE_RE, EXAMPLE_RE, EXPECTED_RE, FILLER_RE,
    OBJECTIVE_RE, OUTPUT_FORMAT_RE, PLEASANTRY_RE, PROBLEM_RE, SUCCESS_RE, TECH_STACK_RE,
};
use crate::text;

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static FIRST_SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?](?:\s|$)").unwrap());

static BULLET_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*[-*]\s|\s*\d+[.)]\s)").unwrap());

static NUMBERED_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+[.)]\s").unwrap());

static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:must|should|needs? to|has to|have to|make sure|ensure|required?)\b").unwrap()
});

static LEADING_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)[,;:][ \t]*").unwrap());

static REPEATED_COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",(?:[ \t]*,)+").unwrap());

static CODE_FENCE_LANG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^```([A-Za-z0-9_+#-]+)").unwrap());

static THREAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:owasp|threat model|attack surface|injection|xss|csrf|authori[sz]ation)\b")
        .unwrap()
});

static REPRO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:steps? to reproduce|repro(?:duce|duction)?)\b").unwrap());

static STACK_TRACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:stack ?trace|traceback|error message)\b|```").unwrap());

static REQUIREMENTS_HEADING_RE: Lazy<Regex> = Lazy::new(|| heading_re("requirements?"));
static OUTPUT_HEADING_RE: Lazy<Regex> = Lazy::new(|| heading_re("output(?: format)?"));
static VALIDATION_HEADING_RE: Lazy<Regex> = Lazy::new(|| heading_re("validation checklist"));
static TASKS_HEADING_RE: Lazy<Regex> = Lazy::new(|| heading_re("tasks"));
static DELIVERABLES_HEADING_RE: Lazy<Regex> = Lazy::new(|| heading_re("deliverables"));
static OPEN_QUESTIONS_HEADING_RE: Lazy<Regex> = Lazy::new(|| heading_re("open questions"));

/// Vague wording and the concrete phrasing that replaces it.
static VAGUE_REWRITES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r",?\s*\betc\b\.?", ""),
        (r"\bsomehow\s+", ""),
        (r"\bsome kind of\b", "a"),
        (r"\bstuff\b", "the relevant items"),
        (r"\bthings\b", "items"),
        (r"\bthing\b", "item"),
        (r"\bsomething\b", "a specific change"),
        (r"\bwhatever\b", "the chosen option"),
        (r"\bvarious\b", "the listed"),
    ]
    .into_iter()
    .map(|(pat, replacement)| (Regex::new(&format!("(?i){pat}")).unwrap(), replacement))
    .collect()
});

/// PRD headings and the placeholder line each one starts with.
static PRD_SECTIONS: Lazy<Vec<(Regex, &'static str, &'static str)>> = Lazy::new(|| {
    [
        ("overview", "Overview", "Summarize the product and the problem it solves."),
        ("target users", "Target Users", "Describe who uses this and what they need."),
        ("requirements?", "Requirements", "List each functional requirement as a testable statement."),
        ("non-goals", "Non-Goals", "State what is explicitly out of scope."),
        ("success metrics", "Success Metrics", "Define measurable outcomes for launch."),
    ]
    .into_iter()
    .map(|(names, heading, placeholder)| (heading_re(names), heading, placeholder))
    .collect()
});

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading_re(names: &str) -> Regex {
    Regex::new(&format!(
        r"(?im)^\s*#{{1,6}}\s*(?:{names})\b|^\s*(?:{names})\s*:"
    ))
    .unwrap()
}

fn bullets<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sentences from plain prose lines, skipping headings, bullets and code.
fn prose_sentences(text: &str) -> Vec<String> {
    let stripped = text::strip_code_blocks(text);
    let prose = stripped
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#') && !BULLET_LINE_RE.is_match(line)
        })
        .collect::<Vec<_>>()
        .join(" ");
    text::sentences(&prose)
}

fn string_list_setting(
    ctx: &PatternContext<'_>,
    id: &str,
    key: &str,
) -> Result<Option<Vec<String>>, PatternError> {
    let Some(value) = ctx.setting(key) else {
        return Ok(None);
    };
    let invalid = || PatternError::InvalidSetting {
        id: id.to_string(),
        key: key.to_string(),
        reason: "expected an array of strings".to_string(),
    };
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn string_setting(
    ctx: &PatternContext<'_>,
    id: &str,
    key: &str,
) -> Result<Option<String>, PatternError> {
    match ctx.setting(key) {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(PatternError::InvalidSetting {
            id: id.to_string(),
            key: key.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Rule implementations
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ObjectiveStatement {
    meta: PatternMeta,
}

impl ObjectiveStatement {
    pub const ID: &'static str = "objective-statement";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Objective statement")
                .description("Lifts the opening sentence into an explicit objective")
                .priority(10),
        }
    }
}

impl Pattern for ObjectiveStatement {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || OBJECTIVE_RE.is_match(trimmed) {
            return Ok(PatternApplication::unchanged(text));
        }

        // Leading headings stay in place; the objective is the first prose line after them.
        let mut line_start = 0;
        let mut first_line = None;
        for line in trimmed.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            let stripped = content.trim_start();
            if !stripped.is_empty() && !stripped.starts_with('#') {
                first_line = Some(content);
                break;
            }
            line_start += line.len();
        }
        let Some(first_line) = first_line else {
            return Ok(PatternApplication::unchanged(text));
        };
        if first_line.trim_start().starts_with("```") || BULLET_LINE_RE.is_match(first_line) {
            return Ok(PatternApplication::unchanged(text));
        }

        let head = trimmed[..line_start].trim_end();
        let body = &trimmed[line_start..];
        let split = FIRST_SENTENCE_END_RE
            .find(first_line)
            .map_or(first_line.len(), |m| m.start() + 1);
        let objective = text::capitalize_first(body[..split].trim());
        let rest = body[split..]
            .trim_end()
            .trim_start_matches([' ', '\t'])
            .trim_start_matches(['\n', '\r']);

        let section = format!("## Objective\n{objective}");
        let enhanced = [head, section.as_str(), rest]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(PatternApplication::applied(
            enhanced,
            Improvement::new(
                Dimension::Clarity,
                "Stated the objective explicitly",
                Impact::High,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct FillerRemoval {
    meta: PatternMeta,
}

impl FillerRemoval {
    pub const ID: &'static str = "filler-removal";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Filler removal")
                .description("Drops pleasantries and filler words outside code blocks")
                .priority(9),
        }
    }
}

impl Pattern for FillerRemoval {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        let extra = match string_list_setting(ctx, Self::ID, "extraWords")? {
            Some(words) if !words.is_empty() => {
                let alt = words
                    .iter()
                    .map(|w| regex::escape(w))
                    .collect::<Vec<_>>()
                    .join("|");
                let re = Regex::new(&format!(r"(?i)\b(?:{alt})\b")).map_err(|e| {
                    PatternError::InvalidSetting {
                        id: Self::ID.to_string(),
                        key: "extraWords".to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Some(re)
            }
            _ => None,
        };

        let patterns: Vec<&Regex> = [&*PLEASANTRY_RE, &*FILLER_RE]
            .into_iter()
            .chain(extra.as_ref())
            .collect();
        let mut removed = 0usize;
        let enhanced = text::map_outside_code(text, |prose| {
            let lines: Vec<String> = prose
                .split('\n')
                .map(|line| {
                    let body = line.trim_start();
                    let leading = patterns.iter().any(|re| {
                        text::standalone_matches(re, body).next().is_some_and(|m| m.start() == 0)
                    });
                    let mut out = line.to_string();
                    for re in &patterns {
                        let (kept, count) = text::remove_standalone(&out, re);
                        removed += count;
                        out = kept;
                    }
                    // A removed lead-in can leave an orphaned comma behind.
                    out = REPEATED_COMMA_RE.replace_all(&out, ",").into_owned();
                    out = LEADING_PUNCT_RE.replace_all(&out, "$1").into_owned();
                    // Keep the line's own indentation, not the gap a removed lead-in leaves.
                    let tidied = text::tidy_whitespace(&out);
                    let content = tidied.trim_start();
                    let indent = &line[..line.len() - body.len()];
                    if content.is_empty() {
                        String::new()
                    } else if leading {
                        format!("{indent}{}", text::capitalize_first(content))
                    } else {
                        format!("{indent}{content}")
                    }
                })
                .collect();
            lines.join("\n")
        });

        if removed == 0 {
            return Ok(PatternApplication::unchanged(text));
        }
        let enhanced = enhanced.trim().to_string();
        let impact = if removed > 3 { Impact::Medium } else { Impact::Low };
        Ok(PatternApplication::applied(
            enhanced,
            Improvement::new(
                Dimension::Efficiency,
                format!("Removed {removed} filler or pleasantry phrase(s)"),
                impact,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct VagueTermSharpening {
    meta: PatternMeta,
}

impl VagueTermSharpening {
    pub const ID: &'static str = "vague-term-sharpening";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Vague term sharpening")
                .description("Replaces placeholder words like 'stuff' or 'etc.' with concrete phrasing")
                .priority(8)
                .run_after(&[FillerRemoval::ID]),
        }
    }
}

impl Pattern for VagueTermSharpening {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        let mut replaced = 0usize;
        let enhanced = text::map_outside_code(text, |prose| {
            let mut out = prose.to_string();
            for (re, replacement) in VAGUE_REWRITES.iter() {
                replaced += re.find_iter(&out).count();
                out = re.replace_all(&out, *replacement).into_owned();
            }
            text::tidy_whitespace(&out)
        });

        if replaced == 0 {
            return Ok(PatternApplication::unchanged(text));
        }
        Ok(PatternApplication::applied(
            enhanced.trim().to_string(),
            Improvement::new(
                Dimension::Clarity,
                format!("Replaced {replaced} vague term(s) with specific wording"),
                Impact::Medium,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct ContextSection {
    meta: PatternMeta,
}

impl ContextSection {
    pub const ID: &'static str = "context-section";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Context section")
                .description("Asks for the current state and environment when none is given")
                .mode(PatternMode::Deep)
                .intents([
                    Intent::CodeGeneration,
                    Intent::Planning,
                    Intent::Debugging,
                    Intent::Testing,
                    Intent::Migration,
                    Intent::SecurityReview,
                ])
                .priority(7)
                .run_after(&[ObjectiveStatement::ID]),
        }
    }
}

impl Pattern for ContextSection {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if CONTEXT_RE.is_match(text) {
            return Ok(PatternApplication::unchanged(text));
        }
        let mut lines = vec![
            "Current state: describe the existing code, system, or situation.",
            "Fixed points: note anything that must stay as it is.",
        ];
        if ctx.analysis.characteristics.has_technical_terms {
            lines.push("Environment: list the versions of tools and services involved.");
        }
        Ok(PatternApplication::applied(
            text::append_section(text, "Context", &bullets(&lines)),
            Improvement::new(Dimension::Structure, "Added a context section", Impact::Medium),
        ))
    }
}

#[derive(Debug)]
pub struct RequirementsSection {
    meta: PatternMeta,
}

impl RequirementsSection {
    pub const ID: &'static str = "requirements-section";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Requirements section")
                .description("Collects directive sentences into a requirements list")
                .intents([
                    Intent::CodeGeneration,
                    Intent::Planning,
                    Intent::Refinement,
                    Intent::Debugging,
                    Intent::Testing,
                    Intent::Migration,
                    Intent::Documentation,
                ])
                .priority(7)
                .run_after(&[ObjectiveStatement::ID, ContextSection::ID]),
        }
    }
}

impl Pattern for RequirementsSection {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if text.trim().is_empty() || REQUIREMENTS_HEADING_RE.is_match(text) {
            return Ok(PatternApplication::unchanged(text));
        }
        let directives: Vec<String> = prose_sentences(text)
            .into_iter()
            .filter(|s| DIRECTIVE_RE.is_match(s))
            .map(|s| text::capitalize_first(&s))
            .collect();
        let (body, impact) = if directives.is_empty() {
            (
                bullets(&["List each functional requirement as its own bullet."]),
                Impact::Low,
            )
        } else {
            (bullets(&directives), Impact::Medium)
        };
        Ok(PatternApplication::applied(
            text::append_section(text, "Requirements", &body),
            Improvement::new(
                Dimension::Structure,
                "Organized requirements into a list",
                impact,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct DebugReportTemplate {
    meta: PatternMeta,
}

impl DebugReportTemplate {
    pub const ID: &'static str = "debug-report-template";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Debug report template")
                .description("Adds error, expected, actual and reproduction sections to bug reports")
                .intents([Intent::Debugging])
                .priority(8)
                .run_after(&[ObjectiveStatement::ID])
                .excludes_with(&[RequirementsSection::ID]),
        }
    }
}

impl Pattern for DebugReportTemplate {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        let mut enhanced = text.to_string();
        let mut added = Vec::new();
        if !STACK_TRACE_RE.is_match(text) {
            enhanced = text::append_section(
                &enhanced,
                "Error Details",
                "- Paste the exact error message or stack trace.",
            );
            added.push("error details");
        }
        if !EXPECTED_RE.is_match(text) {
            enhanced = text::append_section(
                &enhanced,
                "Expected Behavior",
                "- Describe what should happen.",
            );
            added.push("expected behavior");
        }
        if !ACTUAL_RE.is_match(text) {
            enhanced = text::append_section(
                &enhanced,
                "Actual Behavior",
                "- Describe what happens instead.",
            );
            added.push("actual behavior");
        }
        if !REPRO_RE.is_match(text) {
            enhanced = text::append_section(
                &enhanced,
                "Steps to Reproduce",
                "1. Starting state\n2. Action taken\n3. Observed result",
            );
            added.push("reproduction steps");
        }

        if added.is_empty() {
            return Ok(PatternApplication::unchanged(text));
        }
        Ok(PatternApplication::applied(
            enhanced,
            Improvement::new(
                Dimension::Completeness,
                format!("Added {} to the bug report", added.join(", ")),
                Impact::High,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct PlanningScaffold {
    meta: PatternMeta,
}

impl PlanningScaffold {
    pub const ID: &'static str = "planning-scaffold";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Planning scaffold")
                .description("Frames planning requests as problem, goal, constraints and deliverables")
                .mode(PatternMode::Deep)
                .intents([Intent::Planning])
                .priority(8)
                .run_after(&[ContextSection::ID])
                .excludes_with(&[RequirementsSection::ID]),
        }
    }
}

impl Pattern for PlanningScaffold {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        let sections: [(&Regex, &str, &str); 4] = [
            (&*PROBLEM_RE, "Problem Statement", "- What problem is being solved, and for whom?"),
            (&*OBJECTIVE_RE, "Goal", "- The outcome this plan must deliver."),
            (&*CONSTRAINT_RE, "Constraints", "- Budget, deadline, and technical limits."),
            (&*DELIVERABLES_HEADING_RE, "Deliverables", "- Concrete artifacts produced at each milestone."),
        ];
        let mut enhanced = text.to_string();
        let mut added = Vec::new();
        for (marker, heading, body) in sections {
            if !marker.is_match(text) {
                enhanced = text::append_section(&enhanced, heading, body);
                added.push(heading);
            }
        }
        if added.is_empty() {
            return Ok(PatternApplication::unchanged(text));
        }
        Ok(PatternApplication::applied(
            enhanced,
            Improvement::new(
                Dimension::Structure,
                format!("Added planning sections: {}", added.join(", ")),
                Impact::High,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct TechStack {
    meta: PatternMeta,
}

impl TechStack {
    pub const ID: &'static str = "tech-stack";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Tech stack")
                .description("Names the language from code fences, or asks for one")
                .intents([Intent::CodeGeneration, Intent::Migration])
                .priority(5)
                .run_after(&[RequirementsSection::ID]),
        }
    }
}

impl Pattern for TechStack {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if TECH_STACK_RE.is_match(&text::strip_code_blocks(text)) {
            return Ok(PatternApplication::unchanged(text));
        }
        let (body, description, impact) = match CODE_FENCE_LANG_RE.captures(text) {
            Some(caps) => (
                format!("- Language: {}", text::capitalize_first(&caps[1])),
                "Stated the tech stack inferred from the code sample",
                Impact::Medium,
            ),
            None => (
                "- Specify the target language, framework, and versions.".to_string(),
                "Asked for the tech stack",
                Impact::Low,
            ),
        };
        Ok(PatternApplication::applied(
            text::append_section(text, "Tech Stack", &body),
            Improvement::new(Dimension::Completeness, description, impact),
        ))
    }
}

#[derive(Debug)]
pub struct OutputFormat {
    meta: PatternMeta,
}

impl OutputFormat {
    pub const ID: &'static str = "output-format";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Output format")
                .description("Specifies the shape of the expected response")
                .intents([
                    Intent::CodeGeneration,
                    Intent::Documentation,
                    Intent::Testing,
                    Intent::Migration,
                    Intent::Learning,
                    Intent::SecurityReview,
                ])
                .priority(6)
                .run_after(&[RequirementsSection::ID]),
        }
    }

    fn default_format(intent: Intent) -> &'static str {
        match intent {
            Intent::Documentation => "Markdown with headings, usage examples, and a reference section.",
            Intent::Learning => "A step-by-step explanation followed by one worked example.",
            Intent::SecurityReview => {
                "A table of findings with severity, location, and remediation."
            }
            Intent::Testing => "Complete test files in fenced code blocks, one block per file.",
            _ => "Complete, runnable code in fenced code blocks with a short note on key decisions.",
        }
    }
}

impl Pattern for OutputFormat {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        let configured = string_setting(ctx, Self::ID, "format")?;
        if OUTPUT_HEADING_RE.is_match(text)
            || (configured.is_none() && OUTPUT_FORMAT_RE.is_match(text))
        {
            return Ok(PatternApplication::unchanged(text));
        }
        let line = match configured {
            Some(format) => format!("Respond in {format}."),
            None => Self::default_format(ctx.intent()).to_string(),
        };
        Ok(PatternApplication::applied(
            text::append_section(text, "Output Format", &bullets(&[line])),
            Improvement::new(
                Dimension::Structure,
                "Specified the expected output format",
                Impact::Medium,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct EdgeCaseChecklist {
    meta: PatternMeta,
}

impl EdgeCaseChecklist {
    pub const ID: &'static str = "edge-case-checklist";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Edge case checklist")
                .description("Lists the edge cases an implementation should handle")
                .mode(PatternMode::Deep)
                .intents([Intent::CodeGeneration, Intent::Testing])
                .priority(4)
                .run_after(&[RequirementsSection::ID]),
        }
    }
}

impl Pattern for EdgeCaseChecklist {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if EDGE_CASE_RE.is_match(text) {
            return Ok(PatternApplication::unchanged(text));
        }
        let body = bullets(&[
            "Empty or missing input",
            "Invalid or malformed values",
            "Boundary sizes and limits",
            "Error handling when a dependency fails",
        ]);
        Ok(PatternApplication::applied(
            text::append_section(text, "Edge Cases", &body),
            Improvement::new(
                Dimension::Completeness,
                "Listed edge cases to handle",
                Impact::Medium,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct ExampleRequest {
    meta: PatternMeta,
}

impl ExampleRequest {
    pub const ID: &'static str = "example-request";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Example request")
                .description("Asks for a concrete input/output example")
                .mode(PatternMode::Deep)
                .intents([Intent::CodeGeneration, Intent::Learning])
                .priority(3)
                .run_after(&[OutputFormat::ID]),
        }
    }
}

impl Pattern for ExampleRequest {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if EXAMPLE_RE.is_match(text) {
            return Ok(PatternApplication::unchanged(text));
        }
        Ok(PatternApplication::applied(
            text::append_section(
                text,
                "Examples",
                "- Include one concrete input together with its expected output.",
            ),
            Improvement::new(
                Dimension::Actionability,
                "Requested a concrete example",
                Impact::Medium,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct SuccessCriteria {
    meta: PatternMeta,
}

impl SuccessCriteria {
    pub const ID: &'static str = "success-criteria";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Success criteria")
                .description("States how a correct result will be recognized")
                .priority(5)
                .run_after(&[RequirementsSection::ID, OutputFormat::ID]),
        }
    }

    fn default_criteria(intent: Intent) -> Vec<String> {
        let criteria: &[&str] = match intent {
            Intent::Debugging => &[
                "The error no longer occurs when following the reproduction steps",
                "Behavior elsewhere is unchanged",
            ],
            Intent::Testing => &[
                "All new tests pass",
                "Each test fails when the behavior it covers is broken",
            ],
            Intent::Planning => &[
                "Each goal maps to a concrete deliverable",
                "Risks and open decisions are listed",
            ],
            Intent::Migration => &[
                "Existing behavior is preserved after the migration",
                "No deprecated APIs remain in use",
            ],
            _ => &[
                "The result meets every stated requirement",
                "The response follows the requested format",
            ],
        };
        criteria.iter().map(|c| c.to_string()).collect()
    }
}

impl Pattern for SuccessCriteria {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if SUCCESS_RE.is_match(text) {
            return Ok(PatternApplication::unchanged(text));
        }
        let criteria = match string_list_setting(ctx, Self::ID, "criteria")? {
            Some(list) if !list.is_empty() => list,
            _ => Self::default_criteria(ctx.intent()),
        };
        Ok(PatternApplication::applied(
            text::append_section(text, "Success Criteria", &bullets(&criteria)),
            Improvement::new(
                Dimension::Actionability,
                "Defined success criteria",
                Impact::High,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct SecurityFocus {
    meta: PatternMeta,
}

impl SecurityFocus {
    pub const ID: &'static str = "security-focus";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Security focus")
                .description("Lists the vulnerability classes a review should cover")
                .mode(PatternMode::Deep)
                .intents([Intent::SecurityReview])
                .priority(7)
                .run_after(&[ContextSection::ID]),
        }
    }
}

impl Pattern for SecurityFocus {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if THREAT_RE.is_match(text) {
            return Ok(PatternApplication::unchanged(text));
        }
        let body = bullets(&[
            "Input validation and injection (SQL, command, XSS)",
            "Authentication and authorization checks",
            "Secrets handling and sensitive data exposure",
            "Known vulnerabilities in dependencies",
        ]);
        Ok(PatternApplication::applied(
            text::append_section(text, "Review Focus", &body),
            Improvement::new(
                Dimension::Completeness,
                "Listed the security areas to review",
                Impact::Medium,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct TaskList {
    meta: PatternMeta,
}

impl TaskList {
    pub const ID: &'static str = "task-list";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Task list")
                .description("Turns a prose request into a numbered task list")
                .intents([Intent::TaskBreakdown])
                .priority(6)
                .run_after(&[ObjectiveStatement::ID]),
        }
    }
}

impl Pattern for TaskList {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if TASKS_HEADING_RE.is_match(text) || NUMBERED_LINE_RE.is_match(text) {
            return Ok(PatternApplication::unchanged(text));
        }
        let sentences = prose_sentences(text);
        if sentences.is_empty() {
            return Ok(PatternApplication::unchanged(text));
        }
        let body = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, text::capitalize_first(s)))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(PatternApplication::applied(
            text::append_section(text, "Tasks", &body),
            Improvement::new(
                Dimension::Structure,
                format!("Broke the request into {} task(s)", sentences.len()),
                Impact::High,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct PrdValidationChecklist {
    meta: PatternMeta,
}

impl PrdValidationChecklist {
    pub const ID: &'static str = "prd-validation-checklist";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "PRD validation checklist")
                .description("Appends the checks a requirements document must pass")
                .mode(PatternMode::Fast)
                .intents([Intent::PrdGeneration])
                .priority(9)
                .phases(PhaseScope::only([Phase::Validation])),
        }
    }
}

impl Pattern for PrdValidationChecklist {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if VALIDATION_HEADING_RE.is_match(text) {
            return Ok(PatternApplication::unchanged(text));
        }
        let body = bullets(&[
            "[ ] Problem and target users are stated",
            "[ ] Every requirement is testable",
            "[ ] Non-goals are listed",
            "[ ] Success metrics are measurable",
        ]);
        Ok(PatternApplication::applied(
            text::append_section(text, "Validation Checklist", &body),
            Improvement::new(
                Dimension::Actionability,
                "Added a validation checklist",
                Impact::Medium,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct PrdSectionScaffold {
    meta: PatternMeta,
}

impl PrdSectionScaffold {
    pub const ID: &'static str = "prd-section-scaffold";

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "PRD section scaffold")
                .description("Adds the standard sections of a requirements document")
                .mode(PatternMode::Deep)
                .intents([Intent::PrdGeneration])
                .priority(8)
                .phases(PhaseScope::only([Phase::Drafting, Phase::Output])),
        }
    }
}

impl Pattern for PrdSectionScaffold {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, _ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        let mut enhanced = text.to_string();
        let mut added = Vec::new();
        for (marker, heading, placeholder) in PRD_SECTIONS.iter() {
            if !marker.is_match(text) {
                enhanced = text::append_section(&enhanced, heading, &format!("- {placeholder}"));
                added.push(*heading);
            }
        }
        if added.is_empty() {
            return Ok(PatternApplication::unchanged(text));
        }
        Ok(PatternApplication::applied(
            enhanced,
            Improvement::new(
                Dimension::Structure,
                format!("Added PRD sections: {}", added.join(", ")),
                Impact::High,
            ),
        ))
    }
}

#[derive(Debug)]
pub struct ClarifyingQuestions {
    meta: PatternMeta,
}

impl ClarifyingQuestions {
    pub const ID: &'static str = "clarifying-questions";
    const MAX_QUESTIONS: usize = 3;

    pub fn new() -> Self {
        Self {
            meta: PatternMeta::new(Self::ID, "Clarifying questions")
                .description("Asks up to three questions about what the request leaves open")
                .mode(PatternMode::Fast)
                .intents(Intent::SCORED.into_iter().chain([Intent::PrdGeneration]))
                .priority(6)
                .phases(PhaseScope::only([Phase::Clarification])),
        }
    }
}

impl Pattern for ClarifyingQuestions {
    fn meta(&self) -> &PatternMeta {
        &self.meta
    }

    fn apply(&self, text: &str, ctx: &PatternContext<'_>) -> Result<PatternApplication, PatternError> {
        if OPEN_QUESTIONS_HEADING_RE.is_match(text) {
            return Ok(PatternApplication::unchanged(text));
        }
        let checks = [
            (
                !OBJECTIVE_RE.is_match(text),
                "What single outcome should this achieve?",
            ),
            (
                ctx.intent() == Intent::CodeGeneration && !TECH_STACK_RE.is_match(text),
                "Which language and framework should be used?",
            ),
            (
                !SUCCESS_RE.is_match(text),
                "How will we know the result is correct?",
            ),
            (
                !CONTEXT_RE.is_match(text),
                "What existing code or constraints must be respected?",
            ),
        ];
        let questions: Vec<&str> = checks
            .into_iter()
            .filter(|(missing, _)| *missing)
            .map(|(_, q)| q)
            .take(Self::MAX_QUESTIONS)
            .collect();
        if questions.is_empty() {
            return Ok(PatternApplication::unchanged(text));
        }
        Ok(PatternApplication::applied(
            text::append_section(text, "Open Questions", &bullets(&questions)),
            Improvement::new(
                Dimension::Clarity,
                format!("Raised {} clarifying question(s)", questions.len()),
                Impact::Medium,
            ),
        ))
    }
}

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

pub fn builtin_patterns() -> Vec<Arc<dyn Pattern>> {
    vec![
        Arc::new(ObjectiveStatement::new()),
        Arc::new(FillerRemoval::new()),
        Arc::new(VagueTermSharpening::new()),
        Arc::new(ContextSection::new()),
        Arc::new(RequirementsSection::new()),
        Arc::new(DebugReportTemplate::new()),
        Arc::new(PlanningScaffold::new()),
        Arc::new(TechStack::new()),
        Arc::new(OutputFormat::new()),
        Arc::new(EdgeCaseChecklist::new()),
        Arc::new(ExampleRequest::new()),
        Arc::new(SuccessCriteria::new()),
        Arc::new(SecurityFocus::new()),
        Arc::new(TaskList::new()),
        Arc::new(PrdValidationChecklist::new()),
        Arc::new(PrdSectionScaffold::new()),
        Arc::new(ClarifyingQuestions::new()),
    ]
}

pub fn builtin_catalog() -> PatternCatalog {
    let mut catalog = PatternCatalog::new();
    for pattern in builtin_patterns() {
        if let Err(e) = catalog.register(pattern) {
            warn!("skipping built-in pattern: {e}");
        }
    }
    catalog
}

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static FENCED_CODE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());

static PUNCT_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\w]+|[^\w]+$").unwrap());

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+([,.;:!?])").unwrap());

static SENTENCE_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]["'\u{201D}\u{2019})\]]*(?:\s|$)"#).unwrap());

// ---------------------------------------------------------------------------
// Stopwords
// ---------------------------------------------------------------------------

pub(crate) static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "is", "it",
        "that", "this", "with", "as", "by", "from", "was", "were", "are", "be", "been", "has",
        "have", "had", "not", "no", "do", "does", "did", "will", "would", "could", "should", "can",
        "may", "might", "if", "then", "than", "so", "up", "out", "about", "into", "over", "after",
        "before", "between", "through", "just", "also", "very", "more", "most", "some", "any",
        "each", "every", "all", "both", "few", "other", "such", "only", "own", "same", "too",
        "how", "what", "which", "who", "when", "where", "why", "i", "me", "my", "we", "our", "you",
        "your",
    ]
    .into_iter()
    .collect()
});

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub(crate) fn strip_code_blocks(text: &str) -> String {
    FENCED_CODE_BLOCK_RE.replace_all(text, "").into_owned()
}

pub(crate) fn has_code_block(text: &str) -> bool {
    FENCED_CODE_BLOCK_RE.is_match(text)
}

/// Lowercased whitespace tokens with surrounding punctuation removed.
pub(crate) fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|t| {
            let stripped = PUNCT_STRIP_RE.replace_all(t, "").to_lowercase();
            if stripped.is_empty() {
                None
            } else {
                Some(stripped)
            }
        })
        .collect()
}

pub(crate) fn sentences(text: &str) -> Vec<String> {
    SENTENCE_SPLIT_RE
        .split(text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Collapse the whitespace a removal leaves behind, line by line.
/// Leading indentation is kept so nested lists stay nested.
pub(crate) fn tidy_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            let body = line.trim_start_matches([' ', '\t']);
            let indent = &line[..line.len() - body.len()];
            let collapsed = MULTI_SPACE_RE.replace_all(body, " ");
            let tidied = SPACE_BEFORE_PUNCT_RE.replace_all(&collapsed, "$1");
            let tidied = tidied.trim_end();
            if tidied.is_empty() {
                String::new()
            } else {
                format!("{indent}{tidied}")
            }
        })
        .collect();
    lines.join("\n")
}

/// True when the match is part of a hyphenated compound such as "just-in-time".
pub(crate) fn in_compound(text: &str, start: usize, end: usize) -> bool {
    text[..start].ends_with('-') || text[end..].starts_with('-')
}

/// Matches of `re` that stand alone rather than inside a hyphenated compound.
pub(crate) fn standalone_matches<'t>(
    re: &'t Regex,
    text: &'t str,
) -> impl Iterator<Item = regex::Match<'t>> + 't {
    re.find_iter(text)
        .filter(move |m| !in_compound(text, m.start(), m.end()))
}

/// Remove the standalone matches of `re`, returning the new text and how many were removed.
pub(crate) fn remove_standalone(text: &str, re: &Regex) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut removed = 0;
    for m in standalone_matches(re, text) {
        out.push_str(&text[last..m.start()]);
        last = m.end();
        removed += 1;
    }
    out.push_str(&text[last..]);
    (out, removed)
}

/// Uppercase the first character, leaving the rest untouched.
pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Append a markdown section, separated from the body by a blank line.
pub(crate) fn append_section(text: &str, heading: &str, body: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        format!("## {heading}\n{body}")
    } else {
        format!("{trimmed}\n\n## {heading}\n{body}")
    }
}

/// Rewrite the prose of `text` with `f`, leaving fenced code blocks intact.
pub(crate) fn map_outside_code<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in FENCED_CODE_BLOCK_RE.find_iter(text) {
        out.push_str(&f(&text[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&f(&text[last..]));
    out
}

use pretty_assertions::assert_eq;
use prompt_refinery::{Ambiguity, Intent, IntentClassifier, Mode};

fn score_of(scores: &[(Intent, f64)], intent: Intent) -> f64 {
    scores
        .iter()
        .find(|(i, _)| *i == intent)
        .map(|(_, s)| *s)
        .unwrap_or_default()
}

#[test]
fn fix_error_is_debugging() {
    let analysis = IntentClassifier::new().classify("fix error in the login flow");
    assert_eq!(analysis.primary_intent, Intent::Debugging);
    assert!(
        analysis.confidence >= 70,
        "expected confidence >= 70, got {}",
        analysis.confidence
    );
    assert_eq!(analysis.ambiguity, Some(Ambiguity::Low));
}

#[test]
fn empty_text_falls_back() {
    let analysis = IntentClassifier::new().classify("");
    assert_eq!(analysis.primary_intent, Intent::CodeGeneration);
    assert_eq!(analysis.confidence, 50);
    assert_eq!(analysis.ambiguity, Some(Ambiguity::High));
    assert_eq!(analysis.suggested_mode, Mode::Deep);
    assert!(analysis.secondary_intents.is_empty());
}

#[test]
fn only_scored_intents_are_inferred() {
    let scores = IntentClassifier::new().scores("write a PRD and break it into tasks");
    assert_eq!(scores.len(), Intent::SCORED.len());
    assert!(scores.iter().all(|(intent, _)| !intent.is_explicit_only()));
}

#[test]
fn nearby_negation_halves_each_match() {
    let classifier = IntentClassifier::new();
    let plain = score_of(&classifier.scores("add tests for the parser"), Intent::Testing);
    let negated = score_of(
        &classifier.scores("do not add tests for the parser"),
        Intent::Testing,
    );
    assert_eq!(plain, 30.0);
    assert_eq!(negated, 15.0);
}

#[test]
fn distant_negation_is_ignored() {
    let text = "never mind the old notes, we need to add tests for the parser";
    let score = score_of(&IntentClassifier::new().scores(text), Intent::Testing);
    assert_eq!(score, 30.0);
}

#[test]
fn override_beats_higher_raw_score() {
    // Planning scores 50 here, debugging only 20, but the debugging rule fires first.
    let text = "plan the architecture and design a roadmap strategy for handling the error and bug reports";
    let classifier = IntentClassifier::new();
    let scores = classifier.scores(text);
    assert!(score_of(&scores, Intent::Planning) > score_of(&scores, Intent::Debugging));

    let analysis = classifier.classify(text);
    assert_eq!(analysis.primary_intent, Intent::Debugging);
}

#[test]
fn equal_scores_pick_smallest_name() {
    let classifier = IntentClassifier::new();
    for text in ["guide readability", "readability guide"] {
        let analysis = classifier.classify(text);
        assert_eq!(analysis.primary_intent, Intent::Documentation, "text: {text}");
        assert_eq!(analysis.ambiguity, Some(Ambiguity::High));
    }
}

#[test]
fn planning_suggests_deep_mode() {
    let analysis =
        IntentClassifier::new().classify("plan the architecture and design a roadmap strategy");
    assert_eq!(analysis.primary_intent, Intent::Planning);
    assert_eq!(analysis.suggested_mode, Mode::Deep);
}

#[test]
fn characteristics_detect_code_and_questions() {
    let classifier = IntentClassifier::new();

    let code = classifier.characteristics("```rust\nfn main() {}\n```");
    assert!(code.has_code_context);

    let open = classifier.characteristics("How should we approach the caching layer?");
    assert!(open.is_open_ended);
    assert!(!open.has_code_context);

    let tech = classifier.characteristics("Add a REST endpoint backed by the database");
    assert!(tech.has_technical_terms);
}

#[test]
fn secondary_intents_are_bounded() {
    let text = "refactor the parser, write tests and add tests for it, \
                fix the bug that crashes it, and document the readme";
    let analysis = IntentClassifier::new().classify(text);
    assert!(analysis.secondary_intents.len() <= 2);
    for secondary in &analysis.secondary_intents {
        assert_ne!(secondary.intent, analysis.primary_intent);
        assert!(secondary.confidence <= 100);
    }
}

#[test]
fn confidence_stays_in_range() {
    let classifier = IntentClassifier::new();
    let samples = [
        "",
        "?",
        "not not not not",
        "fix fix fix error error bug bug crash crash",
        "explain how does the borrow checker work? teach me the concept",
        "migrate from python 2 to python 3, the legacy code uses deprecated apis",
        "security audit for sql injection and xss in the login form",
        "写一个函数",
    ];
    for text in samples {
        let analysis = classifier.classify(text);
        assert!(analysis.confidence <= 100, "{text}: {}", analysis.confidence);
    }
}

#[test]
fn explicit_analysis_is_certain() {
    let analysis = IntentClassifier::new().explicit("draft a PRD for a habit tracker", Intent::PrdGeneration);
    assert_eq!(analysis.primary_intent, Intent::PrdGeneration);
    assert_eq!(analysis.confidence, 100);
    assert_eq!(analysis.ambiguity, None);
    assert!(analysis.secondary_intents.is_empty());
}

#[test]
fn intent_names_parse() {
    assert_eq!("security-review".parse::<Intent>(), Ok(Intent::SecurityReview));
    assert_eq!("SECURITY_REVIEW".parse::<Intent>(), Ok(Intent::SecurityReview));
    assert_eq!("prd-generation".parse::<Intent>(), Ok(Intent::PrdGeneration));
    assert!("nope".parse::<Intent>().is_err());
}

#[test]
fn analysis_serializes_kebab_case() {
    let analysis = IntentClassifier::new().classify("fix error in the login flow");
    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["primary_intent"], "debugging");
    assert_eq!(json["ambiguity"], "low");
    assert!(json["characteristics"]["has_code_context"].is_boolean());
}

#[test]
fn negation_inside_a_word_is_ignored() {
    let classifier = IntentClassifier::new();
    let domino = score_of(&classifier.scores("A domino effect, then add tests"), Intent::Testing);
    let domain = score_of(&classifier.scores("A domain effect, then add tests"), Intent::Testing);
    assert_eq!(domino, 30.0);
    assert_eq!(domain, 30.0);
}

#[test]
fn negation_window_counts_characters() {
    let classifier = IntentClassifier::new();
    // 19 characters but 33 bytes separate the negation from the match.
    let text = format!("not {} tests", "é".repeat(14));
    assert_eq!(score_of(&classifier.scores(&text), Intent::Testing), 5.0);
}

#[test]
fn prose_punctuation_is_not_code() {
    let classifier = IntentClassifier::new();
    for text in [
        "The page is slow; improve the readability of the copy",
        "Rename the file(s) in the upload folder",
        "Let me know which approach is best",
    ] {
        assert!(!classifier.characteristics(text).has_code_context, "{text}");
    }
    let scores = classifier.scores("The page is slow; improve the readability of the copy");
    assert_eq!(score_of(&scores, Intent::Refinement), 40.0);
}

#[test]
fn code_shaped_syntax_is_code() {
    let classifier = IntentClassifier::new();
    for text in [
        "call foo(x, 1);",
        "let x = 1;",
        "the handler runs init() first",
        "map each item => item.id",
        "def parse(raw): pass",
    ] {
        assert!(classifier.characteristics(text).has_code_context, "{text}");
    }
}

#[test]
fn code_block_bonus_for_debugging_refinement_testing() {
    let classifier = IntentClassifier::new();
    let code = "\n```\nx = 1\n```";
    let cases = [
        ("There is a bug", Intent::Debugging),
        ("Rewrite it", Intent::Refinement),
        ("Mock it", Intent::Testing),
    ];
    for (text, intent) in cases {
        assert_eq!(score_of(&classifier.scores(text), intent), 10.0, "{text}");
        let with_code = format!("{text}{code}");
        assert_eq!(score_of(&classifier.scores(&with_code), intent), 25.0, "{with_code}");
    }
    let codegen = classifier.scores(&format!("A new one{code}"));
    assert_eq!(score_of(&codegen, Intent::CodeGeneration), 5.0);
}

#[test]
fn question_bonus_for_planning_documentation_learning() {
    let classifier = IntentClassifier::new();
    let cases = [
        ("scope", Intent::Planning),
        ("docs", Intent::Documentation),
        ("concept", Intent::Learning),
    ];
    for (word, intent) in cases {
        assert_eq!(score_of(&classifier.scores(word), intent), 10.0, "{word}");
        let question = format!("{word}?");
        assert_eq!(score_of(&classifier.scores(&question), intent), 20.0, "{question}");
    }
    assert_eq!(score_of(&classifier.scores("bug?"), Intent::Debugging), 10.0);
}

#[test]
fn domain_terms_add_bonus() {
    let classifier = IntentClassifier::new();
    let security = classifier.scores("secure it per owasp");
    assert_eq!(score_of(&security, Intent::SecurityReview), 25.0);

    assert_eq!(score_of(&classifier.scores("upgrade to node"), Intent::Migration), 30.0);
    assert_eq!(score_of(&classifier.scores("upgrade to v2"), Intent::Migration), 45.0);

    assert_eq!(score_of(&classifier.scores("mock the clock"), Intent::Testing), 10.0);
    assert_eq!(score_of(&classifier.scores("mock with pytest"), Intent::Testing), 25.0);
}

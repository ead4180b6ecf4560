// Unit tests for the denylist lexicon.
//
// Covers whole-token boundaries (Latin and Japanese), case folding,
// deduplication, idempotent adds, recompilation after mutation, and lenient
// loading of external lexicon sources.

use std::io::Write;

use sanctuary_review::lexicon::defaults::DEFAULT_TERMS;
use sanctuary_review::lexicon::{Lexicon, MatchResult};

fn lexicon_of(terms: &[&str]) -> Lexicon {
    let mut lexicon = Lexicon::empty();
    for term in terms {
        lexicon.add(term);
    }
    lexicon
}

// ============================================================
// Default lexicon
// ============================================================

#[test]
fn default_lexicon_holds_builtin_terms() {
    let lexicon = Lexicon::new();
    assert_eq!(lexicon.count(), DEFAULT_TERMS.len());
    assert!(lexicon.contains("死ね"));
}

#[test]
fn denylisted_term_alone_matches() {
    let result = Lexicon::new().detect("死ね");
    assert!(result.matched);
    assert_eq!(result.sorted_terms(), vec!["死ね"]);
}

#[test]
fn term_followed_by_punctuation_matches() {
    let result = Lexicon::new().detect("死ね！");
    assert_eq!(result.sorted_terms(), vec!["死ね"]);
}

#[test]
fn space_separated_terms_all_reported() {
    let result = Lexicon::new().detect("バカ アホ、クズ");
    assert_eq!(result.sorted_terms(), vec!["アホ", "クズ", "バカ"]);
}

#[test]
fn benign_text_does_not_match() {
    let result = Lexicon::new().detect("今日はとても良い天気ですね！みなさんも素敵な一日を。");
    assert_eq!(result, MatchResult::none());
}

// ============================================================
// Whole-token boundaries
// ============================================================

#[test]
fn latin_term_inside_longer_word_does_not_match() {
    let lexicon = lexicon_of(&["bad"]);
    assert!(!lexicon.detect("nice badge").matched);
    assert!(!lexicon.detect("badly").matched);
}

#[test]
fn latin_term_as_token_matches() {
    let lexicon = lexicon_of(&["bad"]);
    assert!(lexicon.detect("a bad day").matched);
    assert!(lexicon.detect("bad.").matched);
}

#[test]
fn japanese_term_inside_compound_does_not_match() {
    // ゴミ箱 is "trash can", 批判的思考 is "critical thinking".
    let lexicon = Lexicon::new();
    assert!(!lexicon.detect("ゴミ箱はどこ").matched);
    assert!(!lexicon.detect("批判的思考").matched);
}

#[test]
fn term_inside_unspaced_run_is_not_a_whole_token() {
    // Kana and kanji are word characters, so a term glued to surrounding
    // text has no token boundary. A space or punctuation provides one.
    let lexicon = Lexicon::new();
    assert!(!lexicon.detect("お前は死ね").matched);
    assert!(lexicon.detect("お前は 死ね").matched);
    assert!(lexicon.detect("お前は、死ね").matched);
}

// ============================================================
// Case folding and deduplication
// ============================================================

#[test]
fn matching_ignores_case() {
    let lexicon = lexicon_of(&["bad"]);
    let result = lexicon.detect("BAD vibes");
    assert_eq!(result.sorted_terms(), vec!["bad"]);
}

#[test]
fn repeated_hits_are_deduplicated() {
    let lexicon = lexicon_of(&["bad"]);
    let result = lexicon.detect("bad bad BAD Bad");
    assert_eq!(result.terms.len(), 1);
}

#[test]
fn case_folded_hit_reports_registered_term() {
    // U+017F folds to "s" and U+212A (Kelvin sign) folds to "k".
    let lexicon = lexicon_of(&["sus", "kill"]);
    for text in ["that is \u{17F}u\u{17F}", "sus \u{17F}u\u{17F}", "\u{212A}ILL"] {
        let result = lexicon.detect(text);
        assert!(result.matched, "no match in {text:?}");
        for term in &result.terms {
            assert!(lexicon.terms().any(|t| t == term), "{term:?} is not registered");
        }
    }
    assert_eq!(lexicon.detect("sus \u{17F}u\u{17F}").sorted_terms(), vec!["sus"]);
}

#[test]
fn case_variants_register_once() {
    let mut lexicon = lexicon_of(&["Bad"]);
    assert!(!lexicon.add("bad"));
    let added = lexicon.extend(vec!["BAD".to_string(), "worse".to_string()]);
    assert_eq!(added, 1);
    assert_eq!(lexicon.count(), 2);
    assert_eq!(lexicon.detect("bad WORSE").sorted_terms(), vec!["Bad", "worse"]);
}

// ============================================================
// Blank input
// ============================================================

#[test]
fn empty_and_whitespace_never_match() {
    let lexicon = Lexicon::new();
    assert_eq!(lexicon.detect(""), MatchResult::none());
    assert_eq!(lexicon.detect("   \n\t "), MatchResult::none());
    assert_eq!(lexicon.detect("\u{3000}"), MatchResult::none());
}

// ============================================================
// Mutation
// ============================================================

#[test]
fn add_is_idempotent() {
    let mut once = Lexicon::new();
    once.add("loser");

    let mut twice = Lexicon::new();
    assert!(twice.add("loser"));
    assert!(!twice.add("loser"));

    assert_eq!(once.count(), twice.count());
    for text in ["loser", "what a LOSER", "losers", "fine"] {
        assert_eq!(once.detect(text), twice.detect(text), "differs on {text:?}");
    }
}

#[test]
fn added_term_is_matched_immediately() {
    let mut lexicon = Lexicon::new();
    assert!(!lexicon.detect("you troll").matched);
    lexicon.add("troll");
    assert_eq!(lexicon.detect("you troll").sorted_terms(), vec!["troll"]);
}

#[test]
fn blank_term_is_refused() {
    let mut lexicon = Lexicon::new();
    let before = lexicon.count();
    assert!(!lexicon.add("   "));
    assert_eq!(lexicon.count(), before);
}

#[test]
fn add_trims_surrounding_whitespace() {
    let mut lexicon = Lexicon::empty();
    lexicon.add("  jerk ");
    assert!(lexicon.contains("jerk"));
    assert!(lexicon.detect("jerk").matched);
}

#[test]
fn extend_reports_new_terms_only() {
    let mut lexicon = lexicon_of(&["a1"]);
    let added = lexicon.extend(vec!["a1".to_string(), "b2".to_string(), " ".to_string()]);
    assert_eq!(added, 1);
    assert_eq!(lexicon.count(), 2);
}

#[test]
fn regex_metacharacters_are_literal() {
    let lexicon = lexicon_of(&["f.ck"]);
    assert!(lexicon.detect("f.ck").matched);
    assert!(!lexicon.detect("fuck").matched);
}

// ============================================================
// External sources
// ============================================================

fn source_file(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[test]
fn source_terms_are_merged_with_defaults() {
    let file = source_file(r#"{"negative_words": ["ひどい", "死ね"]}"#);
    let lexicon = Lexicon::with_source(Some(file.path()));
    assert_eq!(lexicon.count(), DEFAULT_TERMS.len() + 1);
    assert!(lexicon.detect("ひどい").matched);
}

#[test]
fn missing_source_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let lexicon = Lexicon::with_source(Some(dir.path().join("absent.json").as_path()));
    assert_eq!(lexicon.count(), DEFAULT_TERMS.len());
}

#[test]
fn malformed_source_keeps_defaults() {
    let file = source_file("{ not json");
    let lexicon = Lexicon::with_source(Some(file.path()));
    assert_eq!(lexicon.count(), DEFAULT_TERMS.len());
    assert!(lexicon.detect("死ね").matched);
}

#[test]
fn partially_broken_source_keeps_good_entries() {
    let file = source_file(r#"{"negative_words": ["ひどい", 42, {"x": 1}, "うるさい"]}"#);
    let lexicon = Lexicon::with_source(Some(file.path()));
    assert_eq!(lexicon.count(), DEFAULT_TERMS.len() + 2);
    assert!(lexicon.detect("うるさい").matched);
}

#[test]
fn no_source_is_defaults() {
    assert_eq!(Lexicon::with_source(None).count(), DEFAULT_TERMS.len());
}

// Lexicon matcher: whole-token, case-insensitive multi-term matching.
//
// All terms are folded into a single regex alternation, one capture group per
// term, so a hit always resolves to the term as it was registered. Each
// alternative is wrapped in Unicode word boundaries on the sides where the term itself
// starts or ends with a word character, so "bad" never fires inside "badge"
// and a term ending in punctuation can still match.
//
// The compiled matcher is a pure function of the term set. Every mutation
// goes through `recompile`, so a stale matcher can never serve a query.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use regex::{Regex, RegexBuilder};
use tracing::{debug, error, info, warn};

use super::defaults::DEFAULT_TERMS;
use super::source::{load_source, LexiconSourceError};
use crate::output::truncate_chars;

/// Upper bound on compiled program size. Far above what a few thousand
/// short terms need.
const DEFAULT_COMPILE_LIMIT: usize = 32 * (1 << 20);

/// The denylist terms found in one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    /// Deduplicated lexicon terms, in sorted order.
    pub terms: BTreeSet<String>,
}

impl MatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_terms(terms: BTreeSet<String>) -> Self {
        Self {
            matched: !terms.is_empty(),
            terms,
        }
    }

    /// Matched terms as a sorted list, for reports and reason strings.
    pub fn sorted_terms(&self) -> Vec<String> {
        self.terms.iter().cloned().collect()
    }
}

/// A compiled alternation. Capture group `i + 1` belongs to `groups[i]`.
struct CompiledMatcher {
    regex: Regex,
    groups: Vec<String>,
}

enum MatcherState {
    /// No terms registered; nothing can match.
    Empty,
    Ready(CompiledMatcher),
    /// Compilation failed. Queries degrade to "no match" and log.
    Broken(String),
}

/// The denylist: a term set and the matcher derived from it.
///
/// Terms are unique ignoring case. The first spelling registered is the one
/// kept and reported.
pub struct Lexicon {
    terms: BTreeSet<String>,
    folded: HashSet<String>,
    matcher: MatcherState,
    compile_limit: usize,
}

impl Lexicon {
    /// A lexicon holding only the built-in default terms.
    pub fn new() -> Self {
        let mut lexicon = Self::empty();
        lexicon.extend(DEFAULT_TERMS.iter().map(|t| t.to_string()));
        lexicon
    }

    /// A lexicon with no terms at all.
    pub fn empty() -> Self {
        Self::with_compile_limit(DEFAULT_COMPILE_LIMIT)
    }

    /// An empty lexicon whose compiled matcher may not exceed `limit` bytes.
    pub fn with_compile_limit(limit: usize) -> Self {
        Self {
            terms: BTreeSet::new(),
            folded: HashSet::new(),
            matcher: MatcherState::Empty,
            compile_limit: limit,
        }
    }

    /// Default terms, plus whatever can be salvaged from `source`.
    ///
    /// A missing or malformed source is logged and otherwise ignored; the
    /// default terms are always usable.
    pub fn with_source(source: Option<&Path>) -> Self {
        let mut lexicon = Self::new();
        let Some(path) = source else {
            return lexicon;
        };

        match load_source(path) {
            Ok(parsed) => {
                if parsed.skipped > 0 {
                    error!(
                        path = %path.display(),
                        skipped = parsed.skipped,
                        "Lexicon source had unusable entries; keeping the rest"
                    );
                }
                let found = parsed.terms.len();
                let added = lexicon.extend(parsed.terms);
                info!(path = %path.display(), found, added, "Merged lexicon source");
            }
            Err(e @ LexiconSourceError::Missing(_)) => {
                warn!("{e}; continuing with default lexicon");
            }
            Err(e) => {
                error!("{e}; continuing with default lexicon");
            }
        }
        lexicon
    }

    /// Number of registered terms.
    pub fn count(&self) -> usize {
        self.terms.len()
    }

    /// Whether `term` is registered, in any casing.
    pub fn contains(&self, term: &str) -> bool {
        self.folded.contains(&fold(term.trim()))
    }

    /// Registered terms in sorted order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Whether the last compilation failed.
    pub fn is_degraded(&self) -> bool {
        matches!(self.matcher, MatcherState::Broken(_))
    }

    /// Add one term. Returns `true` if it was not already present.
    ///
    /// Blank terms are refused. Re-adding an existing term, in any casing,
    /// leaves the matcher untouched.
    pub fn add(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            warn!("Refusing to add a blank lexicon term");
            return false;
        }
        if !self.insert(term) {
            return false;
        }
        self.recompile();
        info!(term, total = self.terms.len(), "Added lexicon term");
        true
    }

    /// Add many terms with a single recompile. Returns how many were new.
    pub fn extend<I>(&mut self, terms: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.terms.len();
        for term in terms {
            let term = term.trim();
            if !term.is_empty() {
                self.insert(term);
            }
        }
        let added = self.terms.len() - before;
        if added > 0 {
            self.recompile();
        }
        added
    }

    /// Report which registered terms occur in `text` as whole tokens,
    /// ignoring case.
    pub fn detect(&self, text: &str) -> MatchResult {
        if text.trim().is_empty() {
            return MatchResult::none();
        }

        let compiled = match &self.matcher {
            MatcherState::Empty => return MatchResult::none(),
            MatcherState::Broken(reason) => {
                error!(
                    reason = %reason,
                    text_preview = %truncate_chars(text, 30),
                    "Lexicon matcher unavailable; treating text as unmatched"
                );
                return MatchResult::none();
            }
            MatcherState::Ready(compiled) => compiled,
        };

        let found: BTreeSet<String> = compiled
            .regex
            .captures_iter(text)
            .filter_map(|caps| {
                caps.iter()
                    .skip(1)
                    .position(|group| group.is_some())
                    .map(|index| compiled.groups[index].clone())
            })
            .collect();

        if !found.is_empty() {
            debug!(terms = ?found, "Lexicon terms detected");
        }
        MatchResult::from_terms(found)
    }

    fn insert(&mut self, term: &str) -> bool {
        if !self.folded.insert(fold(term)) {
            return false;
        }
        self.terms.insert(term.to_string());
        true
    }

    fn recompile(&mut self) {
        self.matcher = if self.terms.is_empty() {
            MatcherState::Empty
        } else {
            match compile(&self.terms, self.compile_limit) {
                Ok(compiled) => MatcherState::Ready(compiled),
                Err(e) => {
                    error!(
                        error = %e,
                        terms = self.terms.len(),
                        "Failed to compile lexicon matcher"
                    );
                    MatcherState::Broken(e.to_string())
                }
            }
        };
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the alternation for a term set.
///
/// Longer terms are tried first so that an overlapping shorter term cannot
/// shadow them at the same position.
fn compile(terms: &BTreeSet<String>, limit: usize) -> Result<CompiledMatcher, regex::Error> {
    let mut ordered: Vec<&String> = terms.iter().collect();
    ordered.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });

    let pattern = ordered
        .iter()
        .map(|term| format!("({})", bounded(term)))
        .collect::<Vec<_>>()
        .join("|");

    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .size_limit(limit)
        .build()?;

    let groups = ordered.into_iter().cloned().collect();
    Ok(CompiledMatcher { regex, groups })
}

/// Key under which terms are deduplicated.
fn fold(term: &str) -> String {
    term.to_lowercase()
}

/// Escape a term and anchor it on token boundaries.
fn bounded(term: &str) -> String {
    let starts_word = term.chars().next().is_some_and(is_word_char);
    let ends_word = term.chars().last().is_some_and(is_word_char);
    format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        regex::escape(term),
        if ends_word { r"\b" } else { "" },
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

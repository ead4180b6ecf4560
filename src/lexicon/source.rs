// External lexicon source: a JSON document whose `negative_words` field lists
// extra denylist terms.
//
// Loading is lenient. Entries that are not non-blank strings are skipped and
// counted, so a partly broken file still contributes its good entries.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// The one field we read from a lexicon source.
pub const NEGATIVE_WORDS_FIELD: &str = "negative_words";

#[derive(Debug, Error)]
pub enum LexiconSourceError {
    #[error("lexicon source not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read lexicon source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed lexicon source: {0}")]
    Malformed(String),
}

/// Terms recovered from a source, plus how many entries had to be dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTerms {
    pub terms: Vec<String>,
    pub skipped: usize,
}

/// Read and parse a lexicon source file.
pub fn load_source(path: &Path) -> Result<SourceTerms, LexiconSourceError> {
    let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LexiconSourceError::Missing(path.to_path_buf()),
        _ => LexiconSourceError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    parse_source(&raw)
}

/// Parse the JSON body of a lexicon source.
///
/// A document without `negative_words` yields no terms. A `negative_words`
/// value that is not an array, or a body that is not a JSON object, is
/// malformed.
pub fn parse_source(raw: &str) -> Result<SourceTerms, LexiconSourceError> {
    let doc: Value =
        serde_json::from_str(raw).map_err(|e| LexiconSourceError::Malformed(e.to_string()))?;

    let Some(object) = doc.as_object() else {
        return Err(LexiconSourceError::Malformed(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    let entries = match object.get(NEGATIVE_WORDS_FIELD) {
        None | Some(Value::Null) => return Ok(SourceTerms::default()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(LexiconSourceError::Malformed(format!(
                "`{NEGATIVE_WORDS_FIELD}` must be an array, found {}",
                json_kind(other)
            )))
        }
    };

    let mut out = SourceTerms::default();
    for entry in entries {
        match entry.as_str().map(str::trim) {
            Some(term) if !term.is_empty() => out.terms.push(term.to_string()),
            _ => out.skipped += 1,
        }
    }
    Ok(out)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

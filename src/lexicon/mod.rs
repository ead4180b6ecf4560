// Denylist lexicon: a set of disallowed terms compiled into one
// case-insensitive, token-bounded matcher.
//
// The term set ships with a built-in default list and can be extended from a
// JSON source file (`{"negative_words": [...]}`) or at runtime via `add`.

pub mod defaults;
pub mod matcher;
pub mod source;

pub use matcher::{Lexicon, MatchResult};

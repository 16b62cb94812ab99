pub mod annotator;
pub mod cli;
pub mod config;
pub mod dict;
pub mod document;
pub mod error;
pub mod oracle;

pub use annotator::{Annotator, ScanMode};
pub use config::Config;
pub use document::{Document, Workspace};
pub use error::{AnnotateError, OracleError};
pub use oracle::{DictionaryOracle, Lexicon};

use serde::{Deserialize, Serialize};

/// Menu label shown when the dictionary has no candidates for a word.
pub const NO_SUGGESTIONS_LABEL: &str = "No suggestions available";

/// Half-open `[start, end)` range of character offsets to highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text covered by this span, or `None` if it does not fit `text`.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        let range = annotator::tokenizer::byte_range(text, self.start, self.end)?;
        Some(&text[range])
    }
}

/// A word-like run extracted from a buffer snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Replacement candidates for a misspelled word, in oracle order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionSet {
    Candidates(Vec<String>),
    NoneAvailable,
}

impl SuggestionSet {
    pub fn from_candidates(candidates: Vec<String>) -> Self {
        if candidates.is_empty() {
            SuggestionSet::NoneAvailable
        } else {
            SuggestionSet::Candidates(candidates)
        }
    }

    /// Labels to render as menu entries.
    pub fn entries(&self) -> Vec<&str> {
        match self {
            SuggestionSet::Candidates(list) => list.iter().map(String::as_str).collect(),
            SuggestionSet::NoneAvailable => vec![NO_SUGGESTIONS_LABEL],
        }
    }

    pub fn candidates(&self) -> &[String] {
        match self {
            SuggestionSet::Candidates(list) => list,
            SuggestionSet::NoneAvailable => &[],
        }
    }

    pub fn is_none_available(&self) -> bool {
        matches!(self, SuggestionSet::NoneAvailable)
    }
}

/// A misspelled word under the cursor together with its replacement menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub word: String,
    pub span: Span,
    pub suggestions: SuggestionSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_slice_uses_char_offsets() {
        let text = "naïve teh";
        assert_eq!(Span::new(6, 9).slice(text), Some("teh"));
        assert_eq!(Span::new(0, 5).slice(text), Some("naïve"));
        assert_eq!(Span::new(6, 20).slice(text), None);
    }

    #[test]
    fn test_empty_candidates_become_sentinel() {
        let set = SuggestionSet::from_candidates(Vec::new());
        assert!(set.is_none_available());
        assert_eq!(set.entries(), vec![NO_SUGGESTIONS_LABEL]);
        assert!(set.candidates().is_empty());
    }
}

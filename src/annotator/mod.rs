pub mod tokenizer;

use crate::error::AnnotateError;
use crate::oracle::DictionaryOracle;
use crate::{Config, Correction, Span, SuggestionSet, Token};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tokenizer::CharCursor;
use tracing::{debug, trace, warn};

/// How misspelled tokens are turned into highlight spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Whitespace tokens; every literal occurrence of an unknown token is
    /// flagged, including occurrences inside longer words.
    #[default]
    Substring,
    /// Unicode word tokens with punctuation stripped; each unknown token is
    /// flagged only where it occurs.
    Words,
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "substring" => Ok(ScanMode::Substring),
            "words" => Ok(ScanMode::Words),
            _ => Err(format!("Unknown scan mode: {}", s)),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Substring => write!(f, "substring"),
            ScanMode::Words => write!(f, "words"),
        }
    }
}

/// Rules that exempt a token from checking before the oracle is asked.
#[derive(Debug, Default)]
struct TokenFilter {
    patterns: Vec<Regex>,
    skip_numbers: bool,
    min_len: usize,
}

impl TokenFilter {
    fn from_config(config: &Config) -> Self {
        let mut patterns = Vec::new();
        for pattern in &config.ignore_patterns {
            match Regex::new(pattern) {
                Ok(re) => patterns.push(re),
                Err(e) => warn!(%pattern, "skipping invalid ignore pattern: {}", e),
            }
        }

        Self {
            patterns,
            skip_numbers: config.skip_numbers,
            min_len: config.min_word_length,
        }
    }

    fn exempts(&self, token: &str) -> bool {
        if self.min_len > 0 && token.chars().count() < self.min_len {
            return true;
        }
        if self.skip_numbers && token.chars().all(|c| c.is_numeric()) {
            return true;
        }
        self.patterns.iter().any(|re| re.is_match(token))
    }
}

/// Stateless spellcheck annotation over buffer snapshots.
pub struct Annotator<O> {
    oracle: O,
    mode: ScanMode,
    filter: TokenFilter,
}

impl<O: DictionaryOracle> Annotator<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            mode: ScanMode::Substring,
            filter: TokenFilter::default(),
        }
    }

    pub fn from_config(oracle: O, config: &Config) -> Self {
        Self {
            oracle,
            mode: config.scan_mode,
            filter: TokenFilter::from_config(config),
        }
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Spans to highlight in `text`. The result replaces any earlier
    /// highlight state wholesale.
    pub fn annotate(&self, text: &str) -> Vec<Span> {
        let spans = match self.mode {
            ScanMode::Substring => self.annotate_substrings(text),
            ScanMode::Words => self.annotate_words(text),
        };
        debug!(mode = %self.mode, chars = text.chars().count(), flagged = spans.len(), "annotated");
        spans
    }

    /// Each distinct unknown token, in first-appearance order, contributes
    /// every non-overlapping literal occurrence scanning left to right.
    fn annotate_substrings(&self, text: &str) -> Vec<Span> {
        let tokens = tokenizer::whitespace_tokens(text);
        let mut spans = Vec::new();
        let mut seen = HashSet::new();

        for Token { text: token, .. } in &tokens {
            if !seen.insert(token.as_str()) || self.is_acceptable(token) {
                continue;
            }

            let width = token.chars().count();
            let mut cursor = CharCursor::new(text);
            for (byte_start, _) in text.match_indices(token.as_str()) {
                let start = cursor.advance_to(byte_start);
                spans.push(Span::new(start, start + width));
            }
        }

        spans
    }

    fn annotate_words(&self, text: &str) -> Vec<Span> {
        tokenizer::word_tokens(text)
            .into_iter()
            .filter(|token| !self.is_acceptable(&token.text))
            .map(|token| token.span())
            .collect()
    }

    fn is_acceptable(&self, token: &str) -> bool {
        if self.filter.exempts(token) {
            trace!(token, "exempt by filter");
            return true;
        }
        self.oracle.is_known(&token.to_lowercase())
    }

    /// The misspelled word at `cursor_offset` and its replacement menu, or
    /// `None` when there is no word there or the word is spelled correctly.
    pub fn suggestions_for(&self, text: &str, cursor_offset: usize) -> Option<Correction> {
        match self.correction_at(text, cursor_offset) {
            Ok(correction) => correction,
            Err(e) => {
                debug!("no suggestions: {}", e);
                None
            }
        }
    }

    fn correction_at(
        &self,
        text: &str,
        cursor_offset: usize,
    ) -> Result<Option<Correction>, AnnotateError> {
        Ok(self.correction_for(tokenizer::word_at(text, cursor_offset)?))
    }

    /// The correction for a flagged span. Punctuation around the word is left
    /// out, so `(teh)` resolves to `teh` rather than to the word before it.
    pub fn correction_within(&self, text: &str, span: Span) -> Option<Correction> {
        match tokenizer::word_within(text, span.start, span.end) {
            Ok(token) => self.correction_for(token),
            Err(e) => {
                debug!(start = span.start, end = span.end, "no word in span: {}", e);
                None
            }
        }
    }

    fn correction_for(&self, token: Token) -> Option<Correction> {
        let Token { text: word, start, end } = token;

        if self.is_acceptable(&word) {
            debug!(%word, "word is known");
            return None;
        }

        let candidates = self.oracle.suggest(&word.to_lowercase());
        Some(Correction {
            word,
            span: Span::new(start, end),
            suggestions: SuggestionSet::from_candidates(candidates),
        })
    }

    /// `text` with the chars in `[start, end)` replaced. An invalid range
    /// leaves the text unchanged.
    pub fn apply_replacement(&self, text: &str, start: usize, end: usize, replacement: &str) -> String {
        apply_replacement(text, start, end, replacement)
    }
}

/// Splice `replacement` into a copy of `text` over the char range
/// `[start, end)`.
pub fn apply_replacement(text: &str, start: usize, end: usize, replacement: &str) -> String {
    match splice(text, start, end, replacement) {
        Ok(spliced) => spliced,
        Err(e) => {
            warn!("replacement ignored: {}", e);
            text.to_string()
        }
    }
}

fn splice(text: &str, start: usize, end: usize, replacement: &str) -> Result<String, AnnotateError> {
    let range = tokenizer::byte_range(text, start, end).ok_or_else(|| AnnotateError::InvalidRange {
        start,
        end,
        len: text.chars().count(),
    })?;

    let mut spliced = String::with_capacity(text.len() - range.len() + replacement.len());
    spliced.push_str(&text[..range.start]);
    spliced.push_str(replacement);
    spliced.push_str(&text[range.end..]);
    Ok(spliced)
}

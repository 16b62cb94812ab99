//! Host-side buffer model: what an editor pane keeps between keystrokes.

use crate::annotator::{apply_replacement, Annotator};
use crate::oracle::DictionaryOracle;
use crate::{Correction, Span, SuggestionSet};
use rayon::prelude::*;
use tracing::debug;

/// One editable buffer and the highlights currently applied to it.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub name: String,
    text: String,
    highlights: Vec<Span>,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            highlights: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn highlights(&self) -> &[Span] {
        &self.highlights
    }

    /// Replace the buffer contents; highlights from the old text are dropped.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.highlights.clear();
    }

    /// Re-annotate the current snapshot, replacing all previous highlights.
    pub fn refresh<O: DictionaryOracle>(&mut self, annotator: &Annotator<O>) -> &[Span] {
        self.highlights = annotator.annotate(&self.text);
        &self.highlights
    }

    /// Edit then re-annotate, the path taken on every keystroke.
    pub fn edit<O: DictionaryOracle>(&mut self, annotator: &Annotator<O>, text: impl Into<String>) {
        self.set_text(text);
        self.refresh(annotator);
    }

    pub fn correction_at<O: DictionaryOracle>(
        &self,
        annotator: &Annotator<O>,
        offset: usize,
    ) -> Option<Correction> {
        annotator.suggestions_for(&self.text, offset)
    }

    pub fn correction_within<O: DictionaryOracle>(
        &self,
        annotator: &Annotator<O>,
        span: Span,
    ) -> Option<Correction> {
        annotator.correction_within(&self.text, span)
    }

    /// The first correctable highlight starting at or after `cursor`, in text
    /// order. Highlights with no misspelled word inside are passed over.
    pub fn next_correction<O: DictionaryOracle>(
        &self,
        annotator: &Annotator<O>,
        cursor: usize,
    ) -> Option<Correction> {
        let mut pending: Vec<Span> = self
            .highlights
            .iter()
            .copied()
            .filter(|span| span.start >= cursor)
            .collect();
        pending.sort_by_key(|span| (span.start, span.end));

        pending
            .into_iter()
            .find_map(|span| self.correction_within(annotator, span))
    }

    /// Replace the corrected word with `choice` and re-annotate. Choosing the
    /// "no suggestions" entry changes nothing. Returns whether the text changed.
    pub fn apply<O: DictionaryOracle>(
        &mut self,
        annotator: &Annotator<O>,
        correction: &Correction,
        choice: &str,
    ) -> bool {
        if matches!(correction.suggestions, SuggestionSet::NoneAvailable) {
            return false;
        }

        let spliced = apply_replacement(&self.text, correction.span.start, correction.span.end, choice);
        if spliced == self.text {
            return false;
        }

        debug!(doc = %self.name, word = %correction.word, %choice, "replaced");
        self.edit(annotator, spliced);
        true
    }

    /// Flagged words in highlight order.
    pub fn flagged_words(&self) -> Vec<&str> {
        self.highlights
            .iter()
            .filter_map(|span| span.slice(&self.text))
            .collect()
    }
}

/// Several independent documents sharing one annotator, like the panes of a
/// split editor.
#[derive(Debug, Default)]
pub struct Workspace {
    documents: Vec<Document>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, document: Document) -> usize {
        self.documents.push(document);
        self.documents.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Document> {
        self.documents.get_mut(index)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Annotate every document in parallel. Returns the total span count.
    pub fn refresh_all<O: DictionaryOracle>(&mut self, annotator: &Annotator<O>) -> usize {
        self.documents
            .par_iter_mut()
            .map(|doc| doc.refresh(annotator).len())
            .sum()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

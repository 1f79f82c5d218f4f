use crate::document::{compute_average_rating, DocumentData, DocumentId, DocumentStatus, Rating};
use crate::error::{Result, SearchError};
use crate::tokenizer::{is_valid_word, StopWords};
use rayon::prelude::*;
use std::collections::{btree_set, BTreeMap, BTreeSet, HashMap};
use std::iter::Copied;

/// Term -> frequency within one document. Sorted by term.
pub type WordFrequencies = BTreeMap<String, f64>;

/// Selects between the sequential and the rayon-backed form of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}

/// In-memory document index.
///
/// Holds a forward map (document -> term -> tf) and an inverted map
/// (term -> document -> tf). Both are private and only ever changed together by
/// [`SearchIndex::add_document`] and [`SearchIndex::remove_document`], so a
/// (term, document) pair is present in one exactly when it is present in the
/// other, with the same frequency.
///
/// There is no internal locking. Reads through `&self` may run in parallel;
/// mutation needs `&mut self`, so callers that share an index across threads
/// must wrap it in a lock.
#[derive(Debug, Default)]
pub struct SearchIndex {
    pub(crate) stop_words: StopWords,
    pub(crate) documents: HashMap<DocumentId, DocumentData>,
    pub(crate) document_ids: BTreeSet<DocumentId>,
    pub(crate) forward: HashMap<DocumentId, WordFrequencies>,
    pub(crate) inverted: HashMap<String, HashMap<DocumentId, f64>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stop_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self { stop_words: StopWords::new(words)?, ..Self::default() })
    }

    /// Build an index whose stop words are the space-separated words of `text`.
    pub fn with_stop_words_text(text: &str) -> Result<Self> {
        Ok(Self { stop_words: StopWords::from_text(text)?, ..Self::default() })
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Index a document. On error the index is left untouched.
    pub fn add_document(
        &mut self,
        id: DocumentId,
        text: &str,
        status: DocumentStatus,
        ratings: &[Rating],
    ) -> Result<()> {
        if id < 0 {
            return Err(SearchError::invalid_argument(format!("document id {id} is negative")));
        }
        if self.documents.contains_key(&id) {
            return Err(SearchError::invalid_argument(format!("document id {id} already exists")));
        }
        if !is_valid_word(text) {
            return Err(SearchError::invalid_argument(format!(
                "document {id} contains control characters"
            )));
        }

        let words = self.stop_words.split_no_stop(text)?;
        let inv_word_count = 1.0 / words.len() as f64;
        let mut freqs = WordFrequencies::new();
        for word in &words {
            *freqs.entry((*word).to_string()).or_insert(0.0) += inv_word_count;
            *self
                .inverted
                .entry((*word).to_string())
                .or_default()
                .entry(id)
                .or_insert(0.0) += inv_word_count;
        }

        tracing::debug!(id, words = words.len(), terms = freqs.len(), "added document");
        self.forward.insert(id, freqs);
        self.documents.insert(
            id,
            DocumentData { rating: compute_average_rating(ratings), status, text: text.to_string() },
        );
        self.document_ids.insert(id);
        Ok(())
    }

    /// Remove a document. Unknown ids are ignored.
    pub fn remove_document(&mut self, id: DocumentId) {
        self.remove_document_with_policy(ExecutionPolicy::Sequential, id);
    }

    pub fn remove_document_with_policy(&mut self, policy: ExecutionPolicy, id: DocumentId) {
        let Some(freqs) = self.forward.remove(&id) else {
            return;
        };
        self.documents.remove(&id);
        self.document_ids.remove(&id);

        match policy {
            ExecutionPolicy::Sequential => {
                for term in freqs.keys() {
                    if let Some(docs) = self.inverted.get_mut(term) {
                        docs.remove(&id);
                    }
                }
            }
            ExecutionPolicy::Parallel => {
                self.inverted
                    .par_iter_mut()
                    .filter(|(term, _)| freqs.contains_key(term.as_str()))
                    .for_each(|(_, docs)| {
                        docs.remove(&id);
                    });
            }
        }

        // Terms no document holds any more are dropped entirely.
        for term in freqs.keys() {
            if self.inverted.get(term).is_some_and(|docs| docs.is_empty()) {
                self.inverted.remove(term);
            }
        }
        tracing::debug!(id, terms = freqs.len(), "removed document");
    }

    pub fn get_word_frequencies(&self, id: DocumentId) -> Result<&WordFrequencies> {
        self.forward.get(&id).ok_or(SearchError::NotFound(id))
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn document_status(&self, id: DocumentId) -> Option<DocumentStatus> {
        self.documents.get(&id).map(|d| d.status)
    }

    pub fn document_rating(&self, id: DocumentId) -> Option<Rating> {
        self.documents.get(&id).map(|d| d.rating)
    }

    pub fn document_text(&self, id: DocumentId) -> Option<&str> {
        self.documents.get(&id).map(|d| d.text.as_str())
    }

    /// Ids of all indexed documents, ascending.
    pub fn iter(&self) -> Copied<btree_set::Iter<'_, DocumentId>> {
        self.document_ids.iter().copied()
    }

    /// Documents containing `term`, with its frequency in each. `None` when no
    /// document holds the term.
    pub(crate) fn postings(&self, term: &str) -> Option<&HashMap<DocumentId, f64>> {
        self.inverted.get(term).filter(|docs| !docs.is_empty())
    }

    /// ln(N / df). Only meaningful for terms with a non-empty postings list.
    pub(crate) fn inverse_document_freq(&self, docs_with_term: usize) -> f64 {
        (self.document_count() as f64 / docs_with_term as f64).ln()
    }
}

impl<'a> IntoIterator for &'a SearchIndex {
    type Item = DocumentId;
    type IntoIter = Copied<btree_set::Iter<'a, DocumentId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//! TF-IDF ranking over a [`SearchIndex`].

use crate::document::{Document, DocumentId, DocumentStatus, Rating};
use crate::error::{Result, SearchError};
use crate::index::{ExecutionPolicy, SearchIndex};
use crate::query::Query;
use crate::{MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON};
use rayon::prelude::*;
use std::collections::HashMap;

impl SearchIndex {
    /// Top documents with status [`DocumentStatus::Actual`].
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status(raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_with(raw_query, move |_, document_status, _| document_status == status)
    }

    /// Top documents accepted by `predicate(id, status, rating)`.
    pub fn find_top_documents_with<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocumentId, DocumentStatus, Rating) -> bool + Sync,
    {
        self.find_top_documents_with_policy(ExecutionPolicy::Sequential, raw_query, predicate)
    }

    /// Rank documents holding at least one plus term and no minus term, keep
    /// those the predicate accepts, and return at most
    /// [`MAX_RESULT_DOCUMENT_COUNT`] of them: relevance descending, then rating
    /// descending for relevances within [`RELEVANCE_EPSILON`], then id ascending.
    pub fn find_top_documents_with_policy<P>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>>
    where
        P: Fn(DocumentId, DocumentStatus, Rating) -> bool + Sync,
    {
        let query = self.parse_query(raw_query)?;
        let relevance = match policy {
            ExecutionPolicy::Sequential => self.find_all_documents(&query, &predicate),
            ExecutionPolicy::Parallel => self.find_all_documents_par(&query, &predicate),
        };

        let mut matched: Vec<Document> = relevance
            .into_iter()
            .filter_map(|(id, relevance)| {
                self.document_rating(id).map(|rating| Document { id, relevance, rating })
            })
            .collect();
        sort_by_rank(&mut matched);
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
        Ok(matched)
    }

    /// Plus terms of `raw_query` present in document `id`, sorted, and the
    /// document status. The term list is empty when any minus term is present.
    pub fn match_document<'a>(
        &'a self,
        raw_query: &str,
        id: DocumentId,
    ) -> Result<(Vec<&'a str>, DocumentStatus)> {
        self.match_document_with_policy(ExecutionPolicy::Sequential, raw_query, id)
    }

    pub fn match_document_with_policy<'a>(
        &'a self,
        policy: ExecutionPolicy,
        raw_query: &str,
        id: DocumentId,
    ) -> Result<(Vec<&'a str>, DocumentStatus)> {
        let query = self.parse_query(raw_query)?;
        let status = self.document_status(id).ok_or(SearchError::NotFound(id))?;

        let index: &'a SearchIndex = self;
        let holds = move |term: &str| index.postings(term).is_some_and(|docs| docs.contains_key(&id));
        let stored = move |term: &str| -> Option<&'a str> {
            index
                .inverted
                .get_key_value(term)
                .filter(|(_, docs)| docs.contains_key(&id))
                .map(|(stored, _)| stored.as_str())
        };

        let matched = match policy {
            ExecutionPolicy::Sequential => {
                if query.minus_terms.iter().any(|term| holds(*term)) {
                    Vec::new()
                } else {
                    query.plus_terms.iter().filter_map(|term| stored(*term)).collect()
                }
            }
            ExecutionPolicy::Parallel => {
                if query.minus_terms.par_iter().any(|term| holds(*term)) {
                    Vec::new()
                } else {
                    let mut words: Vec<&str> =
                        query.plus_terms.par_iter().filter_map(|term| stored(*term)).collect();
                    words.par_sort_unstable();
                    words
                }
            }
        };
        Ok((matched, status))
    }

    /// Relevance of a single document for the given plus terms. Terms no
    /// document holds contribute nothing.
    pub fn score<'q, I>(&self, id: DocumentId, plus_terms: I) -> f64
    where
        I: IntoIterator<Item = &'q str>,
    {
        plus_terms
            .into_iter()
            .filter_map(|term| {
                let docs = self.postings(term)?;
                let tf = docs.get(&id)?;
                Some(tf * self.inverse_document_freq(docs.len()))
            })
            .sum()
    }

    fn find_all_documents<P>(&self, query: &Query<'_>, predicate: &P) -> HashMap<DocumentId, f64>
    where
        P: Fn(DocumentId, DocumentStatus, Rating) -> bool + Sync,
    {
        let mut relevance: HashMap<DocumentId, f64> = HashMap::new();
        for term in &query.plus_terms {
            self.accumulate_term(term, predicate, &mut relevance);
        }
        self.exclude_minus_terms(query, &mut relevance);
        relevance
    }

    fn find_all_documents_par<P>(&self, query: &Query<'_>, predicate: &P) -> HashMap<DocumentId, f64>
    where
        P: Fn(DocumentId, DocumentStatus, Rating) -> bool + Sync,
    {
        let mut relevance = query
            .plus_terms
            .par_iter()
            .fold(HashMap::new, |mut acc, term| {
                self.accumulate_term(term, predicate, &mut acc);
                acc
            })
            .reduce(HashMap::new, |mut acc, part| {
                for (id, value) in part {
                    *acc.entry(id).or_insert(0.0) += value;
                }
                acc
            });
        self.exclude_minus_terms(query, &mut relevance);
        relevance
    }

    fn accumulate_term<P>(&self, term: &str, predicate: &P, relevance: &mut HashMap<DocumentId, f64>)
    where
        P: Fn(DocumentId, DocumentStatus, Rating) -> bool + Sync,
    {
        let Some(docs) = self.postings(term) else {
            return;
        };
        let idf = self.inverse_document_freq(docs.len());
        for (&id, &tf) in docs {
            let Some(data) = self.documents.get(&id) else {
                continue;
            };
            if predicate(id, data.status, data.rating) {
                *relevance.entry(id).or_insert(0.0) += tf * idf;
            }
        }
    }

    fn exclude_minus_terms(&self, query: &Query<'_>, relevance: &mut HashMap<DocumentId, f64>) {
        for term in &query.minus_terms {
            if let Some(docs) = self.postings(term) {
                for id in docs.keys() {
                    relevance.remove(id);
                }
            }
        }
    }
}

/// Order by relevance descending. Runs in which each neighbour is within
/// [`RELEVANCE_EPSILON`] of the previous one are then ordered by rating
/// descending and id ascending.
fn sort_by_rank(documents: &mut [Document]) {
    documents.sort_by(|a, b| {
        b.relevance
            .total_cmp(&a.relevance)
            .then(b.rating.cmp(&a.rating))
            .then(a.id.cmp(&b.id))
    });

    let mut start = 0;
    while start < documents.len() {
        let mut end = start + 1;
        while end < documents.len()
            && documents[end - 1].relevance - documents[end].relevance < RELEVANCE_EPSILON
        {
            end += 1;
        }
        documents[start..end].sort_by(|a, b| b.rating.cmp(&a.rating).then(a.id.cmp(&b.id)));
        start = end;
    }
}

//! Query language: space-separated terms, `-term` excludes documents holding
//! `term`. Terms borrow from the raw query text.

use crate::error::{Result, SearchError};
use crate::index::SearchIndex;
use crate::tokenizer::{is_valid_word, tokenize, StopWords};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWord<'a> {
    pub data: &'a str,
    pub is_minus: bool,
    pub is_stop: bool,
}

/// A validated query. Both sets are free of stop words and duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'a> {
    pub plus_terms: BTreeSet<&'a str>,
    pub minus_terms: BTreeSet<&'a str>,
}

pub fn parse_query_word<'a>(stop_words: &StopWords, token: &'a str) -> Result<QueryWord<'a>> {
    let (data, is_minus) = match token.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    if data.is_empty() {
        return Err(SearchError::invalid_argument(format!("query word {token:?} is empty")));
    }
    if data.starts_with('-') {
        return Err(SearchError::invalid_argument(format!(
            "query word {token:?} has more than one leading '-'"
        )));
    }
    if !is_valid_word(data) {
        return Err(SearchError::invalid_argument(format!(
            "query word {token:?} contains control characters"
        )));
    }
    Ok(QueryWord { data, is_minus, is_stop: stop_words.contains(data) })
}

pub fn parse_query<'a>(stop_words: &StopWords, text: &'a str) -> Result<Query<'a>> {
    let mut query = Query::default();
    for token in tokenize(text) {
        let word = parse_query_word(stop_words, token)?;
        if word.is_stop {
            continue;
        }
        if word.is_minus {
            query.minus_terms.insert(word.data);
        } else {
            query.plus_terms.insert(word.data);
        }
    }
    Ok(query)
}

impl SearchIndex {
    pub fn parse_query<'a>(&self, text: &'a str) -> Result<Query<'a>> {
        parse_query(&self.stop_words, text)
    }
}

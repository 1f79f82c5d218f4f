//! Batch query execution over a shared, read-only index.

use crate::document::Document;
use crate::error::Result;
use crate::index::SearchIndex;
use rayon::prelude::*;

/// Run [`SearchIndex::find_top_documents`] for each query in parallel.
/// `result[i]` answers `queries[i]`; the first parse failure fails the batch.
pub fn process_queries<S>(index: &SearchIndex, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    tracing::debug!(queries = queries.len(), "processing query batch");
    queries
        .par_iter()
        .map(|query| index.find_top_documents(query.as_ref()))
        .collect()
}

/// Like [`process_queries`], flattened in query order.
pub fn process_queries_joined<S>(index: &SearchIndex, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(index, queries)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentStatus, SearchError};

    fn index() -> SearchIndex {
        let mut index = SearchIndex::with_stop_words_text("and with").unwrap();
        let texts = [
            "funny pet and nasty rat",
            "funny pet with curly hair",
            "funny pet and not very nasty rat",
            "pet with rat and rat and rat",
            "nasty rat with curly hair",
        ];
        for (id, text) in texts.iter().enumerate() {
            index.add_document(id as i32 + 1, text, DocumentStatus::Actual, &[1, 2]).unwrap();
        }
        index
    }

    #[test]
    fn keeps_positional_correspondence() {
        let index = index();
        let queries = ["nasty rat -not", "not very funny nasty pet", "curly hair"];
        let results = process_queries(&index, &queries).unwrap();
        assert_eq!(results.len(), 3);
        for (query, result) in queries.iter().zip(&results) {
            assert_eq!(result, &index.find_top_documents(query).unwrap());
        }
    }

    #[test]
    fn joined_is_concatenation() {
        let index = index();
        let queries = vec!["nasty rat -not".to_string(), "curly hair".to_string()];
        let per_query = process_queries(&index, &queries).unwrap();
        let joined = process_queries_joined(&index, &queries).unwrap();
        assert_eq!(joined.len(), per_query.iter().map(Vec::len).sum::<usize>());
        assert_eq!(joined, per_query.concat());
    }

    #[test]
    fn one_bad_query_fails_batch() {
        let index = index();
        let result = process_queries(&index, &["rat", "--rat"]);
        assert!(matches!(result, Err(SearchError::InvalidArgument(_))));
    }
}

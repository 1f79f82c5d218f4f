use crate::document::DocumentId;
use crate::index::SearchIndex;
use std::collections::HashSet;

/// Remove every document whose set of distinct terms equals that of a
/// document with a lower id. Returns the removed ids, ascending.
pub fn remove_duplicates(index: &mut SearchIndex) -> Vec<DocumentId> {
    let duplicates = find_duplicates(index);
    for &id in &duplicates {
        tracing::info!(id, "found duplicate document");
        index.remove_document(id);
    }
    duplicates
}

/// Ids that [`remove_duplicates`] would remove, without touching the index.
pub fn find_duplicates(index: &SearchIndex) -> Vec<DocumentId> {
    let mut seen: HashSet<Vec<&str>> = HashSet::new();
    let mut duplicates = Vec::new();
    for id in index {
        // Keys of a word-frequency map are already sorted.
        let signature: Vec<&str> = match index.get_word_frequencies(id) {
            Ok(freqs) => freqs.keys().map(String::as_str).collect(),
            Err(_) => continue,
        };
        if !seen.insert(signature) {
            duplicates.push(id);
        }
    }
    duplicates
}

use crate::error::{Result, SearchError};
use std::collections::HashSet;

/// Split text into words on runs of spaces. Other characters, including tabs
/// and newlines, stay inside words so validation can reject them.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(' ').filter(|w| !w.is_empty())
}

/// A word is valid when it holds no control characters (anything below ' ').
pub fn is_valid_word(word: &str) -> bool {
    !word.chars().any(|c| c < ' ')
}

/// Terms excluded from both indexing and querying. Fixed once built.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for word in words {
            let word = word.as_ref();
            if !is_valid_word(word) {
                return Err(SearchError::invalid_argument(format!(
                    "stop word {word:?} contains control characters"
                )));
            }
            if !word.is_empty() {
                set.insert(word.to_string());
            }
        }
        Ok(Self { words: set })
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Self::new(tokenize(text))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Tokenize `text`, failing on any invalid word, and drop stop words.
    pub fn split_no_stop<'a>(&self, text: &'a str) -> Result<Vec<&'a str>> {
        let mut words = Vec::new();
        for word in tokenize(text) {
            if !is_valid_word(word) {
                return Err(SearchError::invalid_argument(format!(
                    "word {word:?} contains control characters"
                )));
            }
            if !self.contains(word) {
                words.push(word);
            }
        }
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_space_runs() {
        let words: Vec<&str> = tokenize("  cat   in the  city ").collect();
        assert_eq!(words, vec!["cat", "in", "the", "city"]);
    }

    #[test]
    fn tabs_are_not_separators() {
        let words: Vec<&str> = tokenize("cat\tdog").collect();
        assert_eq!(words, vec!["cat\tdog"]);
        assert!(!is_valid_word(words[0]));
    }

    #[test]
    fn stop_words_drop_empty_and_reject_control() {
        let stop = StopWords::new(["in", "", "the"]).unwrap();
        assert_eq!(stop.len(), 2);
        assert!(StopWords::new(["ba\u{1}d"]).is_err());
    }

    #[test]
    fn split_no_stop_filters() {
        let stop = StopWords::from_text("in the").unwrap();
        assert_eq!(stop.split_no_stop("cat in the city").unwrap(), vec!["cat", "city"]);
        assert!(stop.split_no_stop("cat\u{7}").is_err());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

pub type DocumentId = i32;
pub type Rating = i32;

/// Caller-assigned tag carried by each document. The index gives it no meaning
/// beyond filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    #[default]
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "actual" => Ok(Self::Actual),
            "irrelevant" => Ok(Self::Irrelevant),
            "banned" => Ok(Self::Banned),
            "removed" => Ok(Self::Removed),
            other => Err(format!("unknown document status: {other}")),
        }
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Document {
    pub id: DocumentId,
    pub relevance: f64,
    pub rating: Rating,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}

/// Stored per-document metadata.
#[derive(Debug, Clone)]
pub(crate) struct DocumentData {
    pub rating: Rating,
    pub status: DocumentStatus,
    pub text: String,
}

/// Integer mean of `ratings`, truncated toward zero; zero when empty.
pub fn compute_average_rating(ratings: &[Rating]) -> Rating {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
    (sum / ratings.len() as i64) as Rating
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rating_truncates_toward_zero() {
        assert_eq!(compute_average_rating(&[10, 11, 3]), 8);
        assert_eq!(compute_average_rating(&[-9, -10, -4]), -7);
        assert_eq!(compute_average_rating(&[9, 10, -4]), 5);
        assert_eq!(compute_average_rating(&[]), 0);
    }

    #[test]
    fn display_matches_result_format() {
        let doc = Document { id: 7, relevance: 0.5, rating: 3 };
        assert_eq!(doc.to_string(), "{ document_id = 7, relevance = 0.5, rating = 3 }");
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("BANNED".parse::<DocumentStatus>().unwrap(), DocumentStatus::Banned);
        assert_eq!("actual".parse::<DocumentStatus>().unwrap(), DocumentStatus::Actual);
        assert!("gone".parse::<DocumentStatus>().is_err());
    }
}

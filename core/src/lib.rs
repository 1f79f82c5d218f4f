pub mod corpus;
pub mod dedup;
pub mod document;
pub mod error;
pub mod index;
pub mod log_duration;
pub mod process;
pub mod query;
pub mod ranking;
pub mod request_queue;
pub mod tokenizer;

pub use dedup::remove_duplicates;
pub use document::{Document, DocumentId, DocumentStatus, Rating};
pub use error::{Result, SearchError};
pub use index::{ExecutionPolicy, SearchIndex, WordFrequencies};
pub use process::{process_queries, process_queries_joined};
pub use request_queue::RequestQueue;

/// Upper bound on the number of documents a single search returns.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevances closer than this are considered equal and ranked by rating.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

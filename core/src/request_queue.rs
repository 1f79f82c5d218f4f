use crate::document::{Document, DocumentId, DocumentStatus, Rating};
use crate::error::Result;
use crate::index::SearchIndex;
use std::collections::VecDeque;

/// Length of the request history window, in logical time units (minutes in a day).
pub const REQUEST_WINDOW: u64 = 1440;

#[derive(Debug, Clone, Copy)]
struct QueryResult {
    timestamp: u64,
    result_count: usize,
}

/// Searches through a borrowed index while remembering how many of the
/// requests inside the trailing [`REQUEST_WINDOW`] returned nothing. Every
/// request advances the clock by one unit.
#[derive(Debug)]
pub struct RequestQueue<'a> {
    index: &'a SearchIndex,
    requests: VecDeque<QueryResult>,
    current_time: u64,
    no_result_requests: usize,
}

impl<'a> RequestQueue<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self { index, requests: VecDeque::new(), current_time: 0, no_result_requests: 0 }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        let result = self.index.find_top_documents(raw_query)?;
        self.add_request(result.len());
        Ok(result)
    }

    pub fn add_find_request_by_status(
        &mut self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        let result = self.index.find_top_documents_by_status(raw_query, status)?;
        self.add_request(result.len());
        Ok(result)
    }

    pub fn add_find_request_with<P>(&mut self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocumentId, DocumentStatus, Rating) -> bool + Sync,
    {
        let result = self.index.find_top_documents_with(raw_query, predicate)?;
        self.add_request(result.len());
        Ok(result)
    }

    /// Requests inside the window that produced no documents.
    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    fn add_request(&mut self, result_count: usize) {
        self.current_time += 1;
        while let Some(oldest) = self.requests.front() {
            if self.current_time - oldest.timestamp < REQUEST_WINDOW {
                break;
            }
            if oldest.result_count == 0 {
                self.no_result_requests -= 1;
            }
            self.requests.pop_front();
        }
        self.requests.push_back(QueryResult { timestamp: self.current_time, result_count });
        if result_count == 0 {
            self.no_result_requests += 1;
        }
    }
}

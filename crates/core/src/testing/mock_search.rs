//! Mock title search for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Duration;

use crate::search::{SearchError, TitleCandidate, TitleSearch};

/// Mock implementation of the `TitleSearch` trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable candidate lists
/// - Script a sequence of errors ahead of successful responses
/// - Simulate slow responses
/// - Track queries for assertions
#[derive(Debug, Default)]
pub struct MockTitleSearch {
    /// Candidates returned by successful searches.
    candidates: Arc<RwLock<Vec<TitleCandidate>>>,
    /// Errors consumed one per call before responses succeed.
    error_script: Arc<RwLock<VecDeque<SearchError>>>,
    /// Recorded query strings.
    queries: Arc<RwLock<Vec<String>>>,
    /// Artificial response latency.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockTitleSearch {
    /// Create a new mock with no candidates configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidates returned by successful searches.
    pub async fn set_candidates(&self, candidates: Vec<TitleCandidate>) {
        *self.candidates.write().await = candidates;
    }

    /// Queue an error; each queued error fails exactly one search call, in
    /// order, before successful responses resume.
    pub async fn push_error(&self, error: SearchError) {
        self.error_script.write().await.push_back(error);
    }

    /// Add artificial latency to every search call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Get all recorded query strings.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Number of search calls performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }
}

#[async_trait]
impl TitleSearch for MockTitleSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<TitleCandidate>, SearchError> {
        self.queries.write().await.push(query.to_string());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.error_script.write().await.pop_front() {
            return Err(err);
        }

        Ok(self.candidates.read().await.clone())
    }
}

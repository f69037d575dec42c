//! Remote title-search abstraction.
//!
//! This module provides a `TitleSearch` trait for querying a remote title
//! catalog, plus the HTTP-backed implementation used in production. The
//! resolver only ever sees `TitleCandidate` rows; everything API-specific
//! stays behind the trait.

mod http;
mod types;

pub use http::{HttpSearchClient, SearchConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying the remote title search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Could not reach the search endpoint.
    #[error("Search backend connection failed: {0}")]
    Connection(String),

    /// The request exceeded its deadline.
    #[error("Request timeout")]
    Timeout,

    /// The server answered 429.
    #[error("Rate limited by search backend")]
    RateLimited,

    /// The server answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchError {
    /// Whether this error is worth retrying at all.
    ///
    /// Rate limits and transport problems are transient; a malformed response
    /// or an explicit API error will not improve on a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::Connection(_) | SearchError::Timeout | SearchError::RateLimited
        )
    }
}

/// Trait for remote title-search backends.
#[async_trait]
pub trait TitleSearch: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Search the catalog for titles matching the free-text query.
    ///
    /// The query is sent as scraped from the page, not normalized; the
    /// remote search does its own tokenization.
    async fn search_titles(&self, query: &str) -> Result<Vec<TitleCandidate>, SearchError>;
}

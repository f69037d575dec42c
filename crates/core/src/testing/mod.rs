//! Testing utilities and mock implementations.
//!
//! Mock implementations of the external seams (`TitleSearch`,
//! `KeyValueStore`) with controllable behavior, so the whole pipeline can be
//! exercised without network or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use screenrate_core::testing::{fixtures, MockTitleSearch};
//!
//! let search = MockTitleSearch::new();
//! search.set_candidates(vec![fixtures::series("Stranger Things", 8.7, 1_200_000)]).await;
//! search.push_error(SearchError::RateLimited).await; // first call 429s
//! ```

mod mock_search;
mod mock_store;

pub use mock_search::MockTitleSearch;
pub use mock_store::MockStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::search::{TitleCandidate, TitleType};

    /// Create a candidate with explicit type, rating and votes.
    pub fn candidate(
        title: &str,
        title_type: Option<TitleType>,
        rating: Option<f32>,
        votes: Option<u64>,
    ) -> TitleCandidate {
        TitleCandidate {
            title: title.to_string(),
            primary_title: None,
            title_type,
            rating,
            votes,
        }
    }

    /// Create a rated movie candidate.
    pub fn movie(title: &str, rating: f32, votes: u64) -> TitleCandidate {
        candidate(title, Some(TitleType::Movie), Some(rating), Some(votes))
    }

    /// Create a rated series candidate.
    pub fn series(title: &str, rating: f32, votes: u64) -> TitleCandidate {
        candidate(title, Some(TitleType::Series), Some(rating), Some(votes))
    }

    /// Create a candidate with no rating data at all.
    pub fn unrated(title: &str, title_type: Option<TitleType>) -> TitleCandidate {
        candidate(title, title_type, None, None)
    }
}

//! Types for the resolution pipeline.

use serde::{Deserialize, Serialize};

use crate::matcher::MatchOutcome;
use crate::search::TitleType;

/// A title lookup request, as extracted from a page.
#[derive(Debug, Clone)]
pub struct TitleQuery {
    /// Raw title string from the DOM. Not trimmed or normalized; the remote
    /// search sees it verbatim.
    pub title: String,
    /// Optional content-type hint from the page context.
    pub expected_type: Option<TitleType>,
}

impl TitleQuery {
    pub fn new(title: impl Into<String>, expected_type: Option<TitleType>) -> Self {
        Self {
            title: title.into(),
            expected_type,
        }
    }

    /// Deterministic cache/coalescing key: lowercased title plus a type tag.
    ///
    /// The key is used literally, never hashed, so equal (title, type) pairs
    /// share one entry and distinct pairs cannot collide.
    pub fn normalized_key(&self) -> String {
        let tag = self
            .expected_type
            .map(|t| t.as_tag())
            .unwrap_or("unknown");
        format!("{}_{}", self.title.to_lowercase(), tag)
    }
}

/// A resolved rating, ready for display. This is the unit that gets cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRating {
    /// Rating formatted to one decimal, e.g. "8.7".
    pub score: String,
    /// Vote count with magnitude suffix, e.g. "1.2M", "45.1K", "340".
    pub votes: String,
    /// Similarity score the match was accepted with.
    pub confidence: f32,
    /// The catalog title that matched.
    pub matched_title: String,
    /// Catalog type tag of the match, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_type: Option<String>,
}

impl ResolvedRating {
    /// Build a displayable rating from an accepted match.
    pub fn from_match(outcome: &MatchOutcome) -> Self {
        let candidate = &outcome.candidate;
        Self {
            score: format_score(candidate.rating.unwrap_or(0.0)),
            votes: format_votes(candidate.votes.unwrap_or(0)),
            confidence: outcome.score,
            matched_title: candidate.display_title().to_string(),
            title_type: candidate.title_type.map(|t| t.as_tag().to_string()),
        }
    }
}

/// Format a rating to one decimal place.
pub fn format_score(score: f32) -> String {
    format!("{:.1}", score)
}

/// Format a vote count with a magnitude suffix: millions and thousands get
/// one decimal, anything below is printed as-is.
pub fn format_votes(votes: u64) -> String {
    if votes >= 1_000_000 {
        format!("{:.1}M", votes as f64 / 1_000_000.0)
    } else if votes >= 1_000 {
        format!("{:.1}K", votes as f64 / 1_000.0)
    } else {
        votes.to_string()
    }
}

//! Types for the title search system.

use serde::{Deserialize, Serialize};

/// Content type of a catalog entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TitleType {
    Movie,
    Series,
}

impl TitleType {
    /// Stable tag used in cache keys and cached payloads.
    pub fn as_tag(&self) -> &'static str {
        match self {
            TitleType::Movie => "movie",
            TitleType::Series => "series",
        }
    }

    /// Map a catalog type string ("movie", "tvSeries", "tvMiniSeries", ...)
    /// to a `TitleType`. Unknown tags map to `None` rather than erroring.
    pub fn from_catalog_tag(tag: &str) -> Option<Self> {
        let lower = tag.to_lowercase();
        if lower.contains("series") {
            Some(TitleType::Series)
        } else if lower.contains("movie") {
            Some(TitleType::Movie)
        } else {
            None
        }
    }
}

/// One row from the remote search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleCandidate {
    /// Generic display title.
    pub title: String,
    /// Primary title, when the catalog distinguishes one. Preferred over
    /// `title` for similarity scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_title: Option<String>,
    /// Content type, if the catalog tagged one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_type: Option<TitleType>,
    /// Aggregate rating in [0, 10], if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Vote count backing the rating, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<u64>,
}

impl TitleCandidate {
    /// Title used for similarity scoring: the primary title when present,
    /// otherwise the generic one.
    pub fn display_title(&self) -> &str {
        self.primary_title.as_deref().unwrap_or(&self.title)
    }

    /// A candidate is only useful if it carries a positive aggregate rating;
    /// a perfect title match with no rating still renders no badge.
    pub fn has_usable_rating(&self) -> bool {
        matches!(self.rating, Some(r) if r > 0.0)
    }
}

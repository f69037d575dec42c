//! HTTP title-search client.
//!
//! Talks to an IMDb-style title search endpoint:
//! `GET <base_url>/search/titles?query=<url-encoded query>`.
//! Missing optional fields in the response (type, rating, votes) are carried
//! through as `None`; the matcher decides what to do with rating-less rows.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{TitleCandidate, TitleType};
use super::{SearchError, TitleSearch};

/// HTTP search client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional API key appended as a query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 5).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.imdbapi.dev".to_string()
}

fn default_timeout() -> u64 {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// HTTP-backed title search client.
pub struct HttpSearchClient {
    client: Client,
    config: SearchConfig,
}

impl HttpSearchClient {
    /// Create a new client.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn build_search_url(&self, query: &str) -> String {
        let mut url = format!(
            "{}/search/titles?query={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        if let Some(key) = &self.config.api_key {
            url.push_str(&format!("&apikey={}", urlencoding::encode(key)));
        }

        url
    }
}

#[async_trait]
impl TitleSearch for HttpSearchClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<TitleCandidate>, SearchError> {
        let url = self.build_search_url(query);

        debug!("Title search: query='{}'", query);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else {
                SearchError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if status == 429 {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let search_result: TitleSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("Failed to parse search response: {}", e)))?;

        let candidates: Vec<TitleCandidate> = search_result
            .titles
            .into_iter()
            .map(|r| r.into())
            .collect();

        debug!("Title search returned {} candidates", candidates.len());

        Ok(candidates)
    }
}

// ============================================================================
// API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TitleSearchResponse {
    #[serde(default)]
    titles: Vec<TitleRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitleRow {
    #[serde(rename = "type")]
    title_type: Option<String>,
    primary_title: Option<String>,
    original_title: Option<String>,
    rating: Option<RatingRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingRow {
    aggregate_rating: Option<f32>,
    vote_count: Option<u64>,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<TitleRow> for TitleCandidate {
    fn from(r: TitleRow) -> Self {
        let title = r
            .primary_title
            .clone()
            .or(r.original_title)
            .unwrap_or_default();

        Self {
            title,
            primary_title: r.primary_title,
            title_type: r.title_type.as_deref().and_then(TitleType::from_catalog_tag),
            rating: r.rating.as_ref().and_then(|x| x.aggregate_rating),
            votes: r.rating.as_ref().and_then(|x| x.vote_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_url_encodes_query() {
        let client = HttpSearchClient::new(SearchConfig {
            base_url: "https://api.example.com/".to_string(),
            api_key: None,
            timeout_secs: 5,
        })
        .unwrap();

        let url = client.build_search_url("Spider-Man: Homecoming");
        assert_eq!(
            url,
            "https://api.example.com/search/titles?query=Spider-Man%3A%20Homecoming"
        );
    }

    #[test]
    fn test_build_search_url_with_api_key() {
        let client = HttpSearchClient::new(SearchConfig {
            base_url: "https://api.example.com".to_string(),
            api_key: Some("secret key".to_string()),
            timeout_secs: 5,
        })
        .unwrap();

        let url = client.build_search_url("dark");
        assert!(url.ends_with("query=dark&apikey=secret%20key"));
    }

    #[test]
    fn test_row_conversion_full() {
        let row: TitleRow = serde_json::from_str(
            r#"{
                "type": "tvSeries",
                "primaryTitle": "Stranger Things",
                "originalTitle": "Stranger Things",
                "rating": { "aggregateRating": 8.7, "voteCount": 1200000 }
            }"#,
        )
        .unwrap();

        let candidate: TitleCandidate = row.into();
        assert_eq!(candidate.title, "Stranger Things");
        assert_eq!(candidate.title_type, Some(TitleType::Series));
        assert_eq!(candidate.rating, Some(8.7));
        assert_eq!(candidate.votes, Some(1_200_000));
    }

    #[test]
    fn test_row_conversion_missing_rating() {
        let row: TitleRow = serde_json::from_str(
            r#"{ "type": "movie", "primaryTitle": "Obscure Film" }"#,
        )
        .unwrap();

        let candidate: TitleCandidate = row.into();
        assert_eq!(candidate.title, "Obscure Film");
        assert_eq!(candidate.title_type, Some(TitleType::Movie));
        assert!(candidate.rating.is_none());
        assert!(candidate.votes.is_none());
        assert!(!candidate.has_usable_rating());
    }

    #[test]
    fn test_row_conversion_falls_back_to_original_title() {
        let row: TitleRow = serde_json::from_str(
            r#"{ "originalTitle": "La Casa de Papel" }"#,
        )
        .unwrap();

        let candidate: TitleCandidate = row.into();
        assert_eq!(candidate.title, "La Casa de Papel");
        assert!(candidate.primary_title.is_none());
        assert!(candidate.title_type.is_none());
    }

    #[test]
    fn test_response_parsing_empty_body() {
        let parsed: TitleSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.titles.is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.base_url, "https://api.imdbapi.dev");
        assert_eq!(config.timeout_secs, 5);
        assert!(config.api_key.is_none());
    }
}

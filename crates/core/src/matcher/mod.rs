//! Candidate selection for title queries.
//!
//! Given the candidates returned by the remote search, pick the one whose
//! title best matches the scraped query and gate it behind a minimum
//! confidence. No side effects; the resolver decides what to do with the
//! outcome.

use serde::{Deserialize, Serialize};

use crate::search::{TitleCandidate, TitleType};
use crate::similarity::similarity;

/// Configuration for the match selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum similarity score for a candidate to be accepted (0.0-1.0).
    #[serde(default = "default_min_match_score")]
    pub min_match_score: f32,
}

fn default_min_match_score() -> f32 {
    0.7
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_match_score: default_min_match_score(),
        }
    }
}

/// An accepted candidate with its confidence score.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub candidate: TitleCandidate,
    pub score: f32,
}

/// Pick the best candidate for a query, or `None` if nothing clears the gate.
///
/// The expected type is a soft preference: when filtering by it would leave
/// no candidates, the unfiltered list is scored instead. Ties keep the
/// first-seen candidate, so remote ranking breaks them. A winning candidate
/// without a usable rating is rejected outright.
pub fn select_best_match(
    query: &str,
    candidates: &[TitleCandidate],
    expected_type: Option<TitleType>,
    config: &MatcherConfig,
) -> Option<MatchOutcome> {
    if candidates.is_empty() {
        return None;
    }

    let filtered: Vec<&TitleCandidate> = match expected_type {
        Some(expected) => {
            let typed: Vec<&TitleCandidate> = candidates
                .iter()
                .filter(|c| c.title_type == Some(expected))
                .collect();
            if typed.is_empty() {
                candidates.iter().collect()
            } else {
                typed
            }
        }
        None => candidates.iter().collect(),
    };

    let mut best: Option<(usize, f32)> = None;
    for (i, candidate) in filtered.iter().enumerate() {
        let score = similarity(query, candidate.display_title());
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((i, score)),
        }
    }

    let (index, score) = best?;
    if score < config.min_match_score {
        return None;
    }

    let candidate = filtered[index];
    if !candidate.has_usable_rating() {
        return None;
    }

    Some(MatchOutcome {
        candidate: candidate.clone(),
        score,
    })
}

//! Prometheus metrics for the resolution pipeline.
//!
//! Covers the full lookup funnel: cache hits, scheduler retries, remote
//! search behavior and match confidence.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts};

/// Lookups by outcome.
pub static LOOKUPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("screenrate_lookups_total", "Total rating lookups"),
        &["outcome"], // "cache_hit", "matched", "no_match", "error", "rejected"
    )
    .unwrap()
});

/// Cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("screenrate_cache_lookups_total", "Total rating cache lookups"),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

/// Scheduler retries by reason.
pub static SEARCH_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("screenrate_search_retries_total", "Total search retry attempts"),
        &["reason"], // "rate_limited", "transport"
    )
    .unwrap()
});

/// End-to-end duration of a scheduled search call, including pacing waits
/// and retries.
pub static SEARCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "screenrate_search_duration_seconds",
            "Duration of scheduled search calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

/// Candidates returned per search.
pub static SEARCH_CANDIDATES: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "screenrate_search_candidates",
            "Number of candidates returned per search",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0]),
    )
    .unwrap()
});

/// Confidence scores of accepted matches.
pub static MATCH_CONFIDENCE: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "screenrate_match_confidence",
            "Distribution of accepted match confidence scores",
        )
        .buckets(vec![0.7, 0.75, 0.8, 0.85, 0.9, 0.95, 1.0]),
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(LOOKUPS_TOTAL.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(SEARCH_RETRIES.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(SEARCH_CANDIDATES.clone()),
        Box::new(MATCH_CONFIDENCE.clone()),
    ]
}

//! Rating resolution pipeline.
//!
//! `RatingResolver` is the public entry point: it ties the cache, the
//! rate-limited scheduler, the remote search and the match selector together
//! into one `resolve(query) -> Option<ResolvedRating>` operation. All shared
//! state lives in this one struct; constructing a second resolver gives a
//! fully isolated pipeline.
//!
//! Failures never escape as errors. Whatever goes wrong downstream, the
//! caller sees `None` and the page simply shows no badge.

mod types;

pub use types::{format_score, format_votes, ResolvedRating, TitleQuery};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::cache::{KeyValueStore, RatingCache};
use crate::config::Config;
use crate::matcher::{select_best_match, MatcherConfig};
use crate::metrics;
use crate::scheduler::SearchScheduler;
use crate::search::TitleSearch;

/// Progress of an in-flight lookup, broadcast to coalesced waiters.
#[derive(Debug, Clone)]
enum LookupState {
    Pending,
    Done(Option<ResolvedRating>),
}

/// The resolution orchestrator.
pub struct RatingResolver {
    matcher_config: MatcherConfig,
    scheduler: SearchScheduler,
    search: Arc<dyn TitleSearch>,
    cache: RatingCache,
    /// One entry per key with a lookup on the wire. Concurrent callers for
    /// the same key join the first caller's request instead of issuing
    /// their own.
    in_flight: Mutex<HashMap<String, watch::Receiver<LookupState>>>,
}

impl RatingResolver {
    /// Create a resolver: loads (and sweeps) the persisted cache, then wires
    /// the scheduler and matcher from config.
    pub async fn new(
        config: Config,
        search: Arc<dyn TitleSearch>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let cache = RatingCache::load(config.cache, store).await;

        Self {
            matcher_config: config.matcher,
            scheduler: SearchScheduler::new(config.scheduler),
            search,
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a title query to a displayable rating.
    ///
    /// Cache hits return without touching the network. Misses go through the
    /// scheduler to the remote search, then through the match selector; an
    /// accepted match is cached and returned. Negative outcomes are not
    /// cached, so a later catalog update can surface a match without waiting
    /// out the TTL.
    pub async fn resolve(&self, query: &TitleQuery) -> Option<ResolvedRating> {
        if query.title.trim().is_empty() {
            metrics::LOOKUPS_TOTAL.with_label_values(&["rejected"]).inc();
            return None;
        }

        let key = query.normalized_key();

        if let Some(rating) = self.cache.get(&key).await {
            debug!(key = key.as_str(), "Rating cache hit");
            metrics::CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
            metrics::LOOKUPS_TOTAL.with_label_values(&["cache_hit"]).inc();
            return Some(rating);
        }
        metrics::CACHE_LOOKUPS.with_label_values(&["miss"]).inc();

        // Coalesce: the first caller for a key runs the lookup, everyone
        // else waits on its watch channel.
        let publisher = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(&key) {
                Some(rx) => {
                    let rx = rx.clone();
                    drop(in_flight);
                    debug!(key = key.as_str(), "Joining in-flight lookup");
                    return self.await_outcome(&key, rx).await;
                }
                None => {
                    let (tx, rx) = watch::channel(LookupState::Pending);
                    in_flight.insert(key.clone(), rx);
                    tx
                }
            }
        };

        let outcome = self.lookup(query, &key).await;

        self.in_flight.lock().await.remove(&key);
        let _ = publisher.send(LookupState::Done(outcome.clone()));

        outcome
    }

    /// Clear the cached ratings (the user-facing cache reset).
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Number of cached entries.
    pub async fn cache_size(&self) -> usize {
        self.cache.len().await
    }

    /// Wait for an in-flight lookup led by another caller.
    async fn await_outcome(
        &self,
        key: &str,
        mut rx: watch::Receiver<LookupState>,
    ) -> Option<ResolvedRating> {
        let wait_result = rx
            .wait_for(|state| matches!(state, LookupState::Done(_)))
            .await
            .map(|state| match &*state {
                LookupState::Done(outcome) => outcome.clone(),
                LookupState::Pending => None,
            });
        match wait_result {
            Ok(outcome) => outcome,
            // The leading caller was dropped before publishing. Remove the
            // dead registry entry (unless a new leader already replaced it)
            // so later callers start a fresh lookup.
            Err(_) => {
                let mut in_flight = self.in_flight.lock().await;
                if let Some(existing) = in_flight.get(key) {
                    if existing.same_channel(&rx) {
                        in_flight.remove(key);
                    }
                }
                None
            }
        }
    }

    /// Run the uncached path: scheduler-paced search, match selection,
    /// formatting, cache write-through.
    async fn lookup(&self, query: &TitleQuery, key: &str) -> Option<ResolvedRating> {
        let search = Arc::clone(&self.search);
        let title = query.title.clone();

        let started = std::time::Instant::now();
        let result = self
            .scheduler
            .run(move || {
                let search = Arc::clone(&search);
                let title = title.clone();
                async move { search.search_titles(&title).await }
            })
            .await;
        metrics::SEARCH_DURATION.observe(started.elapsed().as_secs_f64());

        let candidates = match result {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(key = key, error = %e, "Title lookup failed, no rating");
                metrics::LOOKUPS_TOTAL.with_label_values(&["error"]).inc();
                return None;
            }
        };
        metrics::SEARCH_CANDIDATES.observe(candidates.len() as f64);

        match select_best_match(
            &query.title,
            &candidates,
            query.expected_type,
            &self.matcher_config,
        ) {
            Some(outcome) => {
                metrics::MATCH_CONFIDENCE.observe(outcome.score as f64);
                metrics::LOOKUPS_TOTAL.with_label_values(&["matched"]).inc();
                debug!(
                    key = key,
                    matched = outcome.candidate.display_title(),
                    confidence = outcome.score as f64,
                    "Resolved rating"
                );

                let rating = ResolvedRating::from_match(&outcome);
                self.cache.put(key, rating.clone()).await;
                Some(rating)
            }
            None => {
                debug!(key = key, candidates = candidates.len(), "No acceptable match");
                metrics::LOOKUPS_TOTAL.with_label_values(&["no_match"]).inc();
                None
            }
        }
    }
}

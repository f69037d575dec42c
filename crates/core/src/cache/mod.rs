//! Rating cache with time-based expiry.
//!
//! Resolved ratings are cached in memory keyed by normalized title+type and
//! written through to a `KeyValueStore` as a single JSON blob, so repeated
//! lookups of the same title cost nothing and the persisted footprint stays
//! bounded by the 30-day expiry. Store failures never fail a lookup; the
//! cache just runs memory-only until the store recovers.

mod sqlite;
mod store;

pub use sqlite::SqliteStore;
pub use store::{KeyValueStore, MemoryStore, StoreError};

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::resolver::ResolvedRating;

/// Well-known store key the serialized cache map lives under.
pub const CACHE_STORE_KEY: &str = "screenrate_rating_cache";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entries older than this many days are expired (default: 30).
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
}

fn default_max_age_days() -> u32 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
        }
    }
}

/// A cached rating with its creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: ResolvedRating,
    /// Epoch milliseconds at creation.
    pub timestamp: i64,
}

/// In-memory rating cache, write-through to a key-value store.
pub struct RatingCache {
    store: Arc<dyn KeyValueStore>,
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_age_ms: i64,
}

impl RatingCache {
    /// Load the cache from the store and sweep expired entries.
    ///
    /// An unreadable or corrupt blob starts the session with an empty cache
    /// rather than failing.
    pub async fn load(config: CacheConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.get(CACHE_STORE_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str::<HashMap<String, CacheEntry>>(&blob) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Discarding unreadable rating cache: {}", e);
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!("Failed to read rating cache from store: {}", e);
                HashMap::new()
            }
        };

        let cache = Self {
            store,
            entries: RwLock::new(entries),
            max_age_ms: config.max_age_days as i64 * MILLIS_PER_DAY,
        };

        cache.sweep_expired().await;
        cache
    }

    /// Whether an entry is still within its validity window.
    pub fn is_valid(&self, entry: &CacheEntry) -> bool {
        now_millis() - entry.timestamp <= self.max_age_ms
    }

    /// Fetch a valid entry's rating. Expired entries are deleted on access.
    pub async fn get(&self, key: &str) -> Option<ResolvedRating> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if self.is_valid(entry) => return Some(entry.data.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it and persist the removal.
        debug!(key = key, "Evicting expired cache entry");
        self.entries.write().await.remove(key);
        self.persist().await;
        None
    }

    /// Store a rating under `key`, stamped now, and write through.
    pub async fn put(&self, key: &str, rating: ResolvedRating) {
        let entry = CacheEntry {
            data: rating,
            timestamp: now_millis(),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        self.persist().await;
    }

    /// Delete every expired entry, persisting only if something was removed.
    /// Returns the number of entries removed.
    pub async fn sweep_expired(&self) -> usize {
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|_, entry| now_millis() - entry.timestamp <= self.max_age_ms);
            before - entries.len()
        };

        if removed > 0 {
            info!("Swept {} expired rating cache entries", removed);
            self.persist().await;
        }

        removed
    }

    /// Wipe all entries and persist the empty state.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        info!("Rating cache cleared");
        self.persist().await;
    }

    /// Number of entries currently held (valid or not yet evicted).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Serialize the map and write it through to the store. Failures are
    /// logged and swallowed: the session continues memory-only.
    async fn persist(&self) {
        let blob = {
            let entries = self.entries.read().await;
            match serde_json::to_string(&*entries) {
                Ok(blob) => blob,
                Err(e) => {
                    warn!("Failed to serialize rating cache: {}", e);
                    return;
                }
            }
        };

        if let Err(e) = self.store.set(CACHE_STORE_KEY, &blob).await {
            warn!("Failed to persist rating cache: {}", e);
        }
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(title: &str) -> ResolvedRating {
        ResolvedRating {
            score: "8.8".to_string(),
            votes: "2.6M".to_string(),
            confidence: 1.0,
            matched_title: title.to_string(),
            title_type: Some("movie".to_string()),
        }
    }

    async fn empty_cache() -> (Arc<MemoryStore>, RatingCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = RatingCache::load(
            CacheConfig::default(),
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
        )
        .await;
        (store, cache)
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let (_store, cache) = empty_cache().await;

        cache.put("inception_movie", rating("Inception")).await;

        let got = cache.get("inception_movie").await.expect("cached entry");
        assert_eq!(got, rating("Inception"));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (_store, cache) = empty_cache().await;
        assert!(cache.get("nothing_here_unknown").await.is_none());
    }

    #[tokio::test]
    async fn test_put_writes_through_to_store() {
        let (store, cache) = empty_cache().await;

        cache.put("inception_movie", rating("Inception")).await;

        let blob = store
            .get(CACHE_STORE_KEY)
            .await
            .unwrap()
            .expect("write-through blob");
        assert!(blob.contains("inception_movie"));
        assert!(blob.contains("Inception"));
    }

    #[tokio::test]
    async fn test_expired_entry_evicted_on_access() {
        let (_store, cache) = empty_cache().await;

        // Insert an entry aged beyond 30 days.
        let stale = CacheEntry {
            data: rating("Old Film"),
            timestamp: now_millis() - 31 * MILLIS_PER_DAY,
        };
        cache
            .entries
            .write()
            .await
            .insert("old film_movie".to_string(), stale);

        assert!(cache.get("old film_movie").await.is_none());
        assert_eq!(cache.len().await, 0, "expired entry should be deleted");
    }

    #[tokio::test]
    async fn test_entry_just_inside_window_is_valid() {
        let (_store, cache) = empty_cache().await;

        let fresh_enough = CacheEntry {
            data: rating("Recent Film"),
            timestamp: now_millis() - 29 * MILLIS_PER_DAY,
        };
        assert!(cache.is_valid(&fresh_enough));

        let too_old = CacheEntry {
            data: rating("Old Film"),
            timestamp: now_millis() - 31 * MILLIS_PER_DAY,
        };
        assert!(!cache.is_valid(&too_old));
    }

    #[tokio::test]
    async fn test_load_sweeps_expired_entries() {
        let store = Arc::new(MemoryStore::new());

        // Persist a blob with one fresh and one stale entry, then load.
        let mut map = HashMap::new();
        map.insert(
            "fresh_movie".to_string(),
            CacheEntry {
                data: rating("Fresh"),
                timestamp: now_millis(),
            },
        );
        map.insert(
            "stale_movie".to_string(),
            CacheEntry {
                data: rating("Stale"),
                timestamp: now_millis() - 60 * MILLIS_PER_DAY,
            },
        );
        store
            .set(CACHE_STORE_KEY, &serde_json::to_string(&map).unwrap())
            .await
            .unwrap();

        let cache = RatingCache::load(
            CacheConfig::default(),
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
        )
        .await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.get("fresh_movie").await.is_some());
        assert!(cache.get("stale_movie").await.is_none());

        // The sweep persisted the pruned map.
        let blob = store.get(CACHE_STORE_KEY).await.unwrap().unwrap();
        assert!(!blob.contains("stale_movie"));
    }

    #[tokio::test]
    async fn test_sweep_without_expired_entries_does_not_persist() {
        let store = Arc::new(MemoryStore::new());
        let cache = RatingCache::load(
            CacheConfig::default(),
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
        )
        .await;

        cache.put("dark_series", rating("Dark")).await;
        let blob_before = store.get(CACHE_STORE_KEY).await.unwrap();

        assert_eq!(cache.sweep_expired().await, 0);

        let blob_after = store.get(CACHE_STORE_KEY).await.unwrap();
        assert_eq!(blob_before, blob_after, "no-op sweep must not rewrite the blob");
    }

    #[tokio::test]
    async fn test_clear_persists_empty_state() {
        let (store, cache) = empty_cache().await;

        cache.put("dark_series", rating("Dark")).await;
        cache.clear().await;

        assert!(cache.is_empty().await);
        let blob = store.get(CACHE_STORE_KEY).await.unwrap().unwrap();
        assert_eq!(blob, "{}");
    }

    #[tokio::test]
    async fn test_corrupt_blob_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(CACHE_STORE_KEY, "not json at all").await.unwrap();

        let cache = RatingCache::load(
            CacheConfig::default(),
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
        )
        .await;

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_custom_max_age() {
        let store = Arc::new(MemoryStore::new());
        let cache = RatingCache::load(
            CacheConfig { max_age_days: 1 },
            store as Arc<dyn KeyValueStore>,
        )
        .await;

        let two_days_old = CacheEntry {
            data: rating("Yesterday's Film"),
            timestamp: now_millis() - 2 * MILLIS_PER_DAY,
        };
        assert!(!cache.is_valid(&two_days_old));
    }
}

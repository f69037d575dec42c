pub mod cache;
pub mod config;
pub mod matcher;
pub mod metrics;
pub mod resolver;
pub mod scheduler;
pub mod search;
pub mod similarity;
pub mod testing;

pub use cache::{
    CacheConfig, CacheEntry, KeyValueStore, MemoryStore, RatingCache, SqliteStore, StoreError,
};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use matcher::{select_best_match, MatchOutcome, MatcherConfig};
pub use resolver::{RatingResolver, ResolvedRating, TitleQuery};
pub use scheduler::{SchedulerConfig, SearchScheduler};
pub use search::{
    HttpSearchClient, SearchConfig, SearchError, TitleCandidate, TitleSearch, TitleType,
};

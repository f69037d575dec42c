use serde::{Deserialize, Serialize};

use crate::cache::CacheConfig;
use crate::matcher::MatcherConfig;
use crate::scheduler::SchedulerConfig;
use crate::search::SearchConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
}

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Search base URL is present
/// - Scheduler limits are nonzero
/// - Matcher threshold is a sane fraction
/// - Cache TTL is nonzero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.search.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "search.base_url cannot be empty".to_string(),
        ));
    }

    if config.scheduler.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.max_concurrent cannot be 0".to_string(),
        ));
    }
    if config.scheduler.window_limit == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.window_limit cannot be 0".to_string(),
        ));
    }
    if config.scheduler.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.timeout_secs cannot be 0".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.matcher.min_match_score) {
        return Err(ConfigError::ValidationError(
            "matcher.min_match_score must be between 0.0 and 1.0".to_string(),
        ));
    }

    if config.cache.max_age_days == 0 {
        return Err(ConfigError::ValidationError(
            "cache.max_age_days cannot be 0".to_string(),
        ));
    }

    Ok(())
}

//! Rate-limited scheduling for remote search calls.
//!
//! Every outbound lookup goes through the `SearchScheduler`: admission is
//! FIFO, in-flight calls are bounded by a semaphore, starts are paced by the
//! `StartPacer`, and the remote call itself runs inside a bounded retry loop
//! with a per-attempt deadline.

mod pacer;

pub use pacer::{PacerStatus, StartPacer};

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep, sleep_until, timeout, Duration};
use tracing::{debug, warn};

use crate::metrics;
use crate::search::SearchError;

/// Length of the sliding window the start cap applies to.
const WINDOW: Duration = Duration::from_millis(1000);

/// Additional attempts after a 429, with exponential backoff.
const RATE_LIMIT_RETRIES: u32 = 2;
/// First 429 backoff; doubles per attempt (1s, 2s).
const RATE_LIMIT_BACKOFF: Duration = Duration::from_millis(1000);

/// Additional attempts after a transport failure.
const TRANSPORT_RETRIES: u32 = 1;
/// Fixed delay before the transport retry.
const TRANSPORT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum concurrent in-flight requests (default: 5).
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Minimum spacing between request starts in milliseconds (default: 110,
    /// which keeps a saturated queue under 10 starts per second).
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
    /// Maximum request starts inside any trailing 1-second window
    /// (default: 9).
    #[serde(default = "default_window_limit")]
    pub window_limit: usize,
    /// Per-attempt deadline in seconds (default: 5). Expiry counts as a
    /// transport failure.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_max_concurrent() -> usize {
    5
}

fn default_request_delay() -> u64 {
    110
}

fn default_window_limit() -> usize {
    9
}

fn default_timeout() -> u64 {
    5
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            request_delay_ms: default_request_delay(),
            window_limit: default_window_limit(),
            timeout_secs: default_timeout(),
        }
    }
}

/// FIFO, concurrency-bounded, paced executor for remote search calls.
pub struct SearchScheduler {
    config: SchedulerConfig,
    semaphore: Semaphore,
    pacer: Mutex<StartPacer>,
}

impl SearchScheduler {
    /// Create a new scheduler.
    pub fn new(config: SchedulerConfig) -> Self {
        let semaphore = Semaphore::new(config.max_concurrent);
        let pacer = Mutex::new(StartPacer::new(
            Duration::from_millis(config.request_delay_ms),
            WINDOW,
            config.window_limit,
        ));

        Self {
            config,
            semaphore,
            pacer,
        }
    }

    /// Run `op` once a concurrency slot and a paced start instant are
    /// available, retrying per policy.
    ///
    /// Retry policy: a 429 is retried up to two more times with exponential
    /// backoff (1s, 2s); a transport failure or deadline expiry is retried
    /// once after 500ms. Anything else, or retries running out, is returned
    /// to the caller, who degrades it to "no rating".
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, SearchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        // Both the semaphore and the pacer mutex queue waiters FIFO, so
        // requests start in submission order.
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SearchError::Internal("scheduler closed".to_string()))?;

        let start_at = self.pacer.lock().await.reserve();
        sleep_until(start_at).await;

        let deadline = Duration::from_secs(self.config.timeout_secs);
        let mut rate_limit_attempts = 0u32;
        let mut transport_attempts = 0u32;

        loop {
            let result = match timeout(deadline, op()).await {
                Ok(result) => result,
                Err(_) => Err(SearchError::Timeout),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(SearchError::RateLimited) if rate_limit_attempts < RATE_LIMIT_RETRIES => {
                    let backoff = RATE_LIMIT_BACKOFF * 2u32.pow(rate_limit_attempts);
                    rate_limit_attempts += 1;
                    metrics::SEARCH_RETRIES
                        .with_label_values(&["rate_limited"])
                        .inc();
                    debug!(
                        attempt = rate_limit_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    sleep(backoff).await;
                }
                Err(err @ (SearchError::Timeout | SearchError::Connection(_)))
                    if transport_attempts < TRANSPORT_RETRIES =>
                {
                    transport_attempts += 1;
                    metrics::SEARCH_RETRIES
                        .with_label_values(&["transport"])
                        .inc();
                    debug!(error = %err, "Transport failure, retrying once");
                    sleep(TRANSPORT_RETRY_DELAY).await;
                }
                Err(err) => {
                    warn!(error = %err, "Search call failed after retries");
                    return Err(err);
                }
            }
        }
    }

    /// Pacing status snapshot.
    pub async fn status(&self) -> PacerStatus {
        self.pacer.lock().await.status()
    }

    /// Concurrency slots currently free.
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}

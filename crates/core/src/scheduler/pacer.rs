//! Start pacing for outbound search requests.
//!
//! Two constraints gate every request start, and both must hold at once:
//! a minimum spacing between consecutive starts, and a cap on how many
//! starts may fall inside any trailing one-second window. The pacer books
//! start instants under a lock; callers sleep until their booked instant.

use std::collections::VecDeque;

use tokio::time::{Duration, Instant};

/// Pacing status snapshot, for debug surfaces.
#[derive(Debug, Clone)]
pub struct PacerStatus {
    /// Booked starts currently inside the trailing window.
    pub window_occupancy: usize,
    /// Delay until a request reserved now would be allowed to start.
    pub next_start_in: Duration,
}

/// Books request start instants against the spacing and window constraints.
pub struct StartPacer {
    min_spacing: Duration,
    window: Duration,
    window_limit: usize,
    last_start: Option<Instant>,
    starts: VecDeque<Instant>,
}

impl StartPacer {
    pub fn new(min_spacing: Duration, window: Duration, window_limit: usize) -> Self {
        Self {
            min_spacing,
            window,
            window_limit,
            last_start: None,
            starts: VecDeque::new(),
        }
    }

    /// Reserve the next admissible start instant and book it.
    ///
    /// Bookings are monotonic, so callers that reserve in order also start
    /// in order. The returned instant may be in the past (start immediately)
    /// or in the future (sleep until then).
    pub fn reserve(&mut self) -> Instant {
        let now = Instant::now();

        let mut candidate = now;
        if let Some(last) = self.last_start {
            candidate = candidate.max(last + self.min_spacing);
        }

        self.prune(candidate);
        if self.starts.len() >= self.window_limit {
            // The slot opens when the oldest of the most recent `window_limit`
            // bookings falls out of the trailing window.
            let blocker = self.starts[self.starts.len() - self.window_limit];
            candidate = candidate.max(blocker + self.window);
            self.prune(candidate);
        }

        self.starts.push_back(candidate);
        self.last_start = Some(candidate);
        candidate
    }

    /// Current pacing status without booking anything.
    pub fn status(&self) -> PacerStatus {
        let now = Instant::now();

        let window_occupancy = self
            .starts
            .iter()
            .filter(|s| now.duration_since(**s) < self.window)
            .count();

        let mut next = now;
        if let Some(last) = self.last_start {
            next = next.max(last + self.min_spacing);
        }
        if window_occupancy >= self.window_limit {
            let blocker = self.starts[self.starts.len() - self.window_limit];
            next = next.max(blocker + self.window);
        }

        PacerStatus {
            window_occupancy,
            next_start_in: next.saturating_duration_since(now),
        }
    }

    /// Drop bookings that are already outside the window at `at`.
    fn prune(&mut self, at: Instant) {
        while let Some(front) = self.starts.front() {
            if at.duration_since(*front) >= self.window {
                self.starts.pop_front();
            } else {
                break;
            }
        }
    }
}

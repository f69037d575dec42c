//! Scheduler limit tests under burst load.
//!
//! Runs 50-request bursts through `SearchScheduler` on tokio's paused clock
//! and checks the two hard limits: concurrent in-flight calls and request
//! starts per trailing 1-second window.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use screenrate_core::{SchedulerConfig, SearchError, SearchScheduler};

#[tokio::test(start_paused = true)]
async fn burst_never_exceeds_concurrency_limit() {
    let scheduler = Arc::new(SearchScheduler::new(SchedulerConfig::default()));
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            async move {
                scheduler
                    .run(move || {
                        let active = Arc::clone(&active);
                        let peak = Arc::clone(&peak);
                        async move {
                            let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now_active, Ordering::SeqCst);
                            // Slow enough that admissions outpace completions
                            // and pile up against the concurrency limit.
                            tokio::time::sleep(Duration::from_millis(1000)).await;
                            active.fetch_sub(1, Ordering::SeqCst);
                            Ok::<_, SearchError>(())
                        }
                    })
                    .await
            }
        })
        .collect();

    let results = join_all(tasks).await;

    assert!(results.iter().all(|r| r.is_ok()));
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 5, "concurrency limit exceeded: peak {}", peak);
    assert_eq!(peak, 5, "a 50-request burst should saturate the limit");
}

#[tokio::test(start_paused = true)]
async fn burst_respects_spacing_and_window_cap() {
    let scheduler = Arc::new(SearchScheduler::new(SchedulerConfig::default()));
    let starts = Arc::new(Mutex::new(Vec::<Instant>::new()));

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            let starts = Arc::clone(&starts);
            async move {
                scheduler
                    .run(move || {
                        let starts = Arc::clone(&starts);
                        async move {
                            starts.lock().await.push(Instant::now());
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, SearchError>(())
                        }
                    })
                    .await
            }
        })
        .collect();

    join_all(tasks).await;

    let mut starts = starts.lock().await.clone();
    starts.sort();
    assert_eq!(starts.len(), 50);

    // Minimum inter-start spacing.
    for pair in starts.windows(2) {
        let gap = pair[1].duration_since(pair[0]);
        assert!(
            gap >= Duration::from_millis(110),
            "starts only {}ms apart",
            gap.as_millis()
        );
    }

    // No trailing 1-second window may hold more than 9 starts.
    for (i, start) in starts.iter().enumerate() {
        let in_window = starts
            .iter()
            .filter(|s| **s <= *start && start.duration_since(**s) < Duration::from_millis(1000))
            .count();
        assert!(
            in_window <= 9,
            "window ending at start {} holds {} starts",
            i,
            in_window
        );
    }
}

#[tokio::test(start_paused = true)]
async fn requests_start_in_submission_order() {
    let scheduler = Arc::new(SearchScheduler::new(SchedulerConfig::default()));
    let order = Arc::new(Mutex::new(Vec::<usize>::new()));

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let scheduler = Arc::clone(&scheduler);
            let order = Arc::clone(&order);
            async move {
                scheduler
                    .run(move || {
                        let order = Arc::clone(&order);
                        async move {
                            order.lock().await.push(i);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            Ok::<_, SearchError>(())
                        }
                    })
                    .await
            }
        })
        .collect();

    join_all(tasks).await;

    let order = order.lock().await;
    let expected: Vec<usize> = (0..20).collect();
    assert_eq!(*order, expected, "queue draining must be FIFO");
}

#[tokio::test(start_paused = true)]
async fn completions_may_finish_out_of_order() {
    // FIFO applies to starts, not completions: a slow early request must not
    // block a fast later one from finishing first.
    let scheduler = Arc::new(SearchScheduler::new(SchedulerConfig::default()));
    let completions = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    let slow = {
        let scheduler = Arc::clone(&scheduler);
        let completions = Arc::clone(&completions);
        async move {
            scheduler
                .run(move || {
                    let completions = Arc::clone(&completions);
                    async move {
                        tokio::time::sleep(Duration::from_millis(900)).await;
                        completions.lock().await.push("slow");
                        Ok::<_, SearchError>(())
                    }
                })
                .await
        }
    };

    let fast = {
        let scheduler = Arc::clone(&scheduler);
        let completions = Arc::clone(&completions);
        async move {
            scheduler
                .run(move || {
                    let completions = Arc::clone(&completions);
                    async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        completions.lock().await.push("fast");
                        Ok::<_, SearchError>(())
                    }
                })
                .await
        }
    };

    let (a, b) = tokio::join!(slow, fast);
    assert!(a.is_ok() && b.is_ok());

    let completions = completions.lock().await;
    assert_eq!(*completions, vec!["fast", "slow"]);
}

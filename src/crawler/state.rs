//! Process-wide crawl counters and the stop signal
//!
//! All counters are atomics so workers update them without a lock. Checking
//! the page limit and counting a saved page happen under the coordinator's
//! save gate, so the counters themselves never need a compare-and-swap.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The configured number of pages was saved
    PageLimit,
    /// The configured timeout elapsed
    Timeout,
    /// No timeout was configured and the safety ceiling elapsed first
    Ceiling,
    /// The frontier ran dry with no page in flight
    Exhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::PageLimit => "page limit reached",
            Self::Timeout => "timeout elapsed",
            Self::Ceiling => "safety ceiling elapsed",
            Self::Exhausted => "no pages left to crawl",
        };
        f.write_str(text)
    }
}

/// Cooperative stop broadcast to every worker
///
/// The first reason recorded wins; later triggers only re-cancel the token.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<StopReason>>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self, reason: StopReason) {
        if self.reason.set(reason).is_ok() {
            tracing::info!("Stopping crawl: {}", reason);
        }
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<StopReason> {
        self.reason.get().copied()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub async fn stopped(&self) {
        self.token.cancelled().await
    }
}

/// Shared counters for one crawl
#[derive(Debug)]
pub struct CrawlState {
    page_limit: Option<u64>,
    saved: AtomicU64,
    fetch_failures: AtomicU64,
    save_failures: AtomicU64,
    links_found: AtomicU64,
    duplicates: AtomicU64,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl CrawlState {
    pub fn new(page_limit: Option<u64>) -> Self {
        Self {
            page_limit,
            saved: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            save_failures: AtomicU64::new(0),
            links_found: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Returns true while the page limit leaves room for another page
    pub fn has_room(&self) -> bool {
        !self.limit_reached(self.pages_saved())
    }

    pub fn save_failed(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a saved page and returns the new total
    pub fn page_saved(&self) -> u64 {
        self.saved.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns true if `saved` pages satisfy the configured limit
    pub fn limit_reached(&self, saved: u64) -> bool {
        self.page_limit.is_some_and(|limit| saved >= limit)
    }

    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn links_found(&self, count: usize) {
        self.links_found.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn duplicate_claimed(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_saved(&self) -> u64 {
        self.saved.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Takes a snapshot of the counters
    pub fn report(
        &self,
        stop_reason: Option<StopReason>,
        visited: usize,
        queued: u64,
        frontier_len: usize,
    ) -> CrawlReport {
        CrawlReport {
            stop_reason,
            pages_saved: self.saved.load(Ordering::SeqCst),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            save_failures: self.save_failures.load(Ordering::Relaxed),
            links_found: self.links_found.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates.load(Ordering::Relaxed),
            addresses_claimed: visited,
            addresses_queued: queued,
            frontier_remaining: frontier_len,
            started_at: self.started_at,
            elapsed: self.elapsed(),
        }
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub stop_reason: Option<StopReason>,
    pub pages_saved: u64,
    pub fetch_failures: u64,
    pub save_failures: u64,
    pub links_found: u64,
    pub duplicates_skipped: u64,
    pub addresses_claimed: usize,
    pub addresses_queued: u64,
    pub frontier_remaining: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_room_until_limit() {
        let state = CrawlState::new(Some(2));
        assert!(state.has_room());
        state.page_saved();
        assert!(state.has_room());
        state.page_saved();
        assert!(!state.has_room());
    }

    #[test]
    fn test_failed_save_leaves_room() {
        let state = CrawlState::new(Some(1));
        state.save_failed();
        assert!(state.has_room());

        let report = state.report(None, 0, 0, 0);
        assert_eq!(report.save_failures, 1);
        assert_eq!(report.pages_saved, 0);
    }

    #[test]
    fn test_unlimited_always_has_room() {
        let state = CrawlState::new(None);
        for _ in 0..1000 {
            state.page_saved();
        }
        assert!(state.has_room());
        assert!(!state.limit_reached(1000));
    }

    #[test]
    fn test_limit_reached() {
        let state = CrawlState::new(Some(3));
        assert!(!state.limit_reached(2));
        assert!(state.limit_reached(3));
    }

    #[test]
    fn test_concurrent_counting() {
        let state = Arc::new(CrawlState::new(None));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        state.page_saved();
                        state.fetch_failed();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        let report = state.report(None, 0, 0, 0);
        assert_eq!(report.pages_saved, 800);
        assert_eq!(report.fetch_failures, 800);
    }

    #[test]
    fn test_first_stop_reason_wins() {
        let stop = StopSignal::new();
        assert!(!stop.is_stopped());
        stop.trigger(StopReason::PageLimit);
        stop.trigger(StopReason::Timeout);
        assert!(stop.is_stopped());
        assert_eq!(stop.reason(), Some(StopReason::PageLimit));
    }

    #[test]
    fn test_clones_share_the_signal() {
        let stop = StopSignal::new();
        let clone = stop.clone();
        clone.trigger(StopReason::Exhausted);
        assert!(stop.is_stopped());
        assert_eq!(stop.reason(), Some(StopReason::Exhausted));
    }
}

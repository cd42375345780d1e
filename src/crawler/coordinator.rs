//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator seeds the frontier, runs a fixed pool of worker tasks and
//! watches the stop conditions. Each worker repeats one cycle:
//!
//! 1. Pop an address from the frontier (waits while it is empty)
//! 2. Claim it in the visited set; addresses claimed before are dropped
//! 3. Fetch the body; a failed fetch is logged and ends the cycle
//! 4. Hand the body to the page sink and count the saved page; saves run
//!    one at a time on the blocking pool
//! 5. Extract same-host links and push the unclaimed ones
//!
//! Stopping is cooperative: the page limit, the timeout (or the fallback
//! ceiling) and an exhausted frontier all fire one shared signal. Waiting
//! workers wake up, in-flight fetches are dropped, and a save that already
//! started runs to completion.

use crate::config::{validate_crawl_settings, CrawlSettings};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract_links;
use crate::crawler::state::{CrawlReport, CrawlState, StopReason, StopSignal};
use crate::crawler::visited::VisitedSet;
use crate::sink::PageSink;
use crate::url::{Address, Target};
use crate::CrawlError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// How long a crawl runs when no timeout is set
pub const FALLBACK_CEILING: Duration = Duration::from_secs(60 * 60);

/// State shared by the coordinator and every worker
struct Shared<F, S> {
    seed: Address,
    target: Target,
    fetcher: F,
    sink: Arc<S>,
    save_gate: Mutex<()>,
    visited: VisitedSet,
    frontier: Frontier,
    state: CrawlState,
    stop: StopSignal,
}

/// Main crawler coordinator structure
pub struct Coordinator<F, S> {
    shared: Arc<Shared<F, S>>,
    workers: usize,
    timeout: Option<Duration>,
    ceiling: Duration,
}

impl<F: PageFetcher, S: PageSink> Coordinator<F, S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `settings` - The crawl settings; `host` is the seed address
    /// * `fetcher` - Retrieves page bodies
    /// * `sink` - Persists fetched pages
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - Invalid settings or an unusable seed address
    pub fn new(settings: &CrawlSettings, fetcher: F, sink: S) -> Result<Self, CrawlError> {
        validate_crawl_settings(settings)?;

        let seed = Address::parse_seed(&settings.host)?;
        let target = Target::from_seed(&seed);

        Ok(Self {
            shared: Arc::new(Shared {
                seed,
                target,
                fetcher,
                sink: Arc::new(sink),
                save_gate: Mutex::new(()),
                visited: VisitedSet::new(),
                frontier: Frontier::new(),
                state: CrawlState::new(settings.page_limit),
                stop: StopSignal::new(),
            }),
            workers: settings.workers,
            timeout: settings.timeout(),
            ceiling: FALLBACK_CEILING,
        })
    }

    /// Replaces the safety ceiling used when no timeout is configured
    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// The host this crawl is confined to
    pub fn target(&self) -> &Target {
        &self.shared.target
    }

    /// A handle that stops the crawl from outside
    pub fn stop_signal(&self) -> StopSignal {
        self.shared.stop.clone()
    }

    /// Runs the crawl until a stop condition fires
    ///
    /// Returns once every worker has observed the stop signal.
    pub async fn run(self) -> CrawlReport {
        let shared = self.shared;
        let (deadline, deadline_reason) = match self.timeout {
            Some(timeout) => (timeout, StopReason::Timeout),
            None => (self.ceiling, StopReason::Ceiling),
        };

        tracing::info!(
            "Starting crawl of {} with {} workers (host {})",
            shared.seed,
            self.workers,
            shared.target.host
        );

        shared.frontier.push(shared.seed.clone());

        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            let shared = Arc::clone(&shared);
            workers.spawn(async move { shared.work(id).await });
        }

        tokio::select! {
            _ = tokio::time::sleep(deadline) => shared.stop.trigger(deadline_reason),
            _ = shared.stop.stopped() => {}
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        let report = shared.state.report(
            shared.stop.reason(),
            shared.visited.len(),
            shared.frontier.pushed(),
            shared.frontier.len(),
        );

        tracing::info!(
            "Crawl stopped: {} pages saved, {} addresses claimed in {:?}",
            report.pages_saved,
            report.addresses_claimed,
            report.elapsed
        );

        report
    }
}

impl<F: PageFetcher, S: PageSink> Shared<F, S> {
    /// Worker loop: pull addresses until the crawl stops
    async fn work(&self, id: usize) {
        tracing::debug!("Worker {} started", id);

        while let Some(address) = self.frontier.pop(self.stop.token()).await {
            self.process(&address).await;
            self.frontier.complete();

            if self.stop.is_stopped() {
                break;
            }
        }

        // `pop` only gives up without a stop when nothing is left to crawl
        if !self.stop.is_stopped() {
            self.stop.trigger(StopReason::Exhausted);
        }

        tracing::debug!("Worker {} finished", id);
    }

    /// Handles one popped address; every failure stays inside this call
    async fn process(&self, address: &Address) {
        if !self.visited.claim(address) {
            self.state.duplicate_claimed();
            tracing::trace!("Already claimed: {}", address);
            return;
        }

        tracing::debug!("Fetching {}", address);

        let fetched = tokio::select! {
            result = self.fetcher.fetch(address) => result,
            _ = self.stop.stopped() => {
                tracing::debug!("Abandoning fetch of {}", address);
                return;
            }
        };

        let body = match fetched {
            Ok(body) => body,
            Err(e) => {
                self.state.fetch_failed();
                tracing::warn!("{}", e);
                return;
            }
        };

        let links = extract_links(&body, &self.target);
        self.persist(address, body).await;

        if self.stop.is_stopped() {
            return;
        }

        self.state.links_found(links.len());

        let mut queued = 0;
        for link in links {
            if !self.visited.contains(&link) {
                self.frontier.push(link);
                queued += 1;
            }
        }

        tracing::debug!("{}: queued {} new links", address, queued);
    }

    /// Saves a fetched page if the page limit still has room
    ///
    /// Saves run one at a time under the save gate, so a page is only turned
    /// away once earlier saves have actually filled the limit.
    async fn persist(&self, address: &Address, body: Vec<u8>) {
        let _gate = self.save_gate.lock().await;

        if !self.state.has_room() {
            tracing::debug!("Page limit reached, not saving {}", address);
            return;
        }

        let sink = Arc::clone(&self.sink);
        let owned = address.clone();
        let result = tokio::task::spawn_blocking(move || sink.save(&owned, &body)).await;

        match result {
            Ok(Ok(path)) => {
                let saved = self.state.page_saved();
                tracing::info!("Saved {} to {}", address, path.display());

                if saved % 10 == 0 {
                    let elapsed = self.state.elapsed();
                    tracing::info!(
                        "Progress: {} pages saved, {} in frontier, {:.2} pages/sec",
                        saved,
                        self.frontier.len(),
                        saved as f64 / elapsed.as_secs_f64()
                    );
                }

                if self.state.limit_reached(saved) {
                    self.stop.trigger(StopReason::PageLimit);
                }
            }
            Ok(Err(e)) => {
                self.state.save_failed();
                tracing::warn!("Failed to save {}: {}", address, e);
            }
            Err(e) => {
                self.state.save_failed();
                tracing::error!("Save task for {} failed: {}", address, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FetchError;
    use crate::sink::{SinkError, SinkResult};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Serves a fixed map of path -> html and logs every fetched address
    struct StaticSite {
        pages: HashMap<String, String>,
        delays: HashMap<String, Duration>,
        fetched: Arc<Mutex<Vec<String>>>,
    }

    impl StaticSite {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(path, html)| (path.to_string(), html.to_string()))
                    .collect(),
                delays: HashMap::new(),
                fetched: Arc::default(),
            }
        }

        fn with_delay(mut self, path: &str, delay: Duration) -> Self {
            self.delays.insert(path.to_string(), delay);
            self
        }
    }

    impl PageFetcher for StaticSite {
        async fn fetch(&self, address: &Address) -> Result<Vec<u8>, FetchError> {
            self.fetched.lock().unwrap().push(address.to_string());
            if let Some(delay) = self.delays.get(address.path()) {
                tokio::time::sleep(*delay).await;
            }

            self.pages
                .get(address.path())
                .map(|html| html.clone().into_bytes())
                .ok_or_else(|| FetchError::Transport {
                    url: address.to_string(),
                    message: "connection refused".to_string(),
                })
        }
    }

    /// Records saved paths; refuses paths listed in `refuse` after `refuse_after`
    #[derive(Default)]
    struct RecordingSink {
        saved: Arc<Mutex<Vec<String>>>,
        refuse: Vec<String>,
        refuse_after: Duration,
    }

    impl PageSink for RecordingSink {
        fn save(&self, address: &Address, _body: &[u8]) -> SinkResult<PathBuf> {
            if self.refuse.iter().any(|path| path == address.path()) {
                std::thread::sleep(self.refuse_after);
                return Err(SinkError::Rejected {
                    url: address.to_string(),
                    message: "disk full".to_string(),
                });
            }
            self.saved.lock().unwrap().push(address.path().to_string());
            Ok(PathBuf::from(address.path()))
        }
    }

    fn settings(timeout_secs: Option<u64>, page_limit: Option<u64>) -> CrawlSettings {
        CrawlSettings {
            host: "https://example.com/".to_string(),
            timeout_secs,
            page_limit,
            workers: 3,
            ..CrawlSettings::default()
        }
    }

    #[test]
    fn test_invalid_seed_is_fatal() {
        let mut settings = settings(Some(5), None);
        settings.host = "mailto:someone@example.com".to_string();
        let result = Coordinator::new(&settings, StaticSite::new(&[]), RecordingSink::default());
        assert!(matches!(result, Err(CrawlError::UrlError(_))));
    }

    #[test]
    fn test_missing_limits_are_fatal() {
        let result = Coordinator::new(
            &settings(None, None),
            StaticSite::new(&[]),
            RecordingSink::default(),
        );
        assert!(matches!(result, Err(CrawlError::Config(_))));
    }

    #[test]
    fn test_target_comes_from_seed() {
        let coordinator = Coordinator::new(
            &settings(Some(5), None),
            StaticSite::new(&[]),
            RecordingSink::default(),
        )
        .unwrap();
        assert_eq!(coordinator.target().host, "example.com");
    }

    #[tokio::test]
    async fn test_crawl_follows_links_and_stops_when_exhausted() {
        let site = StaticSite::new(&[
            ("/", r#"<a href="/a">A</a><a href="/b">B</a><a href="https://other.com/x">X</a>"#),
            ("/a", r#"<a href="/b">B</a><a href="/c">C</a><a href="/">Home</a>"#),
            ("/b", r#"<a href="/a">A</a>"#),
            ("/c", r#"<p>leaf</p>"#),
        ]);

        let coordinator =
            Coordinator::new(&settings(Some(30), None), site, RecordingSink::default()).unwrap();
        let report = coordinator.run().await;

        assert_eq!(report.stop_reason, Some(StopReason::Exhausted));
        assert_eq!(report.pages_saved, 4);
        assert_eq!(report.addresses_claimed, 4);
        assert_eq!(report.fetch_failures, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_a_dead_end() {
        let site = StaticSite::new(&[(
            "/",
            r#"<a href="/gone">Gone</a><a href="/also-gone">Also gone</a>"#,
        )]);

        let coordinator =
            Coordinator::new(&settings(Some(30), None), site, RecordingSink::default()).unwrap();
        let report = coordinator.run().await;

        assert_eq!(report.stop_reason, Some(StopReason::Exhausted));
        assert_eq!(report.fetch_failures, 2);
        assert_eq!(report.pages_saved, 1);
    }

    #[tokio::test]
    async fn test_save_failure_does_not_count_toward_limit() {
        let site = StaticSite::new(&[
            ("/", r#"<a href="/a">A</a>"#),
            ("/a", r#"<a href="/b">B</a>"#),
            ("/b", r#"<p>end</p>"#),
        ]);
        let sink = RecordingSink {
            refuse: vec!["/a".to_string()],
            ..RecordingSink::default()
        };

        let coordinator = Coordinator::new(&settings(Some(30), Some(2)), site, sink).unwrap();
        let report = coordinator.run().await;

        // Links of the refused page are still followed
        assert_eq!(report.stop_reason, Some(StopReason::PageLimit));
        assert_eq!(report.pages_saved, 2);
        assert_eq!(report.save_failures, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_save_does_not_turn_away_a_later_page() {
        let site = StaticSite::new(&[
            ("/", r#"<a href="/a">A</a><a href="/b">B</a>"#),
            ("/a", "<p>a</p>"),
            ("/b", "<p>b</p>"),
        ])
        .with_delay("/b", Duration::from_millis(50));
        let sink = RecordingSink {
            refuse: vec!["/a".to_string()],
            refuse_after: Duration::from_millis(300),
            ..RecordingSink::default()
        };
        let saved = Arc::clone(&sink.saved);

        let mut settings = settings(Some(30), Some(2));
        settings.workers = 2;
        let report = Coordinator::new(&settings, site, sink).unwrap().run().await;

        assert_eq!(report.stop_reason, Some(StopReason::PageLimit));
        assert_eq!(report.pages_saved, 2);
        assert_eq!(report.save_failures, 1);
        assert_eq!(*saved.lock().unwrap(), vec!["/", "/b"]);
    }

    #[tokio::test]
    async fn test_relative_links_resolve_over_https_from_http_seed() {
        let site = StaticSite::new(&[
            (
                "/",
                r#"<a href="/a">A</a><a href="https://example.com/a">A again</a>"#,
            ),
            ("/a", "<p>a</p>"),
        ]);
        let fetched = Arc::clone(&site.fetched);

        let mut settings = settings(Some(30), None);
        settings.host = "http://example.com/".to_string();
        let report = Coordinator::new(&settings, site, RecordingSink::default())
            .unwrap()
            .run()
            .await;

        assert_eq!(report.stop_reason, Some(StopReason::Exhausted));
        assert_eq!(report.pages_saved, 2);
        assert_eq!(
            *fetched.lock().unwrap(),
            vec!["http://example.com/", "https://example.com/a"]
        );
    }

    #[tokio::test]
    async fn test_ceiling_stops_crawl_without_timeout() {
        let site = StaticSite::new(&[("/", "<p>slow</p>")])
            .with_delay("/", Duration::from_secs(30));

        let coordinator =
            Coordinator::new(&settings(None, Some(5)), site, RecordingSink::default())
                .unwrap()
                .with_ceiling(Duration::from_millis(100));
        let report = coordinator.run().await;

        assert_eq!(report.stop_reason, Some(StopReason::Ceiling));
        assert_eq!(report.pages_saved, 0);
        assert!(report.elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_external_stop() {
        let site = StaticSite::new(&[("/", "<p>home</p>")]);
        let coordinator =
            Coordinator::new(&settings(Some(30), None), site, RecordingSink::default()).unwrap();
        let stop = coordinator.stop_signal();
        stop.trigger(StopReason::Timeout);

        let report = coordinator.run().await;
        assert_eq!(report.stop_reason, Some(StopReason::Timeout));
    }
}

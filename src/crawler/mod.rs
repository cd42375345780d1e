//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - HTML link extraction
//! - The shared frontier and visited set
//! - Overall crawl coordination and stop conditions

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod state;
mod visited;

pub use coordinator::{Coordinator, FALLBACK_CEILING};
pub use fetcher::{build_http_client, fetch_url, user_agent, FetchError, HttpFetcher, PageFetcher};
pub use frontier::Frontier;
pub use parser::extract_links;
pub use state::{CrawlReport, CrawlState, StopReason, StopSignal};
pub use visited::VisitedSet;

use crate::config::Config;
use crate::sink::FileSink;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Open the output directory sink
/// 3. Seed the frontier and run the workers
/// 4. Stop on the page limit, the timeout, or an exhausted frontier
///
/// # Example
///
/// ```no_run
/// use host_crawl::config::load_config;
/// use host_crawl::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawl.toml"))?;
/// let report = crawl(&config).await?;
/// println!("{} pages saved", report.pages_saved);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config) -> Result<CrawlReport, CrawlError> {
    let fetcher = HttpFetcher::new(&config.user_agent, config.crawl.request_timeout())?;
    let sink = FileSink::new(&config.output.output_dir);

    tracing::info!("Saving pages below {}", config.output.output_dir.display());

    let coordinator = Coordinator::new(&config.crawl, fetcher, sink)?;
    Ok(coordinator.run().await)
}

//! Output module for crawl summaries
//!
//! This module renders the [`CrawlReport`](crate::crawler::CrawlReport)
//! returned by a finished crawl for the terminal.

pub mod stats;

pub use stats::{format_statistics, print_statistics};

//! Host-Crawl: a single-host concurrent web crawler
//!
//! This crate crawls one web host from a seed address, follows same-host
//! hyperlinks with a fixed pool of workers, saves every fetched page, and stops
//! on a page limit or a wall-clock timeout.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sink;
pub mod url;

use thiserror::Error;

/// Main error type for Host-Crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reasons an href is not a crawlable address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Empty link")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Host {host} is not the crawl target {target}")]
    ForeignHost { host: String, target: String },

    #[error("Link points at the host root")]
    RootPath,
}

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport, StopReason};
pub use crate::url::{normalize, normalize_with_scheme, Address, Target};

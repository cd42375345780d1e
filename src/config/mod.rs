//! Configuration module for Host-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional in the file; command-line flags fill in or override
//! values before the merged configuration is validated.
//!
//! # Example
//!
//! ```no_run
//! use host_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawl.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlSettings, OutputConfig, UserAgentConfig};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, parse_config, read_config};
pub use validation::{validate, validate_crawl_settings, MAX_WORKERS};

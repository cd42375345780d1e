use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use host_crawl::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Crawling {}", config.crawl.host);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Reads and parses a configuration file without validating it
///
/// Used when command-line flags still have to be merged in before the
/// result can be validated.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from a TOML string without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run can be matched to the exact file it used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawl]
host = "https://example.com/"
timeout-secs = 60
page-limit = 100
workers = 4
request-timeout-secs = 15

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[output]
output-dir = "/tmp/test-pages"
log-file = "/tmp/test-crawl.log"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.host, "https://example.com/");
        assert_eq!(config.crawl.timeout_secs, Some(60));
        assert_eq!(config.crawl.page_limit, Some(100));
        assert_eq!(config.crawl.workers, 4);
        assert_eq!(config.crawl.request_timeout_secs, 15);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(
            config.output.log_file.as_deref(),
            Some(Path::new("/tmp/test-crawl.log"))
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = create_temp_config(
            r#"
[crawl]
host = "example.com"
page-limit = 5
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.workers, 2);
        assert_eq!(config.crawl.timeout_secs, None);
        assert_eq!(config.crawl.request_timeout_secs, 30);
        assert_eq!(config.user_agent.crawler_name, "host-crawl");
        assert_eq!(config.output.output_dir, Path::new("/tmp/scraper"));
        assert!(config.output.log_file.is_none());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("[crawl\nhost = ");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_without_limits_fails_validation() {
        let file = create_temp_config("[crawl]\nhost = \"example.com\"\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_read_config_skips_validation() {
        let file = create_temp_config("[crawl]\nworkers = 8\n");
        let config = read_config(file.path()).unwrap();
        assert_eq!(config.crawl.workers, 8);
        assert!(config.crawl.host.is_empty());
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("[crawl]\nhost = \"example.com\"\npage-limit = 1\n");
        let hash = compute_config_hash(file.path()).unwrap();
        assert_eq!(hash.len(), 64);

        // Same content should produce same hash
        let hash2 = compute_config_hash(file.path()).unwrap();
        assert_eq!(hash, hash2);
    }

    #[test]
    fn test_config_hash_changes_with_content() {
        let first = create_temp_config("[crawl]\nhost = \"example.com\"\ntimeout-secs = 3\n");
        let second = create_temp_config("[crawl]\nhost = \"example.com\"\ntimeout-secs = 4\n");
        assert_ne!(
            compute_config_hash(first.path()).unwrap(),
            compute_config_hash(second.path()).unwrap()
        );
    }
}

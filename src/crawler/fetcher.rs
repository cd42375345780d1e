//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests returning the raw page body
//! - Error classification
//!
//! Any response body is page content: a 404 page is fetched and parsed like
//! any other. Only transport-level problems are failures.

use crate::config::UserAgentConfig;
use crate::url::Address;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while retrieving a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Could not connect to {url}: {source}")]
    Unreachable { url: String, source: reqwest::Error },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    /// The address the failed fetch was for
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Unreachable { url, .. }
            | Self::Http { url, .. }
            | Self::Transport { url, .. } => url,
        }
    }
}

/// Retrieves the body stored at an address
///
/// Implementations must release any network resource before returning.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch(&self, address: &Address) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Page fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with a client configured from `config`
    pub fn new(config: &UserAgentConfig, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config, request_timeout)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, address: &Address) -> Result<Vec<u8>, FetchError> {
        fetch_url(&self.client, address).await
    }
}

/// Formats the user agent header: `Name/Version (+ContactURL)`
pub fn user_agent(config: &UserAgentConfig) -> String {
    match &config.contact_url {
        Some(contact) => format!(
            "{}/{} (+{})",
            config.crawler_name, config.crawler_version, contact
        ),
        None => format!("{}/{}", config.crawler_name, config.crawler_version),
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `request_timeout` - Upper bound for one whole request
///
/// # Example
///
/// ```no_run
/// use host_crawl::config::UserAgentConfig;
/// use host_crawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent(config))
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues one GET for `address` and returns the whole body
///
/// The response is consumed (and its connection released) before returning,
/// whatever the outcome.
pub async fn fetch_url(client: &Client, address: &Address) -> Result<Vec<u8>, FetchError> {
    let url = address.as_str();

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        tracing::debug!("{} answered HTTP {}, keeping body", url, status.as_u16());
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| classify_error(url, e))?;

    Ok(body.to_vec())
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Unreachable {
            url: url.to_string(),
            source: error,
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: Some("https://example.com/about".to_string()),
        }
    }

    fn test_fetcher() -> HttpFetcher {
        HttpFetcher::new(&create_test_config(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        assert_eq!(
            user_agent(&create_test_config()),
            "TestCrawler/1.0 (+https://example.com/about)"
        );

        let mut config = create_test_config();
        config.contact_url = None;
        assert_eq!(user_agent(&config), "TestCrawler/1.0");
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
            .mount(&server)
            .await;

        let address = Address::parse_seed(&format!("{}/page", server.uri())).unwrap();
        let body = test_fetcher().fetch(&address).await.unwrap();
        assert_eq!(body, b"<p>hello</p>");
    }

    #[tokio::test]
    async fn test_error_status_body_is_still_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let address = Address::parse_seed(&format!("{}/missing", server.uri())).unwrap();
        let body = test_fetcher().fetch(&address).await.unwrap();
        assert_eq!(body, b"not here");
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_failure() {
        // Bind then drop a listener to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let address = Address::parse_seed(&format!("http://127.0.0.1:{}/page", port)).unwrap();
        let error = test_fetcher().fetch(&address).await.unwrap_err();
        assert_eq!(error.url(), address.as_str());
    }
}

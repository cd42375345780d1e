//! URL handling module for Host-Crawl
//!
//! This module provides the canonical [`Address`] type, the crawl [`Target`]
//! and the link normalizer that decides which hrefs stay inside the crawl.

mod address;
mod normalize;

// Re-export main types and functions
pub use address::Address;
pub use normalize::{normalize, normalize_with_scheme, DEFAULT_SCHEME};

use url::Url;

/// The host a crawl is confined to
///
/// `host` is the URL authority: the host name plus an explicit non-default
/// port. Host-relative links found on its pages resolve with the implied
/// `https` scheme, whatever scheme the seed used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
}

impl Target {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().to_ascii_lowercase(),
        }
    }

    /// Builds the target a crawl seeded at `seed` is confined to
    ///
    /// # Examples
    ///
    /// ```
    /// use host_crawl::url::{Address, Target};
    ///
    /// let seed = Address::parse_seed("http://127.0.0.1:8080/").unwrap();
    /// let target = Target::from_seed(&seed);
    /// assert_eq!(target.host, "127.0.0.1:8080");
    /// ```
    pub fn from_seed(seed: &Address) -> Self {
        Self { host: seed.host() }
    }

    /// Normalizes an href found on one of this target's pages
    pub fn normalize(&self, href: &str) -> crate::UrlResult<Address> {
        normalize(href, &self.host)
    }
}

/// Returns the authority of a URL: the host plus any non-default port
pub(crate) fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    if host.is_empty() {
        return None;
    }

    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

use crate::url::{authority, Address};
use crate::{UrlError, UrlResult};
use url::{ParseError, Url};

/// Scheme assumed for links that carry none
pub const DEFAULT_SCHEME: &str = "https";

/// Normalizes a discovered href against the crawl's target host
///
/// Host-relative links are resolved with an implied `https` scheme. See
/// [`normalize_with_scheme`] for the rules.
///
/// # Examples
///
/// ```
/// use host_crawl::url::normalize;
///
/// let address = normalize("/about", "example.com").unwrap();
/// assert_eq!(address.as_str(), "https://example.com/about");
///
/// assert!(normalize("https://other.com/x", "example.com").is_err());
/// assert!(normalize("mailto:a@b.com", "example.com").is_err());
/// ```
pub fn normalize(href: &str, target_host: &str) -> UrlResult<Address> {
    normalize_with_scheme(href, target_host, DEFAULT_SCHEME)
}

/// Normalizes a discovered href into a canonical same-host address
///
/// # Rules
///
/// 1. Empty or whitespace-only input is rejected
/// 2. Input without a host is resolved against `scheme://target_host/`
/// 3. Schemes that do not contain `http` are rejected (`mailto:`, `ftp:`, ...)
/// 4. A host other than `target_host` is rejected
/// 5. An empty path or `/` is rejected: the root is only reachable as a seed
/// 6. Query and fragment are dropped
///
/// Never performs I/O; safe to call from any worker.
pub fn normalize_with_scheme(href: &str, target_host: &str, scheme: &str) -> UrlResult<Address> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = match Url::parse(href) {
        Ok(url) => url,
        // No scheme and no host: the link is relative to the target host
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(&format!("{}://{}/", scheme, target_host))
                .map_err(|e| UrlError::Parse(e.to_string()))?;
            base.join(href).map_err(|e| UrlError::Parse(e.to_string()))?
        }
        Err(e) => return Err(UrlError::Parse(e.to_string())),
    };

    if !url.scheme().contains("http") {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = authority(&url).ok_or(UrlError::MissingHost)?;
    if !host.eq_ignore_ascii_case(target_host) {
        return Err(UrlError::ForeignHost {
            host,
            target: target_host.to_string(),
        });
    }

    if url.path().is_empty() || url.path() == "/" {
        return Err(UrlError::RootPath);
    }

    Ok(Address::from_url(url))
}

use crate::url::{authority, DEFAULT_SCHEME};
use crate::{UrlError, UrlResult};
use std::fmt;
use url::{ParseError, Url};

/// A canonical, absolute crawl address
///
/// An address holds a scheme, a host and a path. Query and fragment are
/// stripped, so two addresses are equal exactly when their string forms are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(Url);

impl Address {
    /// Wraps a parsed URL, dropping the parts that are not part of the key
    pub(crate) fn from_url(mut url: Url) -> Self {
        url.set_query(None);
        url.set_fragment(None);
        Self(url)
    }

    /// Parses the seed address a crawl starts from
    ///
    /// Unlike discovered links the seed may be the host root. A missing scheme
    /// defaults to `https`; a seed without a host is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use host_crawl::url::Address;
    ///
    /// let seed = Address::parse_seed("example.com").unwrap();
    /// assert_eq!(seed.as_str(), "https://example.com/");
    /// ```
    pub fn parse_seed(raw: &str) -> UrlResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(UrlError::Empty);
        }

        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&format!("{}://{}", DEFAULT_SCHEME, raw))
                    .map_err(|e| UrlError::Parse(e.to_string()))?
            }
            Err(e) => return Err(UrlError::Parse(e.to_string())),
        };

        if !url.scheme().contains("http") {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        if authority(&url).is_none() {
            return Err(UrlError::MissingHost);
        }

        Ok(Self::from_url(url))
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The authority (host plus non-default port) of this address
    pub fn host(&self) -> String {
        authority(&self.0).unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! HTML parser for extracting same-host links
//!
//! Only `<a href="...">` elements are read. Each href goes through the
//! target's normalizer; rejected hrefs are dropped without a trace beyond a
//! trace-level log line.

use crate::url::{Address, Target};
use scraper::{Html, Selector};

/// Extracts the same-host addresses linked from a page body
///
/// The result keeps document order and may contain duplicates; deduplication
/// belongs to the visited set. Bodies that are not valid UTF-8 are decoded
/// lossily, and broken markup simply yields whatever anchors the parser
/// recovered.
///
/// # Example
///
/// ```
/// use host_crawl::crawler::extract_links;
/// use host_crawl::url::Target;
///
/// let html = br#"<a href="/docs">Docs</a><a href="https://other.com/x">Other</a>"#;
/// let links = extract_links(html, &Target::new("example.com"));
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/docs");
/// ```
pub fn extract_links(body: &[u8], target: &Target) -> Vec<Address> {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchor_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| match target.normalize(href) {
            Ok(address) => Some(address),
            Err(reason) => {
                tracing::trace!("Dropping link {:?}: {}", href, reason);
                None
            }
        })
        .collect()
}

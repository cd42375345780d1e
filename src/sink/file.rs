use crate::sink::{PageSink, SinkError, SinkResult};
use crate::url::Address;
use std::path::PathBuf;

/// Writes pages below a root directory, one `index.html` per address
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the page for `address` is stored
    ///
    /// ```
    /// use host_crawl::sink::FileSink;
    /// use host_crawl::url::Address;
    /// use std::path::Path;
    ///
    /// let sink = FileSink::new("/tmp/scraper");
    /// let address = Address::parse_seed("https://example.com/docs/intro").unwrap();
    /// assert_eq!(
    ///     sink.page_path(&address),
    ///     Path::new("/tmp/scraper/example.com/docs/intro/index.html")
    /// );
    /// ```
    pub fn page_path(&self, address: &Address) -> PathBuf {
        let mut path = self.root.join(address.host());
        // Only plain segments: the path can never climb out of the host directory
        for segment in address.path().split('/') {
            if !matches!(segment, "" | "." | "..") {
                path.push(segment);
            }
        }
        path.push("index.html");
        path
    }
}

impl PageSink for FileSink {
    fn save(&self, address: &Address, body: &[u8]) -> SinkResult<PathBuf> {
        let file_path = self.page_path(address);

        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| SinkError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(&file_path, body).map_err(|source| SinkError::Write {
            path: file_path.clone(),
            source,
        })?;

        Ok(file_path)
    }
}

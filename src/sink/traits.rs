//! Sink trait and error types

use crate::url::Address;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a page
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Sink rejected {url}: {message}")]
    Rejected { url: String, message: String },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for fetched pages
///
/// Called once per fetched page from any worker, so implementations must be
/// safe to share between threads. A failed save is logged by the caller and
/// does not count toward the page limit.
pub trait PageSink: Send + Sync + 'static {
    /// Persists `body` for `address` and returns where it went
    fn save(&self, address: &Address, body: &[u8]) -> SinkResult<PathBuf>;
}

//! Page sink module for persisting fetched pages
//!
//! The crawler hands every fetched body to a [`PageSink`]. The default sink,
//! [`FileSink`], mirrors the site layout on disk:
//! `<root>/<host>/<path segments>/index.html`.

mod file;
mod traits;

pub use file::FileSink;
pub use traits::{PageSink, SinkError, SinkResult};

pub mod config;
pub mod logging;

pub mod batch;
pub mod downloader;
pub mod fetch_head;
pub mod format;
pub mod progress;
pub mod retry;
pub mod transport;
pub mod url_model;

pub use downloader::{download, DownloadOutcome, DownloadRequest};
pub use retry::DownloadError;

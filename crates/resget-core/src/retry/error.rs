//! Download error type shared by the prober, the transfer engine and the retry loop.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Error returned by one probe+transfer attempt, or by the retry loop once it gives up.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Curl reported an error (timeout, connection, proxy, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),

    /// URL could not be mapped to a local target.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP response had a non-2xx status.
    #[error("{method} {url} returned HTTP {status}")]
    Http {
        method: &'static str,
        url: String,
        status: u32,
    },

    /// Local target could not be created, opened, sized or written.
    #[error("local file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The local file is larger than the remote resource. Never retried.
    #[error(
        "local file {} is {local_size} bytes but the server reports {remote_size}; refusing to resume",
        .path.display()
    )]
    InconsistentLocalState {
        path: PathBuf,
        local_size: u64,
        remote_size: u64,
    },

    /// The blocking transfer task panicked or was cancelled.
    #[error("transfer task failed: {0}")]
    Task(String),

    /// The retry ceiling elapsed without a successful attempt.
    #[error("giving up after {attempts} attempt(s) over {elapsed:?}: {last}")]
    RetriesExhausted {
        attempts: u32,
        elapsed: Duration,
        #[source]
        last: Box<DownloadError>,
    },
}

impl DownloadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DownloadError::Io {
            path: path.into(),
            source,
        }
    }
}

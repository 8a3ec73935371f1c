//! HTTP HEAD capability probing.
//!
//! Uses the curl crate (libcurl) to learn the remote size, whether byte
//! ranges are accepted, and any filename the server suggests. No files are
//! touched and nothing is retried here. A server that refuses HEAD yields
//! an unknown-size, no-range descriptor so the caller downloads in full.

mod parse;

use std::str;

use crate::retry::DownloadError;
use crate::transport::Transport;

/// What the server told us about a resource. Valid for one attempt only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteResource {
    /// `Content-Length` in bytes; 0 when missing, non-numeric or reported as 0.
    pub total_size: u64,
    /// True only if the server sent `Accept-Ranges: bytes`.
    pub accepts_ranges: bool,
    /// Filename from `Content-Disposition`, if any.
    pub suggested_filename: Option<String>,
}

impl RemoteResource {
    /// A zero size is never trusted as real content length.
    pub fn size_known(&self) -> bool {
        self.total_size > 0
    }
}

/// Statuses meaning the server will not answer HEAD at all, as opposed to
/// the resource being unavailable. 5xx and 429 stay errors.
fn head_blocked(status: u32) -> bool {
    matches!(status, 403 | 405 | 501)
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects; only the final response's headers are used. Runs in
/// the current thread; call from `spawn_blocking` if used from async code.
pub fn probe(url: &str, transport: &Transport) -> Result<RemoteResource, DownloadError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = transport.easy(url)?;
    easy.nobody(true)?; // HEAD request

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                // A new status line starts the headers of the next response in a redirect chain.
                if s.starts_with("HTTP/") {
                    headers.clear();
                }
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    if head_blocked(status) {
        tracing::warn!(
            url,
            status,
            "server refuses HEAD; size and range support unknown, falling back to a full GET"
        );
        return Ok(RemoteResource::default());
    }
    if !(200..300).contains(&status) {
        return Err(DownloadError::Http {
            method: "HEAD",
            url: url.to_string(),
            status,
        });
    }

    let remote = parse::parse_headers(&headers);
    tracing::debug!(
        url,
        total_size = remote.total_size,
        accepts_ranges = remote.accepts_ranges,
        suggested_filename = remote.suggested_filename.as_deref(),
        "probed"
    );
    Ok(remote)
}

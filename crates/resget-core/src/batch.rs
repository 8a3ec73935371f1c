//! URL-list driver: one URL at a time, each isolated from the others.

use std::io::BufRead;
use std::path::Path;
use std::time::{Duration, Instant};

use thiserror::Error;
use url::Url;

use crate::config::ResgetConfig;
use crate::downloader::{self, DownloadOutcome, DownloadRequest};
use crate::progress::ProgressSender;
use crate::retry::DownloadError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("not a URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported scheme {0:?} (expected http or https)")]
    Scheme(String),
    #[error("URL has no host")]
    NoHost,
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn validate_url(input: &str) -> Result<Url, UrlError> {
    let url = Url::parse(input)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::Scheme(url.scheme().to_string()));
    }
    match url.host_str() {
        Some(h) if !h.is_empty() => Ok(url),
        _ => Err(UrlError::NoHost),
    }
}

/// Yields `(line_number, trimmed_line)` for each line of `reader` (1-based).
/// A read error ends the list with a warning.
pub fn read_url_lines<R: BufRead>(reader: R) -> impl Iterator<Item = (usize, String)> {
    reader
        .lines()
        .enumerate()
        .map_while(|(i, line)| match line {
            Ok(l) => Some((i + 1, l.trim().to_string())),
            Err(e) => {
                tracing::warn!("stopped reading URL list at line {}: {}", i + 1, e);
                None
            }
        })
}

/// Counts per outcome for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub already_complete: usize,
    pub failed: usize,
    /// Invalid lines that were not attempted.
    pub skipped: usize,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.completed + self.already_complete + self.failed
    }
}

/// Settings shared by every URL of a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions<'a> {
    pub output_dir: &'a Path,
    pub use_proxy: bool,
    pub retry_delay_hint: Duration,
    pub config: &'a ResgetConfig,
}

/// Downloads every valid URL in `lines` in order; blank lines are ignored,
/// invalid ones are logged and skipped. A failed URL never stops the batch.
/// `on_result` sees each attempted URL with its final result.
pub async fn run_batch<I, F>(
    lines: I,
    opts: &BatchOptions<'_>,
    progress: Option<ProgressSender>,
    mut on_result: F,
) -> BatchSummary
where
    I: IntoIterator<Item = (usize, String)>,
    F: FnMut(&str, &Result<DownloadOutcome, DownloadError>),
{
    let started = Instant::now();
    let mut summary = BatchSummary::default();

    for (line_number, line) in lines {
        if line.is_empty() {
            continue;
        }
        if let Err(e) = validate_url(&line) {
            tracing::warn!("invalid URL on line {} ({}), skipping", line_number, e);
            summary.skipped += 1;
            continue;
        }

        let request = DownloadRequest::new(line.as_str(), opts.output_dir)
            .with_proxy(opts.use_proxy)
            .with_retry_delay_hint(opts.retry_delay_hint);
        let result = downloader::download(&request, opts.config, progress.clone()).await;
        match &result {
            Ok(DownloadOutcome::Completed { .. }) => summary.completed += 1,
            Ok(DownloadOutcome::AlreadyComplete { .. }) => summary.already_complete += 1,
            Err(e) => {
                tracing::error!("{} failed: {}", line, e);
                summary.failed += 1;
            }
        }
        on_result(&line, &result);
    }

    summary.elapsed = started.elapsed();
    summary
}

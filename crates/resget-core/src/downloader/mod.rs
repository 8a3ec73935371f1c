//! Resumable transfer engine.
//!
//! One attempt = probe, map the URL to its local target, decide between a
//! full transfer and a resume from the on-disk size, then stream the body.
//! [`download`] wraps attempts in the retry loop; every retry starts over
//! from the probe because the server and the local file may have changed.

mod plan;
mod stream;

pub use plan::{decide, ResumeDecision, TransferMode, TransferPlan};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::ResgetConfig;
use crate::fetch_head;
use crate::progress::ProgressSender;
use crate::retry::{run_with_retry, BackoffPolicy, DownloadError};
use crate::transport::Transport;
use crate::url_model;

/// Body read size in bytes (curl receive buffer).
pub const CHUNK_SIZE: usize = 1024;

/// One URL to materialize under `output_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub output_dir: PathBuf,
    /// Route the probe and the transfer through the configured proxy.
    pub use_proxy: bool,
    /// Legacy fixed retry delay; the backoff policy decides actual waits.
    pub retry_delay_hint: Duration,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            use_proxy: false,
            retry_delay_hint: Duration::from_secs(5),
        }
    }

    pub fn with_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    pub fn with_retry_delay_hint(mut self, hint: Duration) -> Self {
        self.retry_delay_hint = hint;
        self
    }
}

/// Successful end of a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Bytes were streamed in the final attempt.
    Completed { path: PathBuf, bytes: u64 },
    /// The local file already matched the remote size; no GET was sent.
    AlreadyComplete { path: PathBuf },
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DownloadOutcome::Completed { path, .. } | DownloadOutcome::AlreadyComplete { path } => {
                path
            }
        }
    }
}

fn local_size(path: &Path) -> Result<Option<u64>, DownloadError> {
    match fs::metadata(path) {
        Ok(m) => Ok(Some(m.len())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DownloadError::io(path, e)),
    }
}

/// Runs a single probe+transfer attempt. Blocking; no retries. Call it from
/// a plain thread or `spawn_blocking`, never directly on the async runtime.
pub fn run_attempt(
    request: &DownloadRequest,
    transport: &Transport,
    progress: Option<&ProgressSender>,
) -> Result<DownloadOutcome, DownloadError> {
    let url = request.url.as_str();
    let remote = fetch_head::probe(url, transport)?;
    if remote.accepts_ranges {
        tracing::info!("server supports partial content retrieval");
    } else {
        tracing::warn!("server does not support partial content retrieval");
    }

    let path = url_model::local_target(
        url,
        &request.output_dir,
        remote.suggested_filename.as_deref(),
    )
    .ok_or_else(|| DownloadError::InvalidUrl(url.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DownloadError::io(parent, e))?;
    }

    let plan = match decide(&remote, local_size(&path)?, &path)? {
        ResumeDecision::AlreadyComplete => {
            tracing::info!("{} has already been downloaded", path.display());
            return Ok(DownloadOutcome::AlreadyComplete { path });
        }
        ResumeDecision::Transfer(plan) => plan,
    };

    match plan.mode {
        TransferMode::Full => {
            tracing::info!("downloading {} to {}", url, path.display());
            if plan.expected_remaining.is_none() {
                tracing::warn!("server reported no usable size; progress will show bandwidth only");
            }
        }
        TransferMode::Resume => tracing::info!(
            offset = plan.offset,
            remaining = plan.expected_remaining,
            "resuming download from {} to {}",
            url,
            path.display()
        ),
    }

    let bytes = stream::stream_to_file(url, transport, &path, plan, progress)?;
    tracing::info!(bytes, "{} downloaded successfully", url);
    Ok(DownloadOutcome::Completed { path, bytes })
}

/// Downloads `request` with the retry policy from `cfg`.
pub async fn download(
    request: &DownloadRequest,
    cfg: &ResgetConfig,
    progress: Option<ProgressSender>,
) -> Result<DownloadOutcome, DownloadError> {
    download_with_policy(request, cfg, &cfg.backoff_policy(), progress).await
}

/// Like [`download`] with an explicit backoff policy.
///
/// Each attempt runs on the blocking pool; the transport (and therefore the
/// proxy choice) is built once per attempt and shared by probe and GET.
pub async fn download_with_policy(
    request: &DownloadRequest,
    cfg: &ResgetConfig,
    policy: &BackoffPolicy,
    progress: Option<ProgressSender>,
) -> Result<DownloadOutcome, DownloadError> {
    tracing::debug!(
        url = %request.url,
        hint = ?request.retry_delay_hint,
        "retry delay hint is advisory; exponential backoff applies"
    );
    run_with_retry(policy, |attempt| {
        let request = request.clone();
        let transport = Transport::from_config(cfg, request.use_proxy);
        let progress = progress.clone();
        async move {
            if attempt > 1 {
                tracing::info!(attempt, "retrying {}", request.url);
            }
            tokio::task::spawn_blocking(move || {
                run_attempt(&request, &transport, progress.as_ref())
            })
            .await
            .map_err(|e| DownloadError::Task(e.to_string()))?
        }
    })
    .await
}

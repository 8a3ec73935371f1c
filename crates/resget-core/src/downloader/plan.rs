//! Full-vs-resume decision for one attempt.

use std::path::Path;

use crate::fetch_head::RemoteResource;
use crate::retry::DownloadError;

/// How the local target is opened for this attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Truncate/create and write from offset 0.
    Full,
    /// Append, requesting bytes from `offset` onwards.
    Resume,
}

/// Transfer state computed fresh at the start of every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    pub mode: TransferMode,
    /// Byte offset of the range request (0 for a full transfer).
    pub offset: u64,
    /// Bytes this attempt should write; `None` when the remote size is untrusted.
    pub expected_remaining: Option<u64>,
    /// Remote size as probed (0 = unknown).
    pub remote_size: u64,
}

impl TransferPlan {
    pub fn full(remote: &RemoteResource) -> Self {
        Self {
            mode: TransferMode::Full,
            offset: 0,
            expected_remaining: remote.size_known().then_some(remote.total_size),
            remote_size: remote.total_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeDecision {
    Transfer(TransferPlan),
    /// Local file already has every byte; no GET is issued.
    AlreadyComplete,
}

/// Decides between a full transfer and a resume from the local file size.
///
/// `local_size` is `None` when the target does not exist. A local file
/// larger than the remote resource is an error and the file is left alone.
pub fn decide(
    remote: &RemoteResource,
    local_size: Option<u64>,
    path: &Path,
) -> Result<ResumeDecision, DownloadError> {
    let local_size = match local_size {
        Some(n) if remote.accepts_ranges && remote.size_known() => n,
        _ => return Ok(ResumeDecision::Transfer(TransferPlan::full(remote))),
    };

    if local_size > remote.total_size {
        return Err(DownloadError::InconsistentLocalState {
            path: path.to_path_buf(),
            local_size,
            remote_size: remote.total_size,
        });
    }
    if local_size == remote.total_size {
        return Ok(ResumeDecision::AlreadyComplete);
    }
    Ok(ResumeDecision::Transfer(TransferPlan {
        mode: TransferMode::Resume,
        offset: local_size,
        expected_remaining: Some(remote.total_size - local_size),
        remote_size: remote.total_size,
    }))
}

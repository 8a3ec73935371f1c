//! Progress reporting for a single transfer (percent, bandwidth).
//!
//! The transfer sends a snapshot after every chunk; consumers render it.

use std::time::Duration;

/// Channel the transfer engine pushes snapshots into (dropped when full).
pub type ProgressSender = tokio::sync::mpsc::Sender<ProgressSnapshot>;

/// Progress of the current attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Bytes written during this attempt.
    pub bytes_transferred: u64,
    /// Bytes this attempt is expected to write; `None` when the remote size is unknown.
    pub expected_remaining: Option<u64>,
    /// Time since the attempt's GET was issued.
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Percent complete, or `None` when the remote size is unknown.
    pub fn percent(&self) -> Option<f64> {
        match self.expected_remaining {
            Some(total) if total > 0 => {
                Some(self.bytes_transferred as f64 / total as f64 * 100.0)
            }
            _ => None,
        }
    }

    /// Bytes per second, or `None` before any time has elapsed.
    pub fn bandwidth(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return None;
        }
        Some(self.bytes_transferred as f64 / secs)
    }

    /// True when the percentage cannot be trusted.
    pub fn size_unknown(&self) -> bool {
        self.percent().is_none()
    }
}

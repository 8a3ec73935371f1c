use std::time::Duration;

/// High-level classification of an error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read/low-speed).
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, proxy, etc.).
    Connection,
    /// Any other non-2xx HTTP status.
    Http(u16),
    /// Local file could not be opened or written.
    Storage,
    /// Local file larger than the remote resource.
    InconsistentState,
    /// Input the core cannot act on (e.g. an unparseable URL).
    InvalidInput,
    /// Anything else.
    Other,
}

impl ErrorKind {
    /// Everything except bad input and an oversized local file is retried;
    /// a retry cannot shrink the file.
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::InconsistentState | ErrorKind::InvalidInput)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff bounded by a per-delay cap and an overall deadline.
///
/// Delay for attempt `n` (1-based) is `multiplier * 2^(n-1)`, capped at
/// `max_delay`. Retrying stops once `give_up_after` has elapsed since the
/// first attempt started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub multiplier: Duration,
    pub max_delay: Duration,
    pub give_up_after: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            multiplier: Duration::from_secs(2),
            max_delay: Duration::from_secs(30 * 60),
            give_up_after: Duration::from_secs(3 * 24 * 3600),
        }
    }
}

impl BackoffPolicy {
    /// Backoff delay after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(31);
        self.multiplier
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }

    /// Decide whether to retry after `attempt` failed with `kind`, `elapsed`
    /// after the first attempt started.
    pub fn decide(&self, attempt: u32, elapsed: Duration, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() || elapsed >= self.give_up_after {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay_for(attempt))
    }
}

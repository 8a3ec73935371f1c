//! Retry loop: re-run a whole attempt until success, a permanent error, or the deadline.

use std::future::Future;
use std::time::Instant;

use super::classify;
use super::error::DownloadError;
use super::policy::{BackoffPolicy, RetryDecision};

/// Runs `attempt_fn` until it succeeds or the policy says to stop.
///
/// `attempt_fn` receives the 1-based attempt number. On a retryable failure
/// the loop logs the attempt and wait, then sleeps for the backoff delay.
/// Permanent errors are returned as-is; an exhausted deadline is wrapped in
/// [`DownloadError::RetriesExhausted`].
pub async fn run_with_retry<T, F, Fut>(
    policy: &BackoffPolicy,
    mut attempt_fn: F,
) -> Result<T, DownloadError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, DownloadError>>,
{
    let started = Instant::now();
    let mut attempt = 1u32;
    loop {
        let err = match attempt_fn(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        let kind = classify::classify(&err);
        let elapsed = started.elapsed();
        match policy.decide(attempt, elapsed, kind) {
            RetryDecision::NoRetry if kind.is_retryable() => {
                return Err(DownloadError::RetriesExhausted {
                    attempts: attempt,
                    elapsed,
                    last: Box::new(err),
                });
            }
            RetryDecision::NoRetry => return Err(err),
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(
                    attempt,
                    ?kind,
                    "retry attempt {}: {}; waiting {:.1} seconds before next attempt",
                    attempt,
                    err,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

//! Retry and backoff policy.
//!
//! Error classification and exponential backoff decisions for the
//! probe+transfer sequence. The whole attempt is retried, never a single
//! chunk, so every retry re-probes and re-evaluates the on-disk state.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::DownloadError;
pub use policy::{BackoffPolicy, ErrorKind, RetryDecision};
pub use run::run_with_retry;

//! Classify HTTP status and curl errors into retry policy error kinds.

use super::error::DownloadError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        _ => ErrorKind::Http(code as u16),
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a download error into an ErrorKind.
pub fn classify(e: &DownloadError) -> ErrorKind {
    match e {
        DownloadError::Curl(ce) => classify_curl_error(ce),
        DownloadError::Http { status, .. } => classify_http_status(*status),
        DownloadError::InvalidUrl(_) => ErrorKind::InvalidInput,
        DownloadError::Io { .. } => ErrorKind::Storage,
        DownloadError::InconsistentLocalState { .. } => ErrorKind::InconsistentState,
        DownloadError::Task(_) => ErrorKind::Other,
        DownloadError::RetriesExhausted { last, .. } => classify(last),
    }
}

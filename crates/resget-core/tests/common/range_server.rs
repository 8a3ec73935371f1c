//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body for every path and records each request it
//! receives, so tests can assert on methods and Range headers.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// What the server puts in `Content-Length` on HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadLength {
    Actual,
    Zero,
    Missing,
}

#[derive(Debug, Clone)]
pub struct RangeServerOptions {
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// If false, omit `Accept-Ranges: bytes` header even if ranges work.
    pub advertise_ranges: bool,
    pub head_length: HeadLength,
    /// Sent verbatim as the `Content-Disposition` header value on HEAD.
    pub content_disposition: Option<String>,
    /// Answer this many requests with 503 before behaving normally.
    pub fail_first: usize,
    /// If false, HEAD returns 405 (GET still works).
    pub head_allowed: bool,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            advertise_ranges: true,
            head_length: HeadLength::Actual,
            content_disposition: None,
            fail_first: 0,
            head_allowed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Raw `Range` header value, if sent.
    pub range: Option<String>,
}

pub struct RangeServer {
    /// Base URL ending in `/`, e.g. `http://127.0.0.1:12345/`.
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RangeServer {
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.url, path.trim_start_matches('/'))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method.eq_ignore_ascii_case(method))
            .count()
    }

    pub fn gets(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "GET")
            .collect()
    }
}

/// Starts a server in a background thread serving `body`. The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let served = Arc::new(AtomicUsize::new(0));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = Arc::clone(&opts);
            let log = Arc::clone(&log);
            let served = Arc::clone(&served);
            thread::spawn(move || handle(stream, &body, &opts, &log, &served));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: &RangeServerOptions,
    log: &Mutex<Vec<RecordedRequest>>,
    served: &AtomicUsize,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let recorded = parse_request(request);
    log.lock().unwrap().push(recorded.clone());

    if served.fetch_add(1, Ordering::SeqCst) < opts.fail_first {
        let _ = stream.write_all(
            b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }

    let total = body.len() as u64;
    let accept_ranges = if opts.advertise_ranges {
        "Accept-Ranges: bytes\r\n"
    } else {
        ""
    };

    if recorded.method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_allowed {
            let _ = stream.write_all(
                b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
        let length = match opts.head_length {
            HeadLength::Actual => format!("Content-Length: {}\r\n", total),
            HeadLength::Zero => "Content-Length: 0\r\n".to_string(),
            HeadLength::Missing => String::new(),
        };
        let disposition = opts
            .content_disposition
            .as_ref()
            .map(|v| format!("Content-Disposition: {}\r\n", v))
            .unwrap_or_default();
        let response = format!(
            "HTTP/1.1 200 OK\r\n{}{}{}Connection: close\r\n\r\n",
            length, accept_ranges, disposition
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if recorded.method.eq_ignore_ascii_case("GET") {
        let start = recorded
            .range
            .as_deref()
            .filter(|_| opts.support_ranges)
            .and_then(parse_range_start);
        let (status, content_range, slice) = match start {
            Some(start) if start >= total => (
                "416 Range Not Satisfiable",
                format!("Content-Range: bytes */{}\r\n", total),
                &body[0..0],
            ),
            Some(start) => (
                "206 Partial Content",
                format!(
                    "Content-Range: bytes {}-{}/{}\r\n",
                    start,
                    total.saturating_sub(1),
                    total
                ),
                &body[start as usize..],
            ),
            None => ("200 OK", String::new(), body),
        };
        let length = if opts.head_length == HeadLength::Missing {
            String::new()
        } else {
            format!("Content-Length: {}\r\n", slice.len())
        };
        let response = format!(
            "HTTP/1.1 {}\r\n{}{}{}Connection: close\r\n\r\n",
            status, length, content_range, accept_ranges
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(slice);
        return;
    }
    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
}

/// Start offset of an open-ended `bytes=N-` range.
fn parse_range_start(value: &str) -> Option<u64> {
    let value = value.trim();
    if !value.to_ascii_lowercase().starts_with("bytes=") {
        return None;
    }
    let (start, _) = value[6..].split_once('-')?;
    start.trim().parse().ok()
}

fn parse_request(request: &str) -> RecordedRequest {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_string();
    let path = first.next().unwrap_or("").to_string();
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                range = Some(value.trim().to_string());
            }
        }
    }
    RecordedRequest {
        method,
        path,
        range,
    }
}

//! Streamed HTTP GET into the local target, optionally from a byte offset.

use std::cell::Cell;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str;
use std::time::Instant;

use super::plan::{TransferMode, TransferPlan};
use super::CHUNK_SIZE;
use crate::progress::{ProgressSender, ProgressSnapshot};
use crate::retry::DownloadError;
use crate::transport::Transport;

/// Writes the body to the target, opening it lazily on the first chunk so a
/// failed connection never truncates an existing file.
struct Sink<'a> {
    path: &'a Path,
    plan: TransferPlan,
    file: Option<BufWriter<File>>,
    written: u64,
    started: Instant,
    progress: Option<&'a ProgressSender>,
    error: Option<std::io::Error>,
}

impl<'a> Sink<'a> {
    fn new(path: &'a Path, plan: TransferPlan, progress: Option<&'a ProgressSender>) -> Self {
        Self {
            path,
            plan,
            file: None,
            written: 0,
            started: Instant::now(),
            progress,
            error: None,
        }
    }

    fn open(&mut self, status: u32) -> std::io::Result<BufWriter<File>> {
        if self.plan.mode == TransferMode::Resume && status == 200 {
            tracing::warn!(
                "server ignored the range request; rewriting {} from the start",
                self.path.display()
            );
            self.plan.mode = TransferMode::Full;
            self.plan.offset = 0;
            self.plan.expected_remaining = (self.plan.remote_size > 0).then_some(self.plan.remote_size);
        }
        let file = match self.plan.mode {
            TransferMode::Full => File::create(self.path)?,
            TransferMode::Resume => OpenOptions::new().append(true).open(self.path)?,
        };
        Ok(BufWriter::with_capacity(CHUNK_SIZE * 64, file))
    }

    /// Returns the number of bytes consumed; anything short of `data.len()` aborts the transfer.
    fn write(&mut self, status: u32, data: &[u8]) -> usize {
        if self.file.is_none() {
            match self.open(status) {
                Ok(f) => self.file = Some(f),
                Err(e) => {
                    self.error = Some(e);
                    return 0;
                }
            }
        }
        let Some(file) = self.file.as_mut() else {
            return 0;
        };
        if let Err(e) = file.write_all(data) {
            self.error = Some(e);
            return 0;
        }
        self.written += data.len() as u64;
        self.report();
        data.len()
    }

    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            bytes_transferred: self.written,
            expected_remaining: self.plan.expected_remaining,
            elapsed: self.started.elapsed(),
        }
    }

    /// Per-chunk update; dropped if the consumer is behind.
    fn report(&self) {
        if let Some(tx) = self.progress {
            let _ = tx.try_send(self.snapshot());
        }
    }

    /// Flush and close. An empty body still leaves a (truncated) file behind.
    ///
    /// The final snapshot is sent with `blocking_send` so it is never dropped;
    /// must not be called from inside an async context.
    fn finish(mut self, status: u32) -> Result<u64, DownloadError> {
        let file = match self.file.take() {
            Some(f) => f,
            None => self.open(status).map_err(|e| DownloadError::io(self.path, e))?,
        };
        let file = file
            .into_inner()
            .map_err(|e| DownloadError::io(self.path, e.into_error()))?;
        file.sync_data().map_err(|e| DownloadError::io(self.path, e))?;
        if let Some(tx) = self.progress {
            let _ = tx.blocking_send(self.snapshot());
        }
        Ok(self.written)
    }
}

/// Extracts the status code from an `HTTP/x.y NNN ...` header line.
fn status_from_line(line: &[u8]) -> Option<u32> {
    let line = str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

/// GETs `url` into `path` according to `plan`, reading the body in
/// [`CHUNK_SIZE`] pieces and reporting progress after each one.
/// Returns the number of bytes written during this attempt.
pub(super) fn stream_to_file(
    url: &str,
    transport: &Transport,
    path: &Path,
    plan: TransferPlan,
    progress: Option<&ProgressSender>,
) -> Result<u64, DownloadError> {
    let mut easy = transport.easy(url)?;
    easy.buffer_size(CHUNK_SIZE)?;
    easy.fail_on_error(true)?;
    if plan.mode == TransferMode::Resume {
        // Sends `Range: bytes=<offset>-`.
        easy.range(&format!("{}-", plan.offset))?;
    }

    let status = Cell::new(0u32);
    let mut sink = Sink::new(path, plan, progress);

    let result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Some(code) = status_from_line(line) {
                status.set(code);
            }
            true
        })?;
        transfer.write_function(|data| Ok(sink.write(status.get(), data)))?;
        transfer.perform()
    };

    if let Err(e) = result {
        if e.is_write_error() {
            if let Some(io_err) = sink.error.take() {
                return Err(DownloadError::io(path, io_err));
            }
        }
        if e.is_http_returned_error() {
            return Err(DownloadError::Http {
                method: "GET",
                url: url.to_string(),
                status: easy.response_code()?,
            });
        }
        return Err(e.into());
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(DownloadError::Http {
            method: "GET",
            url: url.to_string(),
            status: code,
        });
    }

    sink.finish(code)
}

//! Console progress line, rewritten in place.

use resget_core::format::{friendly_bandwidth, friendly_bytes};
use resget_core::progress::{ProgressSender, ProgressSnapshot};
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const PRINT_INTERVAL: Duration = Duration::from_millis(200);

/// Renders one progress line (without the leading `\r`).
pub(super) fn render(s: &ProgressSnapshot) -> String {
    let bandwidth = s
        .bandwidth()
        .map(friendly_bandwidth)
        .unwrap_or_else(|| "-".to_string());
    match s.percent() {
        Some(pct) => format!("Download progress: {:.2}% -- Bandwidth: {}", pct, bandwidth),
        None => format!(
            "Downloaded {} -- Bandwidth: {} (unreliable: remote size unknown)",
            friendly_bytes(s.bytes_transferred),
            bandwidth
        ),
    }
}

/// Spawns the printer; it exits once every sender is dropped.
pub(super) fn spawn_printer() -> (ProgressSender, JoinHandle<()>) {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<ProgressSnapshot>(64);
    let handle = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        while let Some(s) = rx.recv().await {
            let done = s.expected_remaining == Some(s.bytes_transferred);
            if !done && last_print.is_some_and(|t| t.elapsed() < PRINT_INTERVAL) {
                continue;
            }
            print!("\r{}  ", render(&s));
            let _ = std::io::stdout().flush();
            last_print = Some(Instant::now());
        }
    });
    (tx, handle)
}

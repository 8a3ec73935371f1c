//! CLI for resget.

mod progress;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use resget_core::batch::{self, BatchOptions, BatchSummary};
use resget_core::config::{self, ResgetConfig};
use resget_core::format::{friendly_bytes, friendly_time};
use resget_core::{downloader, logging, DownloadError, DownloadOutcome, DownloadRequest};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Download files over HTTP(S), resuming partial files and retrying with backoff.
#[derive(Debug, Parser)]
#[command(name = "resget", version)]
#[command(about = "Resumable HTTP(S) downloader with retry and optional SOCKS proxy", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
pub struct Cli {
    /// URL of the file to download.
    #[arg(short, long)]
    pub url: Option<String>,

    /// File containing URLs to download, one per line.
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Route all requests through the configured SOCKS proxy (Tor by default).
    #[arg(long)]
    pub tor: bool,

    /// Local directory where files are saved (default: ./downloaded).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Seconds to wait before retrying a failed attempt (advisory; backoff applies).
    #[arg(short, long, default_value = "5", value_name = "SECS")]
    pub retry_delay: u64,
}

impl Cli {
    fn output_dir(&self) -> Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?.join("downloaded")),
        }
    }
}

pub async fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    let config_path = config::config_path().context("locating config")?;
    let (cfg, created) = config::load_or_init(&config_path).context("loading config")?;
    logging::init(cfg.log_to_file);
    if created {
        tracing::info!("created default config at {}", config_path.display());
    }
    tracing::debug!("loaded config: {:?}", cfg);

    if let Some(url) = &cli.url {
        if let Err(e) = batch::validate_url(url) {
            bail!("please provide a valid URL such as https://example.com/file ({})", e);
        }
    }

    let output_dir = cli.output_dir()?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("could not create directory {}", output_dir.display()))?;

    let started = Instant::now();
    let (progress_tx, progress_handle) = progress::spawn_printer();
    let result = run(&cli, &cfg, &output_dir, progress_tx).await;
    let _ = progress_handle.await;

    println!();
    println!("------------------------------");
    println!();
    println!("Total download time: {}", friendly_time(started.elapsed()));
    result
}

async fn run(
    cli: &Cli,
    cfg: &ResgetConfig,
    output_dir: &Path,
    progress_tx: resget_core::progress::ProgressSender,
) -> Result<()> {
    let retry_delay_hint = Duration::from_secs(cli.retry_delay);

    if let Some(path) = &cli.file {
        let file = File::open(path)
            .with_context(|| format!("please provide a valid file path ({})", path.display()))?;
        let opts = BatchOptions {
            output_dir,
            use_proxy: cli.tor,
            retry_delay_hint,
            config: cfg,
        };
        let summary = batch::run_batch(
            batch::read_url_lines(BufReader::new(file)),
            &opts,
            Some(progress_tx),
            report,
        )
        .await;
        print_summary(&summary);
        return Ok(());
    }

    let Some(url) = &cli.url else {
        bail!("either --url or --file is required");
    };
    let request = DownloadRequest::new(url.as_str(), output_dir)
        .with_proxy(cli.tor)
        .with_retry_delay_hint(retry_delay_hint);
    let result = downloader::download(&request, cfg, Some(progress_tx)).await;
    single_result(url, result)
}

/// A standalone URL prints its success line here; a failure is returned and
/// printed once by `main`.
fn single_result(url: &str, result: Result<DownloadOutcome, DownloadError>) -> Result<()> {
    let outcome = result.with_context(|| format!("{} FAILED", url))?;
    report_outcome(url, &outcome);
    Ok(())
}

/// Terminal line for one URL of a batch.
fn report(url: &str, result: &Result<DownloadOutcome, DownloadError>) {
    match result {
        Ok(outcome) => report_outcome(url, outcome),
        Err(e) => println!("\r{} FAILED: {}", url, e),
    }
}

fn report_outcome(url: &str, outcome: &DownloadOutcome) {
    match outcome {
        DownloadOutcome::Completed { path, bytes } => println!(
            "\r{} downloaded successfully ({} -> {})",
            url,
            friendly_bytes(*bytes),
            path.display()
        ),
        DownloadOutcome::AlreadyComplete { path } => {
            println!("\r{} already downloaded ({})", url, path.display())
        }
    }
}

fn print_summary(summary: &BatchSummary) {
    println!(
        "{} downloaded, {} already complete, {} failed, {} skipped",
        summary.completed, summary.already_complete, summary.failed, summary.skipped
    );
}

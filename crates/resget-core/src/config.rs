use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::BackoffPolicy;

/// SOCKS endpoint used when proxy routing is requested (Tor's default port).
pub const DEFAULT_PROXY_URL: &str = "socks5h://localhost:9050";

/// Retry/backoff parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Backoff multiplier in seconds: delay = multiplier * 2^(attempt-1).
    pub multiplier_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
    /// Give up once this many seconds have passed since the first attempt.
    pub give_up_after_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            multiplier_secs: 2.0,
            max_delay_secs: 30 * 60,
            give_up_after_secs: 3 * 24 * 3600,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            multiplier: Duration::from_secs_f64(self.multiplier_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
            give_up_after: Duration::from_secs(self.give_up_after_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/resget/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResgetConfig {
    /// Proxy URL used for `--tor` (curl syntax, e.g. `socks5h://host:port`).
    pub proxy_url: String,
    /// Connection timeout in seconds for HEAD and GET.
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/sec for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Write logs to `~/.local/state/resget/resget.log` instead of stderr.
    #[serde(default)]
    pub log_to_file: bool,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for ResgetConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            log_to_file: false,
            retry: None,
        }
    }
}

impl ResgetConfig {
    /// Backoff policy from the `[retry]` section, or the defaults.
    pub fn backoff_policy(&self) -> BackoffPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("resget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path`, creating a default file if none exists.
///
/// The flag is true when the default file was just written. Runs before
/// logging is set up, so reporting that is left to the caller.
pub fn load_or_init(path: &Path) -> Result<(ResgetConfig, bool)> {
    if !path.exists() {
        let default_cfg = ResgetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        return Ok((default_cfg, true));
    }

    let data = fs::read_to_string(path)?;
    let cfg: ResgetConfig = toml::from_str(&data)?;
    Ok((cfg, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ResgetConfig::default();
        assert_eq!(cfg.proxy_url, "socks5h://localhost:9050");
        assert_eq!(cfg.connect_timeout_secs, 30);
        assert!(!cfg.log_to_file);
        assert!(cfg.retry.is_none());
    }

    #[test]
    fn default_backoff_is_two_second_multiplier_thirty_minute_cap_three_days() {
        let p = ResgetConfig::default().backoff_policy();
        assert_eq!(p.multiplier, Duration::from_secs(2));
        assert_eq!(p.max_delay, Duration::from_secs(1800));
        assert_eq!(p.give_up_after, Duration::from_secs(259_200));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ResgetConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ResgetConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.proxy_url, cfg.proxy_url);
        assert_eq!(parsed.connect_timeout_secs, cfg.connect_timeout_secs);
        assert_eq!(parsed.low_speed_limit_bytes, cfg.low_speed_limit_bytes);
        assert_eq!(parsed.low_speed_time_secs, cfg.low_speed_time_secs);
    }

    #[test]
    fn first_load_writes_defaults_then_reads_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resget").join("config.toml");

        let (cfg, created) = load_or_init(&path).unwrap();
        assert!(created);
        assert!(path.exists());
        assert_eq!(cfg.proxy_url, DEFAULT_PROXY_URL);

        let (again, created) = load_or_init(&path).unwrap();
        assert!(!created);
        assert_eq!(again.proxy_url, cfg.proxy_url);
        assert_eq!(again.low_speed_time_secs, cfg.low_speed_time_secs);
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            proxy_url = "socks5h://127.0.0.1:9150"
            connect_timeout_secs = 10
            low_speed_limit_bytes = 512
            low_speed_time_secs = 120

            [retry]
            multiplier_secs = 0.5
            max_delay_secs = 15
            give_up_after_secs = 600
        "#;
        let cfg: ResgetConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.proxy_url, "socks5h://127.0.0.1:9150");
        assert!(!cfg.log_to_file);
        let p = cfg.backoff_policy();
        assert_eq!(p.multiplier, Duration::from_millis(500));
        assert_eq!(p.max_delay, Duration::from_secs(15));
        assert_eq!(p.give_up_after, Duration::from_secs(600));
    }
}

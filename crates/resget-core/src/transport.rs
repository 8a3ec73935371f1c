//! Per-attempt curl handle options shared by the probe and the transfer.

use std::time::Duration;

use crate::config::ResgetConfig;

/// Connection settings for one probe+transfer attempt.
///
/// Built once per attempt so the HEAD and the GET always take the same route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    /// Proxy URL in curl syntax (`socks5h://host:port`), or `None` for a direct connection.
    pub proxy: Option<String>,
    pub connect_timeout: Duration,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for Transport {
    fn default() -> Self {
        Transport::from_config(&ResgetConfig::default(), false)
    }
}

impl Transport {
    pub fn from_config(cfg: &ResgetConfig, use_proxy: bool) -> Self {
        Self {
            proxy: use_proxy.then(|| cfg.proxy_url.clone()),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
        }
    }

    /// New easy handle for `url` with redirects, timeouts and the proxy applied.
    pub(crate) fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        // Stalled transfers fail via the low-speed limit rather than a wall-clock timeout.
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        if let Some(proxy) = &self.proxy {
            easy.proxy(proxy)?;
        }
        Ok(easy)
    }
}

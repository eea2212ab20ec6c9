//! Runner configuration read from the environment.

use std::time::Duration;

use anyhow::{bail, Context};
use fintrack_core::sync::{SyncConfig, DEFAULT_REFRESH_DEBOUNCE};

const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Periodic anti-entropy refresh of the runner. `0` disables it.
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub ws_url: String,
    pub api_token: Option<String>,
    pub refresh_interval: Option<Duration>,
    pub refresh_debounce: Duration,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = var("FT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim_end_matches('/').to_string();
        let ws_url = match var("FT_WS_URL") {
            Some(url) => url,
            None => ws_url_from(&api_url)?,
        };

        let interval_secs = match var("FT_REFRESH_INTERVAL_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("FT_REFRESH_INTERVAL_SECS must be a number, got '{}'", v))?,
            None => DEFAULT_REFRESH_INTERVAL_SECS,
        };
        let refresh_debounce = match var("FT_DEBOUNCE_MS") {
            Some(v) => Duration::from_millis(
                v.parse::<u64>()
                    .with_context(|| format!("FT_DEBOUNCE_MS must be a number, got '{}'", v))?,
            ),
            None => DEFAULT_REFRESH_DEBOUNCE,
        };

        Ok(Self {
            api_url,
            ws_url,
            api_token: var("FT_API_TOKEN"),
            refresh_interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            refresh_debounce,
            log_format: var("FT_LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
        })
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            refresh_debounce: self.refresh_debounce,
            refresh_interval: self.refresh_interval,
        }
    }
}

/// `http://host` becomes `ws://host`, `https://host` becomes `wss://host`.
fn ws_url_from(api_url: &str) -> anyhow::Result<String> {
    if let Some(rest) = api_url.strip_prefix("https://") {
        Ok(format!("wss://{}", rest))
    } else if let Some(rest) = api_url.strip_prefix("http://") {
        Ok(format!("ws://{}", rest))
    } else {
        bail!("FT_API_URL must start with http:// or https://, got '{}'", api_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.ws_url, "ws://localhost:8000");
        assert_eq!(config.api_token, None);
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(300)));
        assert_eq!(config.refresh_debounce, Duration::from_millis(250));
        assert_eq!(config.log_format, "text");
    }

    #[test]
    fn test_ws_url_follows_tls() {
        let config = config(&[("FT_API_URL", "https://fintrack.example.com/")]).unwrap();
        assert_eq!(config.api_url, "https://fintrack.example.com");
        assert_eq!(config.ws_url, "wss://fintrack.example.com");
    }

    #[test]
    fn test_zero_interval_disables_periodic_refresh() {
        let config = config(&[("FT_REFRESH_INTERVAL_SECS", "0"), ("FT_DEBOUNCE_MS", "50")]).unwrap();
        assert_eq!(config.sync_config().refresh_interval, None);
        assert_eq!(config.sync_config().refresh_debounce, Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config(&[("FT_REFRESH_INTERVAL_SECS", "soon")]).is_err());
        assert!(config(&[("FT_API_URL", "localhost:8000")]).is_err());
    }
}

// =============================================================================
// Runtime Configuration - collector settings loaded from JSON + environment
// =============================================================================
//
// All fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file.  Environment variables are applied on top of
// whatever was loaded.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Env var naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "COLLECTOR_CONFIG";
/// Config file used when `COLLECTOR_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "collector_config.json";
/// Env var holding the CryptoPanic API token; news ingest is off without it.
pub const NEWS_TOKEN_ENV: &str = "CRYPTOPANIC_API_TOKEN";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    vec!["BTCUSDT".to_string()]
}

fn default_interval_minutes() -> u32 {
    60
}

fn default_kline_limit() -> u32 {
    100
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_category() -> String {
    "linear".to_string()
}

fn default_base_url() -> String {
    "https://api.bybit.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_database_path() -> String {
    "trading.db".to_string()
}

fn default_news_posts_url() -> String {
    "https://cryptopanic.com/api/developer/v2/posts/".to_string()
}

fn default_news_ticker() -> String {
    "BTCUSDT".to_string()
}

fn default_news_per_page() -> u32 {
    100
}

fn default_news_poll_interval_secs() -> u64 {
    60
}

// =============================================================================
// CollectorConfig
// =============================================================================

/// Top-level configuration for the OHLCV collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Tickers to poll; each gets its own independent loop.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Kline interval requested from the exchange, in minutes.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,

    /// Number of klines fetched per cycle (Bybit caps this at 1000).
    #[serde(default = "default_kline_limit")]
    pub kline_limit: u32,

    /// Delay between two fetch cycles, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Bybit product category (`linear`, `spot`, `inverse`).
    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// SQLite file receiving klines and indicators.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// CryptoPanic posts endpoint.
    #[serde(default = "default_news_posts_url")]
    pub news_posts_url: String,

    /// Ticker news posts are attributed to.
    #[serde(default = "default_news_ticker")]
    pub news_ticker: String,

    #[serde(default = "default_news_per_page")]
    pub news_per_page: u32,

    #[serde(default = "default_news_poll_interval_secs")]
    pub news_poll_interval_secs: u64,

    /// Only ever read from the environment, never written back out.
    #[serde(default, skip_serializing)]
    pub news_api_token: Option<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            interval_minutes: default_interval_minutes(),
            kline_limit: default_kline_limit(),
            poll_interval_secs: default_poll_interval_secs(),
            category: default_category(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            database_path: default_database_path(),
            news_posts_url: default_news_posts_url(),
            news_ticker: default_news_ticker(),
            news_per_page: default_news_per_page(),
            news_poll_interval_secs: default_news_poll_interval_secs(),
            news_api_token: None,
        }
    }
}

impl CollectorConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read collector config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse collector config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            interval_minutes = config.interval_minutes,
            "collector config loaded"
        );

        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(syms) = lookup("COLLECTOR_SYMBOLS") {
            self.symbols = syms
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(path) = lookup("COLLECTOR_DATABASE_PATH").filter(|p| !p.trim().is_empty()) {
            self.database_path = path;
        }
        if let Some(token) = lookup(NEWS_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.news_api_token = Some(token.trim().to_string());
        }
    }

    /// Reject settings the collector cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            anyhow::bail!("no symbols configured");
        }
        if self.interval_minutes == 0 {
            anyhow::bail!("interval_minutes must be positive");
        }
        if self.kline_limit == 0 {
            anyhow::bail!("kline_limit must be positive");
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be positive");
        }
        if self.news_poll_interval_secs == 0 {
            anyhow::bail!("news_poll_interval_secs must be positive");
        }
        if self.news_per_page == 0 {
            anyhow::bail!("news_per_page must be positive");
        }
        Ok(())
    }
}

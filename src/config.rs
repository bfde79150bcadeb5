use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::indicator::IndicatorMode;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub ws_url: String,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default = "default_channel")]
    pub channel: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_bucket_width")]
    pub bucket_width: String,
    #[serde(default = "default_indicator_window")]
    pub indicator_window: usize,
    #[serde(default)]
    pub indicator_mode: IndicatorMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_refresh_rate_ms")]
    pub refresh_rate_ms: u64,
    #[serde(default = "default_visible_candles")]
    pub visible_candles: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_channel() -> String {
    "ticker".to_string()
}

fn default_capacity() -> usize {
    60_000
}

fn default_bucket_width() -> String {
    "15s".to_string()
}

fn default_indicator_window() -> usize {
    15_000
}

fn default_refresh_rate_ms() -> u64 {
    1_000
}

fn default_visible_candles() -> usize {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "ticker-chart.log".to_string()
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            bucket_width: default_bucket_width(),
            indicator_window: default_indicator_window(),
            indicator_mode: IndicatorMode::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate_ms(),
            visible_candles: default_visible_candles(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Parse an interval string (e.g. "15s", "1m", "4h", "1d") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    let Some(suffix) = s.chars().last() else {
        bail!("invalid interval '{}': expected format like '15s'", s);
    };
    let num_str = &s[..s.len() - suffix.len_utf8()];
    if num_str.is_empty() {
        bail!("invalid interval '{}': expected format like '15s'", s);
    }
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        's' => 1_000,
        'm' => 60_000,
        'h' => 3_600_000,
        'd' => 86_400_000,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl AggregationConfig {
    pub fn bucket_width_ms(&self) -> Result<u64> {
        parse_interval_ms(&self.bucket_width)
    }
}

impl FeedConfig {
    /// Upper-cased, trimmed, de-duplicated product ids in configured order.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for id in &self.product_ids {
            let s = id.trim().to_ascii_uppercase();
            if !s.is_empty() && !out.iter().any(|v| v == &s) {
                out.push(s);
            }
        }
        out
    }
}

impl Config {
    /// Load `.env`, then the TOML file named by `TICKER_CHART_CONFIG`
    /// (default `config/default.toml`).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var("TICKER_CHART_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = Self::load_from(&config_path)?;

        if let Ok(ws_url) = std::env::var("TICKER_CHART_WS_URL") {
            config.feed.ws_url = ws_url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid config TOML")
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.feed.ws_url)
            .with_context(|| format!("feed.ws_url '{}' is not a valid URL", self.feed.ws_url))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            bail!("feed.ws_url must use ws:// or wss://, got '{}'", url.scheme());
        }
        if self.feed.symbols().is_empty() {
            bail!("feed.product_ids must name at least one product");
        }

        let agg = &self.aggregation;
        if agg.capacity == 0 {
            bail!("aggregation.capacity must be > 0");
        }
        if agg.indicator_window == 0 {
            bail!("aggregation.indicator_window must be > 0");
        }
        if agg.indicator_window > agg.capacity {
            bail!(
                "aggregation.indicator_window ({}) must not exceed aggregation.capacity ({})",
                agg.indicator_window,
                agg.capacity
            );
        }
        agg.bucket_width_ms()
            .context("aggregation.bucket_width is invalid")?;

        if self.ui.refresh_rate_ms == 0 {
            bail!("ui.refresh_rate_ms must be > 0");
        }
        Ok(())
    }
}

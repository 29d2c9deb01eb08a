use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use crate::api::alphavantage::AlphaVantageClient;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env`) at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    /// Substring identifying the series block among the response keys
    pub series_key: String,
    pub symbols_csv: PathBuf,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl AppConfig {
    pub const DEFAULT_SERIES_KEY: &'static str = "Time Series";
    pub const DEFAULT_SYMBOLS_CSV: &'static str = "stocks.csv";
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:5000";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_CHART_WIDTH: u32 = 1024;
    pub const DEFAULT_CHART_HEIGHT: u32 = 768;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any name -> value lookup.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("ALPHAVANTAGE_API_KEY").ok_or(ConfigError::Missing("ALPHAVANTAGE_API_KEY"))?;
        let base_url = get("ALPHAVANTAGE_BASE_URL")
            .unwrap_or_else(|| AlphaVantageClient::DEFAULT_BASE_URL.to_string());
        let series_key = get("SERIES_KEY_SUBSTRING").unwrap_or_else(|| Self::DEFAULT_SERIES_KEY.to_string());
        let symbols_csv = PathBuf::from(
            get("SYMBOLS_CSV").unwrap_or_else(|| Self::DEFAULT_SYMBOLS_CSV.to_string()),
        );

        let bind_addr: SocketAddr = parse_or("BIND_ADDR", get("BIND_ADDR"), Self::DEFAULT_BIND_ADDR.parse().ok())?;
        let timeout_secs: u64 = parse_or("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), Some(Self::DEFAULT_TIMEOUT_SECS))?;
        let chart_width: u32 = parse_or("CHART_WIDTH", get("CHART_WIDTH"), Some(Self::DEFAULT_CHART_WIDTH))?;
        let chart_height: u32 = parse_or("CHART_HEIGHT", get("CHART_HEIGHT"), Some(Self::DEFAULT_CHART_HEIGHT))?;

        for (name, value) in [
            ("REQUEST_TIMEOUT_SECS", timeout_secs),
            ("CHART_WIDTH", u64::from(chart_width)),
            ("CHART_HEIGHT", u64::from(chart_height)),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid { name, value: "0".to_string() });
            }
        }

        Ok(Self {
            api_key,
            base_url,
            series_key,
            symbols_csv,
            bind_addr,
            request_timeout: Duration::from_secs(timeout_secs),
            chart_width,
            chart_height,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}

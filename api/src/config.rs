use std::{env, path::PathBuf, time::Duration};

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub frontend_origins: Vec<String>,
    /// External holdings provider; the built-in demo book is used when unset.
    pub holdings_api_base: Option<String>,
    pub holdings_timeout: Duration,
    pub portfolio_fallback: bool,
    pub coingecko_api_base: String,
    pub market_timeout: Duration,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            frontend_origins: vec!["http://localhost:3000".to_string()],
            holdings_api_base: None,
            holdings_timeout: Duration::from_secs(10),
            portfolio_fallback: true,
            coingecko_api_base: "https://api.coingecko.com/api/v3".to_string(),
            market_timeout: Duration::from_secs(10),
            export_dir: PathBuf::from("./exports"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let holdings_api_base = env::var("HOLDINGS_API_BASE")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("PORT must be a valid u16")?,
            frontend_origins: parse_origins(),
            holdings_api_base,
            holdings_timeout: parse_duration_seconds("HOLDINGS_TIMEOUT_SECS", 10),
            portfolio_fallback: parse_bool("PORTFOLIO_FALLBACK", defaults.portfolio_fallback),
            coingecko_api_base: env::var("COINGECKO_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.coingecko_api_base),
            market_timeout: parse_duration_seconds("MARKET_TIMEOUT_SECS", 10),
            export_dir: env::var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
        })
    }
}

fn parse_origins() -> Vec<String> {
    if let Ok(list) = env::var("FRONTEND_ORIGINS") {
        split_origins(&list)
    } else if let Ok(origin) = env::var("FRONTEND_ORIGIN") {
        split_origins(&origin)
    } else {
        vec!["http://localhost:3000".to_string()]
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|item| {
            let trimmed = item.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

fn parse_duration_seconds(key: &str, default: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key).map(|v| bool_flag(&v)).unwrap_or(default)
}

fn bool_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

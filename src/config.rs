//! Runtime settings read from the environment (and `.env` via dotenv)

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PREDICT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CHART_WIDTH: u32 = 1024;
pub const DEFAULT_CHART_HEIGHT: u32 = 768;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub discord_token: String,
    pub predict_api_url: String,
    /// `None` leaves timeouts to the transport
    pub request_timeout: Option<Duration>,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let predict_api_url = lookup("PREDICT_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_PREDICT_API_URL.to_string());

        let request_timeout = parse_optional::<u64, _>(&lookup, "PREDICT_TIMEOUT_SECS")?
            .map(Duration::from_secs);

        let chart_width =
            parse_optional(&lookup, "CHART_WIDTH")?.unwrap_or(DEFAULT_CHART_WIDTH);
        let chart_height =
            parse_optional(&lookup, "CHART_HEIGHT")?.unwrap_or(DEFAULT_CHART_HEIGHT);

        Ok(Self {
            discord_token,
            predict_api_url,
            request_timeout,
            chart_width,
            chart_height,
        })
    }
}

fn parse_optional<T, L>(lookup: &L, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    L: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

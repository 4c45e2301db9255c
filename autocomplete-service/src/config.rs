use common::tracing::LogFormat;
use reqwest::Url;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub cache_ttl: Duration,
    pub weather_api_key: String,
    pub weather_api_base_url: String,
    pub http_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let port = parse_number::<u16>("PORT", &required("PORT")?)?;

        let database_url = required("DATABASE_URL")?;

        let redis_url = required("REDIS_URL")?;
        let parsed = Url::parse(&redis_url).map_err(|e| ConfigError::Invalid {
            name: "REDIS_URL",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "redis" | "rediss") {
            return Err(ConfigError::Invalid {
                name: "REDIS_URL",
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let cache_ttl_ms = parse_number::<u64>("CACHE_TTL_MS", &required("CACHE_TTL_MS")?)?;
        if cache_ttl_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "CACHE_TTL_MS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let weather_api_key = required("WEATHER_API_KEY")?;

        let weather_api_base_url = required("WEATHER_API_BASE_URL")?;
        let parsed = Url::parse(&weather_api_base_url).map_err(|e| ConfigError::Invalid {
            name: "WEATHER_API_BASE_URL",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: "WEATHER_API_BASE_URL",
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let http_timeout_secs = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("HTTP_TIMEOUT_SECS", raw.trim())?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let log_format = LogFormat::from_name(lookup("LOG_FORMAT").as_deref());

        Ok(Self {
            port,
            database_url,
            redis_url,
            cache_ttl: Duration::from_millis(cache_ttl_ms),
            weather_api_key,
            weather_api_base_url,
            http_timeout_secs,
            log_format,
        })
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

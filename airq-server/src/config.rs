//! Process configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cityair::{CityAirConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::freshness::{DEFAULT_MEASUREMENT_WINDOW, DEFAULT_STATION_WINDOW, FreshnessPolicy};
use crate::lookup::LookupConfig;
use crate::store::FileCacheConfig;

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_CACHE_DIR: &str = ".cache";

/// Errors from reading the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable could not be parsed
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Everything needed to start the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token: String,
    pub api_url: String,
    pub cache_dir: PathBuf,
    pub timeout_secs: u64,
    pub station_ttl_secs: u64,
    pub measurement_ttl_secs: u64,
    pub bind: SocketAddr,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `get`, which maps a variable name to
    /// its value.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = get("TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("TOKEN"))?;

        Ok(Self {
            token,
            api_url: get("AIRQ_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            cache_dir: get("AIRQ_CACHE_DIR")
                .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string())
                .into(),
            timeout_secs: parse_or(&get, "AIRQ_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            station_ttl_secs: parse_or(
                &get,
                "AIRQ_STATION_TTL_SECS",
                DEFAULT_STATION_WINDOW.as_secs(),
            )?,
            measurement_ttl_secs: parse_or(
                &get,
                "AIRQ_MEASUREMENT_TTL_SECS",
                DEFAULT_MEASUREMENT_WINDOW.as_secs(),
            )?,
            bind: match get("AIRQ_BIND") {
                Some(value) => parse("AIRQ_BIND", value)?,
                None => DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
                    name: "AIRQ_BIND",
                    value: DEFAULT_BIND.to_string(),
                })?,
            },
        })
    }

    pub fn cityair(&self) -> CityAirConfig {
        CityAirConfig::new(&self.token)
            .with_base_url(&self.api_url)
            .with_timeout(self.timeout_secs)
    }

    pub fn cache(&self) -> FileCacheConfig {
        FileCacheConfig::new(&self.cache_dir)
    }

    pub fn lookup(&self) -> LookupConfig {
        LookupConfig {
            freshness: FreshnessPolicy::new(
                Duration::from_secs(self.station_ttl_secs),
                Duration::from_secs(self.measurement_ttl_secs),
            ),
            upstream_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        Some(value) => parse(name, value),
        None => Ok(default),
    }
}

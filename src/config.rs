use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_ADZUNA_COUNTRY: &str = "gb";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 2000;
pub const DEFAULT_BATCH_QUERIES: &str = "software engineer,data analyst,product manager";
pub const DEFAULT_BATCH_LOCATIONS: &str = "Tunisia,Egypt,Morocco,Nigeria,Kenya,South Africa";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jsearch_api_key: Option<String>,
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
    pub adzuna_country: String,
    pub jooble_api_key: Option<String>,
    pub cache_ttl_secs: u64,
    pub provider_timeout_secs: u64,
    pub batch_schedule: Option<String>,
    pub batch_queries: Vec<String>,
    pub batch_locations: Vec<String>,
    pub batch_delay_ms: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            database_url: get_env("DATABASE_URL")?,
            jsearch_api_key: get_env_opt("JSEARCH_API_KEY"),
            adzuna_app_id: get_env_opt("ADZUNA_APP_ID"),
            adzuna_app_key: get_env_opt("ADZUNA_APP_KEY"),
            adzuna_country: get_env_or("ADZUNA_COUNTRY", DEFAULT_ADZUNA_COUNTRY),
            jooble_api_key: get_env_opt("JOOBLE_API_KEY"),
            cache_ttl_secs: get_env_parse_or("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
            provider_timeout_secs: get_env_parse_or(
                "PROVIDER_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            )?,
            batch_schedule: get_env_opt("BATCH_SCHEDULE"),
            batch_queries: split_list(&get_env_or("BATCH_QUERIES", DEFAULT_BATCH_QUERIES)),
            batch_locations: split_list(&get_env_or("BATCH_LOCATIONS", DEFAULT_BATCH_LOCATIONS)),
            batch_delay_ms: get_env_parse_or("BATCH_DELAY_MS", DEFAULT_BATCH_DELAY_MS)?,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

/// Unset and blank are treated the same.
fn get_env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

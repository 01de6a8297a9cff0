use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub weather_api_key: String,
    pub weather_api_base_url: String,
    pub weather_api_current_path: String,
    pub weather_api_forecast_path: String,
    pub upstash_rest_url: Option<String>,
    pub upstash_rest_token: Option<String>,
    pub upstream_timeout_secs: u64,
    pub cache_timeout_secs: u64,
    pub memory_cache_capacity: u64,
    pub static_dir: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            weather_api_key: env::var("WEATHER_API_KEY")
                .map_err(|_| anyhow::anyhow!("WEATHER_API_KEY not set"))?,
            weather_api_base_url: env::var("WEATHER_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.weatherapi.com/v1".to_string()),
            weather_api_current_path: env::var("WEATHER_API_CURRENT_PATH")
                .unwrap_or_else(|_| "/current.json".to_string()),
            weather_api_forecast_path: env::var("WEATHER_API_FORECAST_PATH")
                .unwrap_or_else(|_| "/forecast.json".to_string()),
            upstash_rest_url: non_empty_var("UPSTASH_REDIS_REST_URL"),
            upstash_rest_token: non_empty_var("UPSTASH_REDIS_REST_TOKEN"),
            upstream_timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS", 10)?,
            cache_timeout_secs: parse_var("CACHE_TIMEOUT_SECS", 5)?,
            memory_cache_capacity: parse_var("MEMORY_CACHE_CAPACITY", 10_000)?,
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
        })
    }

    /// Upstash REST credentials, only when both halves are configured.
    pub fn upstash_credentials(&self) -> Option<(&str, &str)> {
        match (&self.upstash_rest_url, &self.upstash_rest_token) {
            (Some(url), Some(token)) => Some((url.as_str(), token.as_str())),
            _ => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config(weather_api_base_url: &str) -> Config {
    Config {
        weather_api_key: "test-key".to_string(),
        weather_api_base_url: weather_api_base_url.to_string(),
        weather_api_current_path: "/current.json".to_string(),
        weather_api_forecast_path: "/forecast.json".to_string(),
        upstash_rest_url: None,
        upstash_rest_token: None,
        upstream_timeout_secs: 5,
        cache_timeout_secs: 5,
        memory_cache_capacity: 100,
        static_dir: "static".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
    }
}

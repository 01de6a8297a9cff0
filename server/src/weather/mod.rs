pub mod key;
pub mod resolver;
pub mod weatherapi;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use key::{derive_key, CacheKey};
pub use resolver::{FetchError, WeatherResolver};
pub use weatherapi::{ProviderError, WeatherApiClient};

#[derive(Error, Debug, PartialEq)]
pub enum QueryError {
    #[error("Invalid latitude: {0}. Must be between -90 and 90")]
    InvalidLatitude(f64),
    #[error("Invalid longitude: {0}. Must be between -180 and 180")]
    InvalidLongitude(f64),
}

/// Where a weather lookup is anchored.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

/// A single request for weather data. Absent or zero `forecast_days`
/// means current conditions only.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    location: Location,
    forecast_days: Option<u32>,
}

impl WeatherQuery {
    pub fn city(name: impl Into<String>, forecast_days: Option<u32>) -> Self {
        Self {
            location: Location::City(name.into()),
            forecast_days,
        }
    }

    pub fn coordinates(lat: f64, lon: f64, forecast_days: Option<u32>) -> Result<Self, QueryError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(QueryError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(QueryError::InvalidLongitude(lon));
        }
        Ok(Self {
            location: Location::Coordinates { lat, lon },
            forecast_days,
        })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Forecast horizon in days, with absent folded to zero.
    pub fn forecast_days(&self) -> u32 {
        self.forecast_days.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    Api,
}

/// Response body for every weather endpoint: `{ "source": ..., "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherResult {
    #[serde(rename = "source")]
    pub provenance: Provenance,
    pub data: Value,
}

/// Source of truth consulted on a cache miss.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, query: &WeatherQuery) -> Result<Value, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validation() {
        assert!(WeatherQuery::coordinates(0.0, 0.0, None).is_ok());
        assert!(WeatherQuery::coordinates(90.0, 180.0, None).is_ok());
        assert!(WeatherQuery::coordinates(-90.0, -180.0, Some(3)).is_ok());
        assert_eq!(
            WeatherQuery::coordinates(91.0, 0.0, None),
            Err(QueryError::InvalidLatitude(91.0))
        );
        assert_eq!(
            WeatherQuery::coordinates(0.0, 181.0, None),
            Err(QueryError::InvalidLongitude(181.0))
        );
        assert!(WeatherQuery::coordinates(f64::NAN, 0.0, None).is_err());
        assert!(WeatherQuery::coordinates(0.0, f64::INFINITY, None).is_err());
    }

    #[test]
    fn test_forecast_days_defaults_to_zero() {
        assert_eq!(WeatherQuery::city("Paris", None).forecast_days(), 0);
        assert_eq!(WeatherQuery::city("Paris", Some(5)).forecast_days(), 5);
    }

    #[test]
    fn test_result_serializes_with_source_tag() {
        let result = WeatherResult {
            provenance: Provenance::Cache,
            data: serde_json::json!({"current": {"temp_c": 12.0}}),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"source": "cache", "data": {"current": {"temp_c": 12.0}}})
        );
    }
}

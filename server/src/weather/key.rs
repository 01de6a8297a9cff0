use super::{Location, WeatherQuery};
use std::fmt;

const NAMESPACE: &str = "weather";

/// Cache key for a [`WeatherQuery`].
///
/// Layout is `weather:city:<city>:<days>` or `weather:coords:<lat>,<lon>:<days>`.
/// The day count is always the last segment and never contains `:`, so city
/// names that themselves contain separators cannot alias another entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn derive_key(query: &WeatherQuery) -> CacheKey {
    let days = query.forecast_days();
    let key = match query.location() {
        Location::City(city) => format!("{}:city:{}:{}", NAMESPACE, city, days),
        Location::Coordinates { lat, lon } => format!(
            "{}:coords:{}:{}",
            NAMESPACE,
            coordinate_pair(*lat, *lon),
            days
        ),
    };
    CacheKey(key)
}

/// `lat,lon` in shortest round-trip form. Shared with the upstream `q`
/// parameter so the key and the request describe the same point.
pub fn coordinate_pair(lat: f64, lon: f64) -> String {
    format!("{},{}", canonical(lat), canonical(lon))
}

fn canonical(value: f64) -> f64 {
    // folds -0.0 into 0.0
    value + 0.0
}

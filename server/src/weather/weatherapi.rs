use super::key::coordinate_pair;
use super::{Location, WeatherProvider, WeatherQuery};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Client for weatherapi.com. Current conditions come from the current
/// endpoint; any positive forecast depth switches to the forecast endpoint.
pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    current_path: String,
    forecast_path: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent("WeatherCacheServer/1.0")
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.weather_api_base_url.trim_end_matches('/').to_string(),
            current_path: config.weather_api_current_path.clone(),
            forecast_path: config.weather_api_forecast_path.clone(),
            api_key: config.weather_api_key.clone(),
        })
    }

    fn request_params(&self, query: &WeatherQuery) -> (String, Vec<(&'static str, String)>) {
        let q = match query.location() {
            Location::City(city) => city.clone(),
            Location::Coordinates { lat, lon } => coordinate_pair(*lat, *lon),
        };

        let mut params = vec![("key", self.api_key.clone()), ("q", q)];
        let path = match query.forecast_days() {
            0 => &self.current_path,
            days => {
                params.push(("days", days.to_string()));
                &self.forecast_path
            }
        };

        (format!("{}{}", self.base_url, path), params)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn fetch(&self, query: &WeatherQuery) -> Result<Value, ProviderError> {
        let (url, params) = self.request_params(query);
        let response = self.client.get(&url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&bytes)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_city_current_conditions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .and(query_param("key", "test-key"))
            .and(query_param("q", "London"))
            .and(query_param_is_missing("days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": {"name": "London"},
                "current": {"temp_c": 11.0}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri())).unwrap();
        let payload = client.fetch(&WeatherQuery::city("London", None)).await.unwrap();

        assert_eq!(payload["location"]["name"], "London");
        assert_eq!(payload["current"]["temp_c"], 11.0);
    }

    #[tokio::test]
    async fn test_forecast_uses_forecast_endpoint_with_days() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("q", "48.85,2.35"))
            .and(query_param("days", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "forecast": {"forecastday": [{}, {}, {}]}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri())).unwrap();
        let query = WeatherQuery::coordinates(48.85, 2.35, Some(3)).unwrap();
        let payload = client.fetch(&query).await.unwrap();

        assert_eq!(payload["forecast"]["forecastday"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_zero_forecast_is_current_conditions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri())).unwrap();
        client.fetch(&WeatherQuery::city("Oslo", Some(0))).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_preserves_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"code":1006,"message":"No matching location found."}}"#,
            ))
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri())).unwrap();
        let err = client
            .fetch(&WeatherQuery::city("Nowhereland", None))
            .await
            .unwrap_err();

        match &err {
            ProviderError::Status { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert!(body.contains("No matching location found."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("HTTP 400"));
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::new(&test_config(&mock_server.uri())).unwrap();
        let err = client.fetch(&WeatherQuery::city("Rome", None)).await.unwrap_err();

        assert!(matches!(err, ProviderError::JsonParsing(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = WeatherApiClient::new(&test_config("http://127.0.0.1:1")).unwrap();
        let err = client.fetch(&WeatherQuery::city("Rome", None)).await.unwrap_err();

        assert!(matches!(err, ProviderError::RequestFailed(_)));
    }
}

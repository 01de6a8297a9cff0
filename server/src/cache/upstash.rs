use super::{CacheError, CacheStore};
use crate::weather::CacheKey;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Reply envelope of the Upstash REST API. Exactly one field is set.
#[derive(Debug, Deserialize)]
struct UpstashReply {
    result: Option<Value>,
    error: Option<String>,
}

/// Redis over the Upstash REST protocol. Each command is a JSON array
/// POSTed to the database URL with a bearer token.
pub struct UpstashStore {
    client: Client,
    url: String,
    token: String,
}

impl UpstashStore {
    pub fn new(url: &str, token: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = Client::builder()
            .user_agent("WeatherCacheServer/1.0")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn command(&self, args: &[&str]) -> Result<Value, CacheError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let reply: UpstashReply = match serde_json::from_str(&text) {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => {
                return Err(CacheError::Store(format!("HTTP {}: {}", status, text)));
            }
            Err(e) => return Err(CacheError::Decode(e)),
        };

        if let Some(error) = reply.error {
            return Err(CacheError::Store(error));
        }
        if !status.is_success() {
            return Err(CacheError::Store(format!("HTTP {}", status)));
        }

        Ok(reply.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl CacheStore for UpstashStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        match self.command(&["GET", key.as_str()]).await? {
            Value::Null => Ok(None),
            Value::String(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            other => Err(CacheError::Store(format!(
                "unexpected GET reply for {}: {}",
                key, other
            ))),
        }
    }

    async fn set_ex(&self, key: &CacheKey, ttl: Duration, value: &Value) -> Result<(), CacheError> {
        let seconds = ttl.as_secs().max(1).to_string();
        let body = serde_json::to_string(value)?;

        match self
            .command(&["SETEX", key.as_str(), seconds.as_str(), body.as_str()])
            .await?
        {
            Value::String(ok) if ok == "OK" => Ok(()),
            other => Err(CacheError::Store(format!(
                "unexpected SETEX reply for {}: {}",
                key, other
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "upstash"
    }
}

pub mod memory;
pub mod upstash;

use crate::weather::CacheKey;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub use memory::MemoryStore;
pub use upstash::UpstashStore;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("cache value could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("cache store error: {0}")]
    Store(String),
}

/// Shared key-value store with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError>;

    /// Write `value` under `key`, replacing any previous entry. TTL has
    /// whole-second granularity.
    async fn set_ex(&self, key: &CacheKey, ttl: Duration, value: &Value) -> Result<(), CacheError>;

    /// Short label reported by the health endpoint.
    fn backend(&self) -> &'static str;
}

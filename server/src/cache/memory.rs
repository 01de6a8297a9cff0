use super::{CacheError, CacheStore};
use crate::weather::CacheKey;
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde_json::Value;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Entry {
    value: Value,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct WriteTtl;

impl Expiry<String, Entry> for WriteTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process store used when no Upstash credentials are configured.
/// Entries are not shared across processes.
pub struct MemoryStore {
    cache: Cache<String, Entry>,
}

impl MemoryStore {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(WriteTtl)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        Ok(self.cache.get(key.as_str()).await.map(|entry| entry.value))
    }

    async fn set_ex(&self, key: &CacheKey, ttl: Duration, value: &Value) -> Result<(), CacheError> {
        let ttl = Duration::from_secs(ttl.as_secs().max(1));
        self.cache
            .insert(
                key.as_str().to_string(),
                Entry {
                    value: value.clone(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

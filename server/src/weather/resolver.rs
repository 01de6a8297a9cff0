use super::{derive_key, Provenance, ProviderError, WeatherProvider, WeatherQuery, WeatherResult};
use crate::cache::CacheStore;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Lifetime of every entry written after a successful upstream fetch.
pub const CACHE_TTL: Duration = Duration::from_secs(600);

/// The only failure a caller ever sees. Cache trouble degrades to a miss
/// or a skipped write instead.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    UpstreamUnavailable(#[source] ProviderError),
}

#[derive(Debug, Default)]
pub struct ResolverStats {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_read_errors: AtomicU64,
    cache_write_errors: AtomicU64,
    upstream_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_read_errors: u64,
    pub cache_write_errors: u64,
    pub upstream_failures: u64,
}

impl ResolverStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_read_errors: self.cache_read_errors.load(Ordering::Relaxed),
            cache_write_errors: self.cache_write_errors.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
        }
    }
}

/// Read-through cache in front of a [`WeatherProvider`].
///
/// Holds no per-request state, so one instance is shared by every handler.
/// Concurrent misses on the same key each fetch and write independently;
/// the store keeps whichever write lands last.
pub struct WeatherResolver {
    store: Arc<dyn CacheStore>,
    provider: Arc<dyn WeatherProvider>,
    stats: ResolverStats,
}

impl WeatherResolver {
    pub fn new(store: Arc<dyn CacheStore>, provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            store,
            provider,
            stats: ResolverStats::default(),
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cache_backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn resolve(&self, query: &WeatherQuery) -> Result<WeatherResult, FetchError> {
        let key = derive_key(query);

        match self.store.get(&key).await {
            Ok(Some(data)) => {
                ResolverStats::bump(&self.stats.cache_hits);
                tracing::debug!(%key, "cache hit");
                return Ok(WeatherResult {
                    provenance: Provenance::Cache,
                    data,
                });
            }
            Ok(None) => {
                ResolverStats::bump(&self.stats.cache_misses);
                tracing::debug!(%key, "cache miss");
            }
            Err(e) => {
                ResolverStats::bump(&self.stats.cache_read_errors);
                tracing::warn!(%key, error = %e, "cache read failed, fetching from upstream");
            }
        }

        let data = match self.provider.fetch(query).await {
            Ok(data) => data,
            Err(e) => {
                ResolverStats::bump(&self.stats.upstream_failures);
                tracing::error!(%key, error = %e, "upstream fetch failed");
                return Err(FetchError::UpstreamUnavailable(e));
            }
        };

        if let Err(e) = self.store.set_ex(&key, CACHE_TTL, &data).await {
            ResolverStats::bump(&self.stats.cache_write_errors);
            tracing::warn!(%key, error = %e, "cache write failed, returning fresh result");
        }

        Ok(WeatherResult {
            provenance: Provenance::Api,
            data,
        })
    }
}

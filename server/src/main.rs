use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::Arc;
use std::time::Duration;

mod cache;
mod config;
mod routes;
mod weather;

use cache::{CacheStore, MemoryStore, UpstashStore};
use config::Config;
use routes::{create_router, AppState};
use weather::{WeatherApiClient, WeatherResolver};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_cache_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize cache store
    let store: Arc<dyn CacheStore> = match config.upstash_credentials() {
        Some((url, token)) => Arc::new(UpstashStore::new(
            url,
            token,
            Duration::from_secs(config.cache_timeout_secs),
        )?),
        None => {
            tracing::warn!(
                "UPSTASH_REDIS_REST_URL/UPSTASH_REDIS_REST_TOKEN not set, using in-process cache"
            );
            Arc::new(MemoryStore::new(config.memory_cache_capacity))
        }
    };
    tracing::info!("Cache backend: {}", store.backend());

    // Initialize weather client
    let weather_client = Arc::new(WeatherApiClient::new(&config)?);

    let resolver = Arc::new(WeatherResolver::new(store, weather_client));
    let bind_addr = config.bind_addr.clone();

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        resolver,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

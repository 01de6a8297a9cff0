use axum::{
    extract::{Path, Query, State},
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::{
    config::Config,
    weather::{resolver::StatsSnapshot, FetchError, QueryError, WeatherQuery, WeatherResolver, WeatherResult},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<WeatherResolver>,
}

// Request/Response types
#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub forecast: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CoordinatesParams {
    pub lat: f64,
    pub lon: f64,
    pub forecast: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub cache_backend: String,
    pub stats: StatsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error rendered as `{ "detail": ... }` with the matching status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: "File not found".to_string(),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("Error fetching weather data: {}", err),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

// Route handlers
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Weather App API".to_string(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_backend: state.resolver.cache_backend().to_string(),
        stats: state.resolver.stats(),
    })
}

pub async fn weather_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(params): Query<ForecastParams>,
) -> Result<Json<WeatherResult>, ApiError> {
    let query = WeatherQuery::city(city, params.forecast);
    let result = state.resolver.resolve(&query).await?;
    Ok(Json(result))
}

pub async fn weather_by_coordinates(
    State(state): State<AppState>,
    Query(params): Query<CoordinatesParams>,
) -> Result<Json<WeatherResult>, ApiError> {
    let query = WeatherQuery::coordinates(params.lat, params.lon, params.forecast)?;
    let result = state.resolver.resolve(&query).await?;
    Ok(Json(result))
}

async fn file_not_found() -> ApiError {
    ApiError::not_found()
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir)
        .not_found_service(file_not_found.into_service());

    Router::new()
        .route("/health", get(health))
        .route("/api", get(welcome))
        .route("/weather/coordinates", get(weather_by_coordinates))
        .route("/weather/:city", get(weather_by_city))
        .route("/api/weather/coordinates", get(weather_by_coordinates))
        .route("/api/weather/:city", get(weather_by_city))
        .nest_service("/static", static_files.clone())
        .fallback_service(static_files)
        .with_state(state)
}

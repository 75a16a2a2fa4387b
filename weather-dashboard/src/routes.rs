//! HTTP surface of the dashboard.
//!
//! Handlers validate their path parameters, ask the [`WeatherSource`] for data and record every
//! successful lookup in the [`HistoryStore`]. Recording is best effort: a failed insert is logged
//! and the client still gets its weather.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tracing::{error, info, warn};
use weather_core::{
    ErrorBody, HISTORY_LIMIT, HistoryStore, WeatherError, WeatherRecord, WeatherSource,
    validation::is_valid_coordinate,
};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<dyn WeatherSource>,
    pub history: Arc<dyn HistoryStore>,
}

impl AppState {
    pub fn new(weather: Arc<dyn WeatherSource>, history: Arc<dyn HistoryStore>) -> Self {
        Self { weather, history }
    }
}

/// Build the dashboard router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/weather/{city}", get(weather_by_city))
        .route("/api/weather/coordinates/{lat}/{lon}", get(weather_by_coordinates))
        .route("/api/history", get(history))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

/// Undecodable path segments (e.g. invalid UTF-8) still get the JSON error envelope.
fn path_rejection(rejection: PathRejection) -> Response {
    warn!(error = %rejection.body_text(), "rejected request path");
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn weather_by_city(
    State(state): State<AppState>,
    city: Result<Path<String>, PathRejection>,
) -> Response {
    let city = match city {
        Ok(Path(city)) => city,
        Err(rejection) => return path_rejection(rejection),
    };
    if city.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "city parameter is required");
    }

    let lookup = state.weather.current_by_city(&city).await;
    respond_with_lookup(&state, lookup, &city).await
}

async fn weather_by_coordinates(
    State(state): State<AppState>,
    coordinates: Result<Path<(String, String)>, PathRejection>,
) -> Response {
    let (lat, lon) = match coordinates {
        Ok(Path(coordinates)) => coordinates,
        Err(rejection) => return path_rejection(rejection),
    };
    if lat.trim().is_empty() || lon.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "latitude and longitude parameters are required",
        );
    }
    if !is_valid_coordinate(&lat, &lon) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "latitude and longitude must be decimal numbers",
        );
    }

    let lookup = state.weather.current_by_coordinates(&lat, &lon).await;
    respond_with_lookup(&state, lookup, &format!("{lat},{lon}")).await
}

async fn respond_with_lookup(
    state: &AppState,
    lookup: Result<WeatherRecord, WeatherError>,
    query: &str,
) -> Response {
    let mut record = match lookup {
        Ok(record) => record,
        Err(err) => {
            error!(query, error = %err, "weather lookup failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
        }
    };

    match state.history.save(&record).await {
        Ok(id) => record.id = id,
        Err(err) => warn!(query, error = %err, "failed to save weather data"),
    }

    info!(query, city = %record.city, temperature = record.temperature, "served weather lookup");
    (StatusCode::OK, Json(record)).into_response()
}

async fn history(State(state): State<AppState>) -> Response {
    match state.history.recent_history(HISTORY_LIMIT).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => {
            error!(error = %err, "failed to fetch weather history");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}
